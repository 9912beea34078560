use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::analysis::Analyzer;
use crate::api::health::HealthState;
use crate::api::latency::{LatencyStats, Percentiles};
use crate::config::DEFAULT_LOOKBACK;
use crate::error::{AppError, Result};
use crate::types::{AnalysisRequest, AnalysisResult};

#[derive(Clone)]
pub struct ApiState {
    pub analyzer: Arc<Analyzer>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
    pub strict_stat_category: bool,
}

pub fn router(state: ApiState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/props/analyze", get(analyze_props))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
        .layer(cors)
}

/// CORS for the single front-end origin. Read-only API, so GET only.
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|_| AppError::Config(format!("FRONTEND_ORIGIN is not a valid origin: {origin:?}")))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET]))
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct AnalyzeQuery {
    pub player: Option<String>,
    pub stat: Option<String>,
    pub line: Option<f64>,
    pub lookback: Option<i64>,
    pub season: Option<i32>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: &'static str,
    pub analyses_ok: u64,
    pub analyses_failed: u64,
    pub last_analysis_at_ns: u64,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub sample_count: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn analyze_props(
    State(state): State<ApiState>,
    query: std::result::Result<Query<AnalyzeQuery>, QueryRejection>,
) -> std::result::Result<Json<AnalysisResult>, AppError> {
    let started = Instant::now();
    let outcome = run_analysis(&state, query).await;
    state.latency.record(started.elapsed());

    match &outcome {
        Ok(_) => state.health.record_ok(now_ns()),
        Err(_) => state.health.record_failed(now_ns()),
    }
    outcome.map(Json)
}

async fn run_analysis(
    state: &ApiState,
    query: std::result::Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<AnalysisResult> {
    let Query(params) = query.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let player = params
        .player
        .ok_or_else(|| AppError::InvalidRequest("player is required".to_string()))?;
    let stat = params
        .stat
        .ok_or_else(|| AppError::InvalidRequest("stat is required".to_string()))?;
    let line = params
        .line
        .ok_or_else(|| AppError::InvalidRequest("line is required".to_string()))?;
    let lookback = params.lookback.unwrap_or(DEFAULT_LOOKBACK as i64);

    let req = AnalysisRequest::new(
        &player,
        &stat,
        line,
        lookback,
        params.season,
        state.strict_stat_category,
    )?;
    state.analyzer.analyze(&req).await
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.analyzer.provider_name(),
        analyses_ok: state.health.analyses_ok(),
        analyses_failed: state.health.analyses_failed(),
        last_analysis_at_ns: state.health.last_analysis_at_ns(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyResponse> {
    let p = state.latency.percentiles();
    let to_ms = |pick: fn(&Percentiles) -> u64| p.as_ref().map(|p| pick(p) as f64 / 1000.0);
    Json(LatencyResponse {
        p50_ms: to_ms(|p| p.p50_us),
        p95_ms: to_ms(|p| p.p95_us),
        p99_ms: to_ms(|p| p.p99_us),
        sample_count: state.latency.len(),
    })
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RecordShape;
    use crate::providers::{GameLogProvider, PassthroughDirectory};
    use crate::types::{GameRecord, PlayerRef};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const ORIGIN: &str = "http://localhost:5173";

    /// Game log service rows for one known player; 404-equivalent otherwise.
    struct FakeLogService;

    #[async_trait]
    impl GameLogProvider for FakeLogService {
        fn name(&self) -> &'static str {
            "fake_gamelog"
        }

        fn shape(&self) -> RecordShape {
            RecordShape::GameLogService
        }

        async fn fetch(&self, player: &PlayerRef, _lookback: usize, _season: Option<i32>) -> Result<Vec<GameRecord>> {
            if player.full_name != "Luka Doncic" {
                return Err(AppError::PlayerNotFound(player.full_name.clone()));
            }
            Ok(vec![
                json!({ "GAME_DATE": "JAN 05, 2025", "MATCHUP": "DAL vs. PHX", "WL": "W", "PTS": 10 }),
                json!({ "GAME_DATE": "JAN 03, 2025", "MATCHUP": "DAL @ DEN", "WL": "L", "PTS": 22 }),
                json!({ "GAME_DATE": "JAN 07, 2025", "MATCHUP": "DAL @ UTA", "WL": "W", "PTS": 15 }),
                json!({ "GAME_DATE": "JAN 09, 2025", "MATCHUP": "DAL vs. SAC", "WL": "W", "PTS": 30 }),
                json!({ "GAME_DATE": "JAN 01, 2025", "MATCHUP": "DAL vs. MIN", "WL": "L", "PTS": 44 }),
            ])
        }
    }

    fn app(strict: bool) -> (Router, ApiState) {
        let analyzer = Analyzer::new(Arc::new(PassthroughDirectory), Arc::new(FakeLogService), 2024);
        let state = ApiState {
            analyzer: Arc::new(analyzer),
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::default()),
            strict_stat_category: strict,
        };
        (router(state.clone(), cors_layer(ORIGIN).unwrap()), state)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn analyze_returns_camel_case_result() {
        let (app, state) = app(true);
        let (status, body) = get(app, "/api/props/analyze?player=Luka%20Doncic&stat=points&line=18.5&lookback=4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["playerName"], "Luka Doncic");
        assert_eq!(body["overCount"], 2);
        assert_eq!(body["underCount"], 2);
        assert_eq!(body["lastNAvg"], 19.3);
        assert_eq!(body["seasonAvg"], 19.3);
        assert_eq!(body["inputLine"], 18.5);
        assert_eq!(body["lookback"], 4);
        let games = body["games"].as_array().unwrap();
        assert_eq!(games.len(), 4);
        assert_eq!(games[0]["date"], "2025-01-03");
        assert_eq!(games[0]["label"], "2025-01-03 DAL @ DEN");
        assert_eq!(games[3]["opponent"], "DAL vs. SAC");
        assert_eq!(games[3]["winlose"], "W");
        assert_eq!(state.health.analyses_ok(), 1);
        assert_eq!(state.latency.len(), 1);
    }

    #[tokio::test]
    async fn lookback_defaults_when_omitted() {
        let (app, _) = app(true);
        let (status, body) = get(app, "/api/props/analyze?player=Luka%20Doncic&stat=pra&line=20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lookback"], DEFAULT_LOOKBACK);
        assert_eq!(body["games"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn bad_lookback_is_400_with_error_body() {
        let (app, state) = app(true);
        let (status, body) = get(app, "/api/props/analyze?player=Luka%20Doncic&stat=points&line=18.5&lookback=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("lookback"));
        assert_eq!(state.health.analyses_failed(), 1);
    }

    #[tokio::test]
    async fn unparseable_line_is_400() {
        let (app, _) = app(true);
        let (status, body) = get(app, "/api/props/analyze?player=Luka%20Doncic&stat=points&line=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_stat_depends_on_strictness() {
        let uri = "/api/props/analyze?player=Luka%20Doncic&stat=turnovers&line=2.5&lookback=5";
        let (status, _) = get(app(true).0, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(app(false).0, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stat"], "turnovers");
        assert_eq!(body["overCount"], 0);
        assert_eq!(body["underCount"], 5);
    }

    #[tokio::test]
    async fn unknown_player_is_404_wrapped() {
        let (app, _) = app(true);
        let (status, body) = get(app, "/api/props/analyze?player=Nobody&stat=points&line=10").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Failed to analyze props: Player not found: Nobody");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let (app, _) = app(true);
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", ORIGIN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
            Some(ORIGIN)
        );
    }

    #[tokio::test]
    async fn health_reports_provider_and_counts() {
        let (app, state) = app(true);
        state.health.record_failed(42);
        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "fake_gamelog");
        assert_eq!(body["analyses_failed"], 1);
        assert_eq!(body["last_analysis_at_ns"], 42);
    }

    #[tokio::test]
    async fn latency_is_null_before_any_sample() {
        let (app, _) = app(true);
        let (_, body) = get(app, "/stats/latency").await;
        assert!(body["p50_ms"].is_null());
        assert_eq!(body["sample_count"], 0);
    }

    #[test]
    fn cors_rejects_invalid_origin() {
        assert!(matches!(cors_layer("bad\norigin"), Err(AppError::Config(_))));
    }
}
