use std::time::Duration;

use crate::error::{AppError, Result};

pub const BALLDONTLIE_API_URL: &str = "https://api.balldontlie.io/v1";
pub const GAMELOG_SERVICE_URL: &str = "http://localhost:5000";
pub const FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// Season year passed to the stats API when the caller doesn't pick one.
pub const DEFAULT_SEASON: i32 = 2024;

/// Window size used when the request omits `lookback`.
pub const DEFAULT_LOOKBACK: usize = 10;

/// Upper bound on `lookback`. The stats API pages at 100 records.
pub const MAX_LOOKBACK: usize = 100;

/// Candidates requested from the player search; the first one wins.
pub const PLAYER_SEARCH_PAGE_SIZE: usize = 5;

/// Records requested per stats page (the upstream maximum).
pub const STATS_PAGE_SIZE: usize = 100;

/// Cursor pages followed per fetch. A full season with playoffs is
/// at most 110 games, so two pages cover it; the rest is headroom.
pub const STATS_MAX_PAGES: usize = 4;

/// Per-call timeout for upstream requests (seconds).
pub const UPSTREAM_TIMEOUT_SECS: u64 = 10;

pub const USER_AGENT: &str = concat!("prop-analyzer/", env!("CARGO_PKG_VERSION"));

/// Which upstream supplies raw game records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// balldontlie stats API, keyed by player id.
    BallDontLie,
    /// Single-purpose game log service, keyed by player name.
    GameLogService,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "balldontlie" | "stats_api" => Some(ProviderKind::BallDontLie),
            "gamelog_service" | "gamelog" => Some(ProviderKind::GameLogService),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::BallDontLie => write!(f, "balldontlie"),
            ProviderKind::GameLogService => write!(f, "gamelog_service"),
        }
    }
}

/// Connection settings for one upstream. Injected into each client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Extra headers sent with every request, e.g. `Authorization`.
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Only origin allowed by CORS (FRONTEND_ORIGIN)
    pub frontend_origin: String,
    pub provider: ProviderKind,
    pub balldontlie_api_url: String,
    /// Sent verbatim as the `Authorization` header (BALLDONTLIE_API_KEY)
    pub balldontlie_api_key: Option<String>,
    pub gamelog_service_url: String,
    pub default_season: i32,
    pub upstream_timeout: Duration,
    /// Reject unknown stat categories instead of scoring them as zero (STRICT_STAT_CATEGORY)
    pub strict_stat_category: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let provider_raw =
            std::env::var("GAME_LOG_PROVIDER").unwrap_or_else(|_| "balldontlie".to_string());
        let provider = ProviderKind::parse(&provider_raw).ok_or_else(|| {
            AppError::Config(format!(
                "GAME_LOG_PROVIDER must be balldontlie or gamelog_service, got {provider_raw:?}"
            ))
        })?;

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            frontend_origin: std::env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| FRONTEND_ORIGIN.to_string()),
            provider,
            balldontlie_api_url: std::env::var("BALLDONTLIE_API_URL")
                .unwrap_or_else(|_| BALLDONTLIE_API_URL.to_string()),
            balldontlie_api_key: std::env::var("BALLDONTLIE_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            gamelog_service_url: std::env::var("GAMELOG_SERVICE_URL")
                .unwrap_or_else(|_| GAMELOG_SERVICE_URL.to_string()),
            default_season: std::env::var("DEFAULT_SEASON")
                .unwrap_or_else(|_| DEFAULT_SEASON.to_string())
                .parse::<i32>()
                .unwrap_or(DEFAULT_SEASON),
            upstream_timeout: parse_upstream_timeout(std::env::var("UPSTREAM_TIMEOUT_SECS").ok())?,
            strict_stat_category: std::env::var("STRICT_STAT_CATEGORY")
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        })
    }

    pub fn balldontlie_upstream(&self) -> UpstreamConfig {
        let headers = self
            .balldontlie_api_key
            .iter()
            .map(|key| ("Authorization".to_string(), key.clone()))
            .collect();
        UpstreamConfig {
            base_url: self.balldontlie_api_url.clone(),
            headers,
            timeout: self.upstream_timeout,
        }
    }

    pub fn gamelog_service_upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.gamelog_service_url.clone(),
            headers: Vec::new(),
            timeout: self.upstream_timeout,
        }
    }
}

/// Unparseable values fall back to the default; zero would fail every call.
fn parse_upstream_timeout(raw: Option<String>) -> Result<Duration> {
    let secs = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(UPSTREAM_TIMEOUT_SECS);
    if secs == 0 {
        return Err(AppError::Config(
            "UPSTREAM_TIMEOUT_SECS must be at least 1".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
