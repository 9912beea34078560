mod analysis;
mod api;
mod config;
mod error;
mod providers;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::Analyzer;
use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{cors_layer, router, ApiState};
use crate::config::{Config, ProviderKind};
use crate::error::Result;
use crate::providers::{
    BallDontLieClient, GameLogProvider, GameLogServiceClient, PassthroughDirectory, PlayerDirectory,
};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let analyzer = build_analyzer(&cfg)?;
    info!(
        "Provider: {} | default season {} | upstream timeout {}s | strict stats: {}",
        analyzer.provider_name(),
        cfg.default_season,
        cfg.upstream_timeout.as_secs(),
        cfg.strict_stat_category,
    );

    let api_state = ApiState {
        analyzer: Arc::new(analyzer),
        health: Arc::new(HealthState::new()),
        latency: Arc::new(LatencyStats::for_upstream_timeout(cfg.upstream_timeout)),
        strict_stat_category: cfg.strict_stat_category,
    };
    let app = router(api_state, cors_layer(&cfg.frontend_origin)?);

    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr} (CORS origin {})", cfg.frontend_origin);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire the directory and game log provider selected by configuration.
fn build_analyzer(cfg: &Config) -> Result<Analyzer> {
    let stats_api = || BallDontLieClient::new(&cfg.balldontlie_upstream()).map(Arc::new);

    let (directory, provider): (Arc<dyn PlayerDirectory>, Arc<dyn GameLogProvider>) =
        match cfg.provider {
            ProviderKind::BallDontLie => {
                if cfg.balldontlie_api_key.is_none() {
                    warn!("BALLDONTLIE_API_KEY not set: stats API requests will be rejected upstream");
                }
                let client = stats_api()?;
                (client.clone() as Arc<dyn PlayerDirectory>, client as Arc<dyn GameLogProvider>)
            }
            ProviderKind::GameLogService => {
                let provider: Arc<dyn GameLogProvider> =
                    Arc::new(GameLogServiceClient::new(&cfg.gamelog_service_upstream())?);
                // Team metadata comes from the stats API when we can reach it;
                // otherwise the log service resolves the name on its own.
                let directory: Arc<dyn PlayerDirectory> = if cfg.balldontlie_api_key.is_some() {
                    stats_api()?
                } else {
                    info!("No stats API key: player names go to the game log service unresolved");
                    Arc::new(PassthroughDirectory)
                };
                (directory, provider)
            }
        };

    Ok(Analyzer::new(directory, provider, cfg.default_season))
}
