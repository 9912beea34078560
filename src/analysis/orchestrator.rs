use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analysis::{aggregate, normalize, select};
use crate::error::{AppError, Result};
use crate::providers::{GameLogProvider, PlayerDirectory};
use crate::types::{AnalysisRequest, AnalysisResult, GameLog};

/// Pipeline progress. `Analysis` errors carry the last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Start,
    PlayerResolved,
    GamesFetched,
    Normalized,
    Aggregated,
    Done,
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AnalysisStage::Start => "start",
            AnalysisStage::PlayerResolved => "player_resolved",
            AnalysisStage::GamesFetched => "games_fetched",
            AnalysisStage::Normalized => "normalized",
            AnalysisStage::Aggregated => "aggregated",
            AnalysisStage::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Runs one prop analysis end to end. Holds no per-request state, so a single
/// instance is shared by every handler.
pub struct Analyzer {
    directory: Arc<dyn PlayerDirectory>,
    provider: Arc<dyn GameLogProvider>,
    default_season: i32,
}

impl Analyzer {
    pub fn new(
        directory: Arc<dyn PlayerDirectory>,
        provider: Arc<dyn GameLogProvider>,
        default_season: i32,
    ) -> Self {
        Self {
            directory,
            provider,
            default_season,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Resolve, fetch, normalize, select, aggregate. The first failure aborts
    /// the run and is returned wrapped in `AppError::Analysis`.
    pub async fn analyze(&self, req: &AnalysisRequest) -> Result<AnalysisResult> {
        let mut stage = AnalysisStage::Start;
        match self.run(req, &mut stage).await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(
                    player = %req.player,
                    stat = %req.stat,
                    stage = %stage,
                    upstream = e.is_upstream(),
                    "Analysis failed: {e}"
                );
                Err(AppError::Analysis {
                    stage,
                    source: Box::new(e),
                })
            }
        }
    }

    async fn run(&self, req: &AnalysisRequest, stage: &mut AnalysisStage) -> Result<AnalysisResult> {
        let player = self.directory.lookup(&req.player).await?;
        *stage = AnalysisStage::PlayerResolved;
        debug!(player = %player.full_name, id = ?player.id, team = ?player.team_abbreviation, "player resolved");

        let season = req.season.unwrap_or(self.default_season);
        let records = self.provider.fetch(&player, req.lookback, Some(season)).await?;
        *stage = AnalysisStage::GamesFetched;
        debug!(provider = self.provider.name(), records = records.len(), "games fetched");

        let shape = self.provider.shape();
        let games = records
            .iter()
            .map(|r| normalize(r, shape, &req.stat, player.team_id))
            .collect::<Result<Vec<GameLog>>>()?;
        *stage = AnalysisStage::Normalized;

        let games = select(games, req.lookback);
        let agg = aggregate(&games, req.line);
        *stage = AnalysisStage::Aggregated;

        info!(
            player = %player.full_name,
            stat = %req.stat,
            line = req.line,
            games = games.len(),
            average = agg.average,
            over = agg.over_count,
            under = agg.under_count,
            "ANALYSIS | {} {} line {} | avg {:.1} | over {} / under {}",
            player.full_name, req.stat, req.line, agg.average, agg.over_count, agg.under_count,
        );

        let result = AnalysisResult {
            player_name: player.full_name,
            team: player.team_abbreviation,
            team_name: player.team_name,
            position: player.position,
            jersey: player.jersey,
            stat: req.stat.clone(),
            games,
            last_n_avg: agg.average,
            season_avg: agg.average,
            over_count: agg.over_count,
            under_count: agg.under_count,
            input_line: req.line,
            lookback: req.lookback,
        };
        *stage = AnalysisStage::Done;
        Ok(result)
    }
}
