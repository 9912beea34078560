use async_trait::async_trait;

use crate::analysis::RecordShape;
use crate::config::UpstreamConfig;
use crate::error::{AppError, Result};
use crate::providers::http::UpstreamClient;
use crate::providers::GameLogProvider;
use crate::types::{GameRecord, PlayerRef};

/// Dedicated game log service: `GET /gamelog?player=<name>&lookback=<n>`.
/// Resolves the name itself and answers 404 when it can't.
#[derive(Debug, Clone)]
pub struct GameLogServiceClient {
    http: UpstreamClient,
}

impl GameLogServiceClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            http: UpstreamClient::new(cfg)?,
        })
    }
}

#[async_trait]
impl GameLogProvider for GameLogServiceClient {
    fn name(&self) -> &'static str {
        "gamelog_service"
    }

    fn shape(&self) -> RecordShape {
        RecordShape::GameLogService
    }

    /// The service always reports its own current season; `season` is ignored.
    async fn fetch(
        &self,
        player: &PlayerRef,
        lookback: usize,
        _season: Option<i32>,
    ) -> Result<Vec<GameRecord>> {
        let query = [
            ("player", player.full_name.clone()),
            ("lookback", lookback.to_string()),
        ];
        let resp = match self.http.get_json("/gamelog", &query).await {
            Ok(v) => v,
            Err(AppError::UpstreamStatus { status: 404, .. }) => {
                return Err(AppError::PlayerNotFound(player.full_name.clone()))
            }
            Err(e) => return Err(e),
        };

        match resp.get("games").and_then(|g| g.as_array()) {
            Some(rows) => Ok(rows.clone()),
            None => Err(AppError::MalformedRecord(
                "game log response has no games array".to_string(),
            )),
        }
    }
}
