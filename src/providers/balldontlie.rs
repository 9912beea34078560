use async_trait::async_trait;
use tracing::{debug, warn};

use crate::analysis::RecordShape;
use crate::config::{UpstreamConfig, PLAYER_SEARCH_PAGE_SIZE, STATS_MAX_PAGES, STATS_PAGE_SIZE};
use crate::error::{AppError, Result};
use crate::providers::http::UpstreamClient;
use crate::providers::{GameLogProvider, PlayerDirectory};
use crate::types::{GameRecord, PlayerRef};

/// balldontlie v1 API. Serves both the player search and per-game stats.
#[derive(Debug, Clone)]
pub struct BallDontLieClient {
    http: UpstreamClient,
}

impl BallDontLieClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            http: UpstreamClient::new(cfg)?,
        })
    }
}

#[async_trait]
impl PlayerDirectory for BallDontLieClient {
    async fn lookup(&self, name: &str) -> Result<PlayerRef> {
        let resp = self
            .http
            .get_json(
                "/players",
                &[
                    ("search", name.trim().to_string()),
                    ("per_page", PLAYER_SEARCH_PAGE_SIZE.to_string()),
                ],
            )
            .await?;

        let candidates = resp.get("data").and_then(|d| d.as_array());
        debug!(search = name, candidates = candidates.map_or(0, |c| c.len()), "player search");

        candidates
            .and_then(|c| c.first())
            .and_then(parse_player)
            .ok_or_else(|| AppError::PlayerNotFound(name.trim().to_string()))
    }
}

#[async_trait]
impl GameLogProvider for BallDontLieClient {
    fn name(&self) -> &'static str {
        "balldontlie"
    }

    fn shape(&self) -> RecordShape {
        RecordShape::StatsApi
    }

    async fn fetch(
        &self,
        player: &PlayerRef,
        lookback: usize,
        season: Option<i32>,
    ) -> Result<Vec<GameRecord>> {
        let id = player.id.ok_or_else(|| {
            AppError::InvalidRequest(format!("no stats API id for {}", player.full_name))
        })?;

        let mut base_query = vec![
            ("player_ids[]", id.to_string()),
            ("per_page", STATS_PAGE_SIZE.to_string()),
        ];
        if let Some(season) = season {
            base_query.push(("seasons[]", season.to_string()));
        }

        // Upstream order is by id, not date, so the newest games can sit on
        // any page. Collect every page and let the selector pick the window.
        let mut rows = Vec::new();
        let mut cursor: Option<u64> = None;
        for page in 1..=STATS_MAX_PAGES {
            let mut query = base_query.clone();
            if let Some(c) = cursor {
                query.push(("cursor", c.to_string()));
            }

            let resp = self.http.get_json("/stats", &query).await?;
            let data = resp.get("data").and_then(|d| d.as_array()).ok_or_else(|| {
                AppError::MalformedRecord("stats response has no data array".to_string())
            })?;
            rows.extend(data.iter().cloned());

            cursor = resp
                .get("meta")
                .and_then(|m| m.get("next_cursor"))
                .and_then(|c| c.as_u64());
            debug!(page, rows = data.len(), next_cursor = ?cursor, "stats page");
            if cursor.is_none() {
                break;
            }
        }

        if cursor.is_some() {
            warn!(
                base_url = self.http.base_url(),
                player_id = id,
                pages = STATS_MAX_PAGES,
                "stats history truncated at page limit"
            );
        }
        debug!(player_id = id, lookback, rows = rows.len(), "stats fetched");
        Ok(rows)
    }
}

/// Parse one `/players` entry. Returns None if it has no usable id.
fn parse_player(v: &serde_json::Value) -> Option<PlayerRef> {
    let id = v.get("id")?.as_u64()?;
    let text = |key: &str| {
        v.get(key)
            .and_then(|x| x.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let team = v.get("team");
    let team_text = |key: &str| {
        team.and_then(|t| t.get(key))
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
    };

    let full_name = format!(
        "{} {}",
        text("first_name").unwrap_or_default(),
        text("last_name").unwrap_or_default()
    )
    .trim()
    .to_string();

    Some(PlayerRef {
        id: Some(id),
        full_name,
        team_abbreviation: team_text("abbreviation"),
        team_id: team.and_then(|t| t.get("id")).and_then(|x| x.as_u64()),
        team_name: team_text("full_name"),
        position: text("position"),
        jersey: text("jersey_number"),
    })
}
