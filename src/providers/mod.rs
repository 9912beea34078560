//! Upstream collaborators: who the player is, and what they did in recent games.

pub mod balldontlie;
pub mod gamelog_service;
pub mod http;

use async_trait::async_trait;

use crate::analysis::RecordShape;
use crate::error::Result;
use crate::types::{GameRecord, PlayerRef};

pub use balldontlie::BallDontLieClient;
pub use gamelog_service::GameLogServiceClient;

/// Resolves a free-text player name to a single player.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Fails with `AppError::PlayerNotFound` when nothing matches.
    async fn lookup(&self, name: &str) -> Result<PlayerRef>;
}

/// Supplies a player's recent raw game records.
///
/// Implementations differ in how they key the player (numeric id or name)
/// and in the record layout they return; `shape()` tells the normalizer which.
#[async_trait]
pub trait GameLogProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn shape(&self) -> RecordShape;

    async fn fetch(
        &self,
        player: &PlayerRef,
        lookback: usize,
        season: Option<i32>,
    ) -> Result<Vec<GameRecord>>;
}

/// Directory that trusts the caller's spelling. Used with the game log
/// service, which resolves names itself.
#[derive(Debug, Default, Clone)]
pub struct PassthroughDirectory;

#[async_trait]
impl PlayerDirectory for PassthroughDirectory {
    async fn lookup(&self, name: &str) -> Result<PlayerRef> {
        Ok(PlayerRef::name_only(name))
    }
}
