use crate::types::GameLog;

/// Sort games oldest to newest and keep the most recent `lookback`.
/// The sort is stable, so games on the same date keep their upstream order.
pub fn select(mut games: Vec<GameLog>, lookback: usize) -> Vec<GameLog> {
    games.sort_by_key(|g| g.date);
    if games.len() > lookback {
        games.drain(..games.len() - lookback);
    }
    games
}
