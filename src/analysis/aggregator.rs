use crate::types::GameLog;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    /// Mean value, rounded half-up to one decimal. Zero when there are no games.
    pub average: f64,
    pub over_count: usize,
    pub under_count: usize,
}

/// Average and over/under split against `line`. A game exactly on the line is under.
pub fn aggregate(games: &[GameLog], line: f64) -> Aggregate {
    let over_count = games.iter().filter(|g| g.value > line).count();
    let average = if games.is_empty() {
        0.0
    } else {
        round_one_decimal(games.iter().map(|g| g.value).sum::<f64>() / games.len() as f64)
    };
    Aggregate {
        average,
        over_count,
        under_count: games.len() - over_count,
    }
}

/// Round half-up to one decimal place.
pub fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0 + 0.5).floor() / 10.0
}
