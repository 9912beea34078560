use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::MAX_LOOKBACK;
use crate::error::{AppError, Result};

/// One game's raw stats exactly as an upstream returned it.
pub type GameRecord = serde_json::Value;

// ---------------------------------------------------------------------------
// Stat categories
// ---------------------------------------------------------------------------

/// Base box-score stats every upstream shape exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseStat {
    Points,
    Rebounds,
    Assists,
    ThreePointers,
    Steals,
    Blocks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatCategory {
    Points,
    Rebounds,
    Assists,
    ThreePointers,
    Steals,
    Blocks,
    /// Points + rebounds + assists.
    Pra,
    /// Points + rebounds.
    Pr,
    /// Points + assists.
    Pa,
    /// Anything else the caller sent. Scores as zero.
    Unrecognized(String),
}

impl StatCategory {
    pub const ALL: [StatCategory; 9] = [
        StatCategory::Points,
        StatCategory::Rebounds,
        StatCategory::Assists,
        StatCategory::ThreePointers,
        StatCategory::Steals,
        StatCategory::Blocks,
        StatCategory::Pra,
        StatCategory::Pr,
        StatCategory::Pa,
    ];

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "points" => StatCategory::Points,
            "rebounds" => StatCategory::Rebounds,
            "assists" => StatCategory::Assists,
            "three_pointers" => StatCategory::ThreePointers,
            "steals" => StatCategory::Steals,
            "blocks" => StatCategory::Blocks,
            "pra" => StatCategory::Pra,
            "pr" => StatCategory::Pr,
            "pa" => StatCategory::Pa,
            _ => StatCategory::Unrecognized(s.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, StatCategory::Unrecognized(_))
    }

    /// Base stats summed to produce this category. Empty for unrecognized ones.
    pub fn components(&self) -> &'static [BaseStat] {
        match self {
            StatCategory::Points => &[BaseStat::Points],
            StatCategory::Rebounds => &[BaseStat::Rebounds],
            StatCategory::Assists => &[BaseStat::Assists],
            StatCategory::ThreePointers => &[BaseStat::ThreePointers],
            StatCategory::Steals => &[BaseStat::Steals],
            StatCategory::Blocks => &[BaseStat::Blocks],
            StatCategory::Pra => &[BaseStat::Points, BaseStat::Rebounds, BaseStat::Assists],
            StatCategory::Pr => &[BaseStat::Points, BaseStat::Rebounds],
            StatCategory::Pa => &[BaseStat::Points, BaseStat::Assists],
            StatCategory::Unrecognized(_) => &[],
        }
    }
}

impl std::fmt::Display for StatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatCategory::Points => "points",
            StatCategory::Rebounds => "rebounds",
            StatCategory::Assists => "assists",
            StatCategory::ThreePointers => "three_pointers",
            StatCategory::Steals => "steals",
            StatCategory::Blocks => "blocks",
            StatCategory::Pra => "pra",
            StatCategory::Pr => "pr",
            StatCategory::Pa => "pa",
            StatCategory::Unrecognized(raw) => raw.as_str(),
        };
        write!(f, "{s}")
    }
}

impl Serialize for StatCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A player resolved by the directory.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRef {
    /// Upstream numeric id. None when the directory only echoes the name.
    pub id: Option<u64>,
    pub full_name: String,
    pub team_abbreviation: Option<String>,
    pub team_id: Option<u64>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub jersey: Option<String>,
}

impl PlayerRef {
    pub fn name_only(name: &str) -> Self {
        Self {
            id: None,
            full_name: name.trim().to_string(),
            team_abbreviation: None,
            team_id: None,
            team_name: None,
            position: None,
            jersey: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized game logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLog {
    pub date: NaiveDate,
    pub opponent: String,
    pub value: f64,
    pub label: String,
    /// "W" or "L" when the upstream exposes the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winlose: Option<String>,
}

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub player: String,
    pub stat: StatCategory,
    pub line: f64,
    pub lookback: usize,
    pub season: Option<i32>,
}

impl AnalysisRequest {
    /// Build a request from loosely typed caller input, rejecting anything the
    /// pipeline can't run on. Unknown stats are only rejected when `strict_stat`.
    pub fn new(
        player: &str,
        stat: &str,
        line: f64,
        lookback: i64,
        season: Option<i32>,
        strict_stat: bool,
    ) -> Result<Self> {
        let player = player.trim();
        if player.is_empty() {
            return Err(AppError::InvalidRequest("player must not be empty".to_string()));
        }
        let stat = StatCategory::parse(stat);
        if strict_stat && !stat.is_recognized() {
            let known: Vec<String> = StatCategory::ALL.iter().map(|s| s.to_string()).collect();
            return Err(AppError::InvalidRequest(format!(
                "unknown stat category \"{stat}\" (expected one of {})",
                known.join(", ")
            )));
        }
        if !line.is_finite() {
            return Err(AppError::InvalidRequest("line must be a finite number".to_string()));
        }
        if lookback <= 0 {
            return Err(AppError::InvalidRequest(format!(
                "lookback must be a positive integer, got {lookback}"
            )));
        }
        if lookback as u64 > MAX_LOOKBACK as u64 {
            return Err(AppError::InvalidRequest(format!(
                "lookback must be at most {MAX_LOOKBACK}, got {lookback}"
            )));
        }
        Ok(Self {
            player: player.to_string(),
            stat,
            line,
            lookback: lookback as usize,
            season,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub player_name: String,
    pub team: Option<String>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub jersey: Option<String>,
    pub stat: StatCategory,
    pub games: Vec<GameLog>,
    pub last_n_avg: f64,
    /// Same value as `last_n_avg`; kept for clients that read it.
    pub season_avg: f64,
    pub over_count: usize,
    pub under_count: usize,
    pub input_line: f64,
    pub lookback: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_category_round_trips_names() {
        for stat in StatCategory::ALL {
            assert_eq!(StatCategory::parse(&stat.to_string()), stat);
        }
        assert_eq!(
            StatCategory::parse("turnovers"),
            StatCategory::Unrecognized("turnovers".to_string())
        );
    }

    #[test]
    fn composite_components() {
        assert_eq!(
            StatCategory::Pra.components(),
            &[BaseStat::Points, BaseStat::Rebounds, BaseStat::Assists]
        );
        assert!(StatCategory::Unrecognized("x".into()).components().is_empty());
    }

    #[test]
    fn request_rejects_non_positive_lookback() {
        assert!(matches!(
            AnalysisRequest::new("LeBron James", "points", 24.5, 0, None, true),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            AnalysisRequest::new("LeBron James", "points", 24.5, -3, None, true),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            AnalysisRequest::new("LeBron James", "points", 24.5, 101, None, true),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn request_rejects_blank_player_and_nan_line() {
        assert!(AnalysisRequest::new("   ", "points", 10.0, 5, None, true).is_err());
        assert!(AnalysisRequest::new("Tatum", "points", f64::NAN, 5, None, true).is_err());
    }

    #[test]
    fn unknown_stat_error_lists_known_categories() {
        let err = AnalysisRequest::new("Tatum", "turnovers", 3.5, 5, None, true).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"turnovers\""), "{msg}");
        assert!(msg.contains("points, rebounds"), "{msg}");
        assert!(msg.contains("pa)"), "{msg}");
    }

    #[test]
    fn unknown_stat_is_strictness_dependent() {
        assert!(AnalysisRequest::new("Tatum", "turnovers", 3.5, 5, None, true).is_err());
        let req = AnalysisRequest::new("Tatum", "turnovers", 3.5, 5, None, false).unwrap();
        assert!(!req.stat.is_recognized());
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = AnalysisResult {
            player_name: "Jayson Tatum".into(),
            team: Some("BOS".into()),
            team_name: None,
            position: Some("F".into()),
            jersey: None,
            stat: StatCategory::Pra,
            games: Vec::new(),
            last_n_avg: 0.0,
            season_avg: 0.0,
            over_count: 0,
            under_count: 0,
            input_line: 40.5,
            lookback: 10,
        };
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["playerName"], "Jayson Tatum");
        assert_eq!(v["stat"], "pra");
        assert_eq!(v["lastNAvg"], 0.0);
        assert_eq!(v["inputLine"], 40.5);
        assert!(v.get("overCount").is_some());
    }
}
