use chrono::NaiveDate;

use crate::analysis::extractor::{extract, numeric_field, StatFields, GAMELOG_SERVICE_FIELDS, STATS_API_FIELDS};
use crate::error::{AppError, Result};
use crate::types::{GameLog, GameRecord, StatCategory};

/// Raw record layouts produced by the supported upstreams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// balldontlie `/stats` row: lowercase stat keys, nested `game` object,
    /// no matchup string (home/away derived from team ids).
    StatsApi,
    /// Game log service row: uppercase keys, `GAME_DATE` and a ready-made
    /// `MATCHUP` such as `"LAL vs. GSW"` or `"LAL @ BOS"`.
    GameLogService,
}

impl RecordShape {
    pub fn fields(&self) -> &'static StatFields {
        match self {
            RecordShape::StatsApi => &STATS_API_FIELDS,
            RecordShape::GameLogService => &GAMELOG_SERVICE_FIELDS,
        }
    }
}

/// Convert one raw record into a `GameLog` carrying the requested stat.
/// `team_id` is the subject player's team, used for the home/away marker.
pub fn normalize(
    record: &GameRecord,
    shape: RecordShape,
    stat: &StatCategory,
    team_id: Option<u64>,
) -> Result<GameLog> {
    match shape {
        RecordShape::StatsApi => normalize_stats_api(record, stat, team_id),
        RecordShape::GameLogService => normalize_gamelog_service(record, stat),
    }
}

fn normalize_stats_api(record: &GameRecord, stat: &StatCategory, team_id: Option<u64>) -> Result<GameLog> {
    let game = record
        .get("game")
        .ok_or_else(|| AppError::MalformedRecord("stats row has no game object".to_string()))?;

    let raw_date = game.get("date").and_then(|d| d.as_str()).unwrap_or("");
    let date = parse_game_date(raw_date)?;

    let home_team_id = game.get("home_team_id").and_then(|v| v.as_u64());
    let is_home = home_team_id.is_some() && home_team_id == team_id;
    let opponent = if is_home { "vs" } else { "@" };

    let label = format!("{} {opponent}", date.format("%m-%d"));

    Ok(GameLog {
        date,
        opponent: opponent.to_string(),
        value: extract(record, stat, RecordShape::StatsApi.fields()),
        label,
        winlose: stats_api_winlose(game, is_home),
    })
}

/// Final scores are zero for games that haven't been played yet.
fn stats_api_winlose(game: &GameRecord, is_home: bool) -> Option<String> {
    let home = numeric_field(game, "home_team_score");
    let visitor = numeric_field(game, "visitor_team_score");
    if home <= 0.0 || visitor <= 0.0 || home == visitor {
        return None;
    }
    let won = if is_home { home > visitor } else { visitor > home };
    Some(if won { "W" } else { "L" }.to_string())
}

fn normalize_gamelog_service(record: &GameRecord, stat: &StatCategory) -> Result<GameLog> {
    let raw_date = record.get("GAME_DATE").and_then(|d| d.as_str()).unwrap_or("");
    let date = parse_game_date(raw_date)?;

    let matchup = record
        .get("MATCHUP")
        .and_then(|m| m.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    let label = format!("{date} {matchup}").trim_end().to_string();

    let winlose = record
        .get("WL")
        .and_then(|w| w.as_str())
        .map(|w| w.trim().to_uppercase())
        .filter(|w| w == "W" || w == "L");

    Ok(GameLog {
        date,
        opponent: matchup,
        value: extract(record, stat, RecordShape::GameLogService.fields()),
        label,
        winlose,
    })
}

/// Parse an upstream game date to day precision. Accepts ISO dates or
/// timestamps (anything after the first 10 characters is dropped) and the
/// `"APR 13, 2025"` form used by the game log service.
pub fn parse_game_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Some(day) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            return Ok(date);
        }
    }
    NaiveDate::parse_from_str(raw, "%b %d, %Y")
        .map_err(|_| AppError::MalformedRecord(format!("unparseable game date {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats_row(date: &str, home_team_id: u64) -> GameRecord {
        json!({
            "pts": 31, "reb": 7, "ast": 9, "fg3m": 4, "stl": 2, "blk": 1,
            "game": {
                "date": date,
                "home_team_id": home_team_id,
                "visitor_team_id": 99,
                "home_team_score": 118,
                "visitor_team_score": 110
            }
        })
    }

    #[test]
    fn stats_api_home_game() {
        let log = normalize(&stats_row("2024-01-15T00:00:00.000Z", 14), RecordShape::StatsApi, &StatCategory::Points, Some(14)).unwrap();
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(log.opponent, "vs");
        assert_eq!(log.label, "01-15 vs");
        assert_eq!(log.value, 31.0);
        assert_eq!(log.winlose.as_deref(), Some("W"));
    }

    #[test]
    fn stats_api_away_game() {
        let log = normalize(&stats_row("2024-02-03", 5), RecordShape::StatsApi, &StatCategory::Pra, Some(14)).unwrap();
        assert_eq!(log.opponent, "@");
        assert_eq!(log.label, "02-03 @");
        assert_eq!(log.value, 47.0);
        // Visiting side lost 110-118.
        assert_eq!(log.winlose.as_deref(), Some("L"));
    }

    #[test]
    fn stats_api_unknown_team_is_away() {
        let log = normalize(&stats_row("2024-02-03", 14), RecordShape::StatsApi, &StatCategory::Points, None).unwrap();
        assert_eq!(log.opponent, "@");
    }

    #[test]
    fn stats_api_unplayed_game_has_no_result() {
        let row = json!({ "pts": 0, "game": { "date": "2024-03-01", "home_team_id": 1, "home_team_score": 0, "visitor_team_score": 0 } });
        let log = normalize(&row, RecordShape::StatsApi, &StatCategory::Points, Some(1)).unwrap();
        assert!(log.winlose.is_none());
    }

    #[test]
    fn stats_api_missing_date_is_malformed() {
        let row = json!({ "pts": 10, "game": { "home_team_id": 1 } });
        let err = normalize(&row, RecordShape::StatsApi, &StatCategory::Points, Some(1)).unwrap_err();
        assert!(matches!(err, AppError::MalformedRecord(_)));

        let row = json!({ "pts": 10 });
        assert!(normalize(&row, RecordShape::StatsApi, &StatCategory::Points, Some(1)).is_err());
    }

    #[test]
    fn gamelog_service_passes_matchup_through() {
        let row = json!({
            "GAME_DATE": "APR 13, 2025",
            "MATCHUP": "LAL vs. GSW",
            "WL": "W",
            "PTS": 28, "REB": 10, "AST": 8
        });
        let log = normalize(&row, RecordShape::GameLogService, &StatCategory::Pr, Some(14)).unwrap();
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2025, 4, 13).unwrap());
        assert_eq!(log.opponent, "LAL vs. GSW");
        assert_eq!(log.label, "2025-04-13 LAL vs. GSW");
        assert_eq!(log.value, 38.0);
        assert_eq!(log.winlose.as_deref(), Some("W"));
    }

    #[test]
    fn gamelog_service_accepts_iso_dates() {
        let row = json!({ "GAME_DATE": "2025-11-02T00:00:00", "MATCHUP": "BOS @ NYK", "WL": "l", "BLK": 2 });
        let log = normalize(&row, RecordShape::GameLogService, &StatCategory::Blocks, None).unwrap();
        assert_eq!(log.label, "2025-11-02 BOS @ NYK");
        assert_eq!(log.value, 2.0);
        assert_eq!(log.winlose.as_deref(), Some("L"));
    }

    #[test]
    fn parse_game_date_rejects_garbage() {
        assert!(parse_game_date("").is_err());
        assert!(parse_game_date("yesterday").is_err());
        assert_eq!(
            parse_game_date("Oct 22, 2025").unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 22).unwrap()
        );
    }
}
