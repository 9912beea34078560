use crate::types::{BaseStat, GameRecord, StatCategory};

/// Raw field names for the base stats in one upstream record shape.
#[derive(Debug, Clone, Copy)]
pub struct StatFields {
    pub points: &'static str,
    pub rebounds: &'static str,
    pub assists: &'static str,
    pub three_pointers: &'static str,
    pub steals: &'static str,
    pub blocks: &'static str,
}

impl StatFields {
    pub fn field(&self, stat: BaseStat) -> &'static str {
        match stat {
            BaseStat::Points => self.points,
            BaseStat::Rebounds => self.rebounds,
            BaseStat::Assists => self.assists,
            BaseStat::ThreePointers => self.three_pointers,
            BaseStat::Steals => self.steals,
            BaseStat::Blocks => self.blocks,
        }
    }
}

/// balldontlie `/stats` rows.
pub const STATS_API_FIELDS: StatFields = StatFields {
    points: "pts",
    rebounds: "reb",
    assists: "ast",
    three_pointers: "fg3m",
    steals: "stl",
    blocks: "blk",
};

/// Game log service rows (stats.nba.com column names).
pub const GAMELOG_SERVICE_FIELDS: StatFields = StatFields {
    points: "PTS",
    rebounds: "REB",
    assists: "AST",
    three_pointers: "FG3M",
    steals: "STL",
    blocks: "BLK",
};

/// Read a numeric field, accepting numbers or numeric strings.
/// Missing, null and unparseable values read as zero.
pub fn numeric_field(record: &GameRecord, key: &str) -> f64 {
    record
        .get(key)
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .unwrap_or(0.0)
}

/// Value of `stat` for one game. Composite categories sum their components;
/// unrecognized categories have no components and so extract as zero.
pub fn extract(record: &GameRecord, stat: &StatCategory, fields: &StatFields) -> f64 {
    stat.components()
        .iter()
        .map(|base| numeric_field(record, fields.field(*base)))
        .sum()
}
