use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs / types.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct AnalysisResponse {
    pub player_name: String,
    pub team: Option<String>,
    pub team_name: Option<String>,
    pub position: Option<String>,
    pub jersey: Option<String>,
    pub stat: String,
    pub games: Vec<GameResponse>,
    pub last_n_avg: f64,
    pub season_avg: f64,
    pub over_count: usize,
    pub under_count: usize,
    pub input_line: f64,
    pub lookback: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameResponse {
    pub date: String,
    pub opponent: String,
    pub value: f64,
    pub winlose: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

pub const STAT_OPTIONS: [(&str, &str); 9] = [
    ("Points", "points"),
    ("Rebounds", "rebounds"),
    ("Assists", "assists"),
    ("3-Pointers Made", "three_pointers"),
    ("Steals", "steals"),
    ("Blocks", "blocks"),
    ("Pts+Reb+Ast", "pra"),
    ("Pts+Reb", "pr"),
    ("Pts+Ast", "pa"),
];

pub const LOOKBACK_OPTIONS: [usize; 4] = [5, 10, 15, 20];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Player,
    Stat,
    Line,
    Lookback,
}

impl Field {
    const ORDER: [Field; 4] = [Field::Player, Field::Stat, Field::Line, Field::Lookback];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Field {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Field {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    pub player: String,
    pub stat_idx: usize,
    pub line: String,
    pub lookback_idx: usize,
    pub focus: Field,
}

impl Default for Form {
    fn default() -> Self {
        Self {
            player: String::new(),
            stat_idx: 0,
            line: String::new(),
            // 10 games, as the web form defaults to
            lookback_idx: 1,
            focus: Field::Player,
        }
    }
}

impl Form {
    pub fn stat_label(&self) -> &'static str {
        STAT_OPTIONS[self.stat_idx].0
    }

    pub fn stat_value(&self) -> &'static str {
        STAT_OPTIONS[self.stat_idx].1
    }

    pub fn lookback(&self) -> usize {
        LOOKBACK_OPTIONS[self.lookback_idx]
    }

    pub fn input_char(&mut self, c: char) {
        match self.focus {
            Field::Player => self.player.push(c),
            Field::Line if c.is_ascii_digit() || c == '.' || c == '-' => self.line.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Field::Player => {
                self.player.pop();
            }
            Field::Line => {
                self.line.pop();
            }
            _ => {}
        }
    }

    /// Step the focused selector by `delta` (wrapping). No-op on text fields.
    pub fn cycle(&mut self, delta: isize) {
        let step = |idx: usize, len: usize| (idx as isize + delta).rem_euclid(len as isize) as usize;
        match self.focus {
            Field::Stat => self.stat_idx = step(self.stat_idx, STAT_OPTIONS.len()),
            Field::Lookback => self.lookback_idx = step(self.lookback_idx, LOOKBACK_OPTIONS.len()),
            _ => {}
        }
    }

    /// Query parameters for the analyze endpoint, or a message for the user.
    pub fn query(&self) -> Result<Vec<(&'static str, String)>, String> {
        let player = self.player.trim();
        if player.is_empty() || self.line.trim().is_empty() {
            return Err("Please fill in player name and line.".to_string());
        }
        let line: f64 = self
            .line
            .trim()
            .parse()
            .map_err(|_| format!("Line must be a number, got {:?}", self.line))?;
        Ok(vec![
            ("player", player.to_string()),
            ("stat", self.stat_value().to_string()),
            ("line", line.to_string()),
            ("lookback", self.lookback().to_string()),
        ])
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RequestStatus {
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: RequestStatus,
    pub form: Form,
    pub result: Option<AnalysisResponse>,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: RequestStatus::Idle,
            form: Form::default(),
            result: None,
            base_url,
        }
    }

    /// Run the analysis for the current form. Errors land in `status`;
    /// the previous result is cleared either way.
    pub async fn analyze(&mut self, client: &reqwest::Client) {
        let query = match self.form.query() {
            Ok(q) => q,
            Err(msg) => {
                self.status = RequestStatus::Error(msg);
                return;
            }
        };
        self.status = RequestStatus::Loading;
        self.result = None;

        let url = format!("{}/api/props/analyze", self.base_url);
        let resp = match client.get(&url).query(&query).send().await {
            Ok(r) => r,
            Err(e) => {
                self.status = RequestStatus::Error(format!(
                    "Failed to connect to server at {}: {e}",
                    self.base_url
                ));
                return;
            }
        };

        if resp.status().is_success() {
            match resp.json::<AnalysisResponse>().await {
                Ok(result) => {
                    self.result = Some(result);
                    self.status = RequestStatus::Ready;
                }
                Err(e) => self.status = RequestStatus::Error(format!("parse error: {e}")),
            }
        } else {
            let status = resp.status();
            let msg = match resp.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => format!("server returned {status}"),
            };
            self.status = RequestStatus::Error(msg);
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Percentage of games over the line, rounded. Zero for an empty window.
pub fn hit_rate(over: usize, total: usize) -> u16 {
    if total == 0 {
        return 0;
    }
    ((over as f64 / total as f64) * 100.0).round() as u16
}

/// Whole numbers without decimals, anything else with one.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

/// `MM-DD` from an ISO date; the input unchanged if it's too short.
pub fn short_date(date: &str) -> &str {
    date.get(5..10).unwrap_or(date)
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
