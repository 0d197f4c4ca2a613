// Data model: API wire shapes, the canonical game record, and view filters.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of most recent games kept for a season.
pub const RECENT_GAMES_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// Team metadata as returned by `GET /teams/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub full_name: String,
    pub conference: String,
    pub division: String,
    pub city: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

impl Team {
    /// One-line summary shown in the team header.
    pub fn blurb(&self) -> String {
        format!(
            "{} • {} Conference, {} Division — based in {}.",
            self.full_name, self.conference, self.division, self.city
        )
    }
}

// ---------------------------------------------------------------------------
// RawGame (wire shape)
// ---------------------------------------------------------------------------

/// A participant reference nested inside a raw game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTeamRef {
    pub id: u64,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub name: String,
}

impl RawTeamRef {
    /// "City Name", e.g. "San Antonio Spurs".
    pub fn display_name(&self) -> String {
        match (self.city.is_empty(), self.name.is_empty()) {
            (false, false) => format!("{} {}", self.city, self.name),
            (true, _) => self.name.clone(),
            (false, true) => self.city.clone(),
        }
    }
}

/// A game record exactly as the API returns it. Discarded after
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGame {
    pub id: u64,
    pub date: String,
    pub home_team: RawTeamRef,
    pub visitor_team: RawTeamRef,
    #[serde(default)]
    pub home_team_score: u32,
    #[serde(default)]
    pub visitor_team_score: u32,
}

// ---------------------------------------------------------------------------
// Game (canonical)
// ---------------------------------------------------------------------------

/// A game seen from the tracked team's side.
///
/// `is_win` is always `tracked_team_score > opponent_score` (a tie counts as
/// a loss) and `opponent_name` always names the non-tracked participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub home_name: String,
    pub away_name: String,
    pub home_score: u32,
    pub away_score: u32,
    pub tracked_team_is_home: bool,
    pub tracked_team_score: u32,
    pub opponent_score: u32,
    pub is_win: bool,
    pub opponent_name: String,
}

impl Game {
    /// "W" or "L".
    pub fn result_letter(&self) -> &'static str {
        if self.is_win {
            "W"
        } else {
            "L"
        }
    }

    /// "Home" or "Away", from the tracked team's side.
    pub fn location_label(&self) -> &'static str {
        if self.tracked_team_is_home {
            "Home"
        } else {
            "Away"
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Wins,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Wins => "wins",
        }
    }

    pub fn admits(&self, game: &Game) -> bool {
        match self {
            Filter::All => true,
            Filter::Wins => game.is_win,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilter(pub String);

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "wins" => Ok(Filter::Wins),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// Seasons are labelled by their start year: 2022 is "2022–2023".
pub fn season_label(season: i32) -> String {
    format!("{}–{}", season, season.saturating_add(1))
}
