// Render-sink types: everything the view model hands to a UI layer. All of
// it is plain, serializable data; markup is the UI's business.

use serde::Serialize;

use courtside_core::error::FeedError;
use courtside_core::model::{season_label, Filter, Game, Team};

// ---------------------------------------------------------------------------
// Copy shown for empty and error states
// ---------------------------------------------------------------------------

pub const LOADING_NOTICE: &str = "Loading recent games…";
pub const LOAD_ERROR_NOTICE: &str = "Error loading games. Please try again later.";
pub const NO_SEASON_GAMES_NOTICE: &str = "No games available for this season.";
pub const NO_GAMES_NOTICE: &str = "No games loaded yet.";
pub const FILTER_EMPTY_NOTICE: &str = "No games match this filter.";
pub const TEAM_ERROR_NOTICE: &str = "Unable to load team info right now. Refresh to try again.";

// ---------------------------------------------------------------------------
// Load state
// ---------------------------------------------------------------------------

/// Per-season load cycle: `Idle -> Loading -> {Ready, Error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading {
        season: i32,
    },
    Ready {
        season: i32,
    },
    Error {
        season: i32,
        /// User-facing message.
        message: String,
        /// Underlying cause, for logs and debugging views.
        detail: String,
    },
}

impl LoadState {
    pub fn failed(season: i32, error: &FeedError) -> Self {
        let message = if error.is_empty_payload() {
            NO_SEASON_GAMES_NOTICE
        } else {
            LOAD_ERROR_NOTICE
        };
        LoadState::Error {
            season,
            message: message.to_string(),
            detail: error.to_string(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }
}

/// What a single `load_season` call ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The season's games replaced the held list.
    Ready { season: i32, games: usize },
    /// The request failed; the held list is untouched.
    Failed { season: i32, error: FeedError },
    /// A newer `load_season` was issued while this one was in flight; the
    /// response was discarded.
    Superseded { season: i32 },
    /// The season is outside the supported range; nothing was requested and
    /// no state changed.
    Rejected { season: i32 },
}

// ---------------------------------------------------------------------------
// Team header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TeamState {
    Idle,
    Loading,
    Ready { team: Team, blurb: String },
    Error { message: String },
}

impl TeamState {
    pub fn ready(team: Team) -> Self {
        let blurb = team.blurb();
        TeamState::Ready { team, blurb }
    }
}

// ---------------------------------------------------------------------------
// Game rows and favorites
// ---------------------------------------------------------------------------

/// A visible game plus the per-row bits a card needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRow {
    #[serde(flatten)]
    pub game: Game,
    pub favorited: bool,
    /// "W" or "L".
    pub result: &'static str,
    /// "Home" or "Away".
    pub location: &'static str,
}

impl GameRow {
    pub fn new(game: Game, favorited: bool) -> Self {
        let result = game.result_letter();
        let location = game.location_label();
        GameRow {
            game,
            favorited,
            result,
            location,
        }
    }
}

/// The favorites panel, resolved against the held list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "games", rename_all = "snake_case")]
pub enum FavoritesView {
    /// Nothing favorited yet.
    Empty,
    /// Favorites exist but no season is loaded.
    AwaitingGames,
    /// None of the favorites belong to the held season.
    OtherSeason,
    /// Favorited games in the held list, in held-list order.
    Games(Vec<Game>),
}

impl FavoritesView {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FavoritesView::Empty => {
                Some("No favorite games yet — add some from the Recent Games section.")
            }
            FavoritesView::AwaitingGames => {
                Some("Favorites saved! They will appear once games load.")
            }
            FavoritesView::OtherSeason => Some(concat!(
                "Your saved favorites are from a different season, ",
                "so none match the current results."
            )),
            FavoritesView::Games(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Season picker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonOption {
    pub season: i32,
    pub label: String,
    pub selected: bool,
}

/// The default season and `seasons_back` seasons before it, newest first.
pub fn season_options(default_season: i32, seasons_back: u32, selected: i32) -> Vec<SeasonOption> {
    (0..=seasons_back as i32)
        .map(|offset| {
            let season = default_season.saturating_sub(offset);
            SeasonOption {
                season,
                label: season_label(season),
                selected: season == selected,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything a UI needs to render the results section in one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsSnapshot {
    /// Most recently requested season.
    pub season: i32,
    pub season_label: String,
    /// Season the held list belongs to, if any list is held.
    pub held_season: Option<i32>,
    pub load_state: LoadState,
    pub filter: Filter,
    pub team: TeamState,
    pub rows: Vec<GameRow>,
    pub favorites: Vec<u64>,
    pub favorites_view: FavoritesView,
    pub favorites_hint: Option<&'static str>,
    /// Message to show in place of (or above) the rows, if any.
    pub notice: Option<String>,
    pub season_options: Vec<SeasonOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_options_newest_first_with_selection() {
        let options = season_options(2022, 3, 2021);
        let seasons: Vec<i32> = options.iter().map(|o| o.season).collect();
        assert_eq!(seasons, vec![2022, 2021, 2020, 2019]);
        assert_eq!(options[1].label, "2021–2022");
        assert!(options[1].selected);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn season_options_saturate_at_min() {
        let options = season_options(i32::MIN, 2, i32::MIN);
        assert_eq!(options.len(), 3);
        assert!(options.iter().all(|o| o.season == i32::MIN));
    }

    #[test]
    fn failed_state_picks_message_by_error_kind() {
        match LoadState::failed(2022, &FeedError::empty("no games")) {
            LoadState::Error { message, .. } => assert_eq!(message, NO_SEASON_GAMES_NOTICE),
            other => panic!("unexpected {other:?}"),
        }
        match LoadState::failed(2022, &FeedError::status(500)) {
            LoadState::Error { message, detail, .. } => {
                assert_eq!(message, LOAD_ERROR_NOTICE);
                assert!(detail.contains("500"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn load_state_serializes_with_status_tag() {
        let json = serde_json::to_value(LoadState::Loading { season: 2021 }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "loading", "season": 2021}));
    }

    #[test]
    fn favorites_view_hints() {
        assert!(FavoritesView::Empty.hint().is_some());
        assert!(FavoritesView::Games(vec![]).hint().is_none());
    }
}
