// Game normalization: raw API records -> canonical games from the tracked
// team's perspective.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::error::FeedError;
use crate::model::{Game, RawGame, RECENT_GAMES_LIMIT};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("game {game_id} has an unparseable date `{date}`")]
    InvalidDate { game_id: u64, date: String },
}

/// Reduce an ISO-ish timestamp to its UTC calendar date.
///
/// Accepts RFC 3339 instants (offset applied before truncation), naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps (read as UTC) and bare dates.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc).date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.date());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Normalize one raw record for `tracked_team_id`.
pub fn normalize_game(raw: &RawGame, tracked_team_id: u64) -> Result<Game, NormalizeError> {
    let date = parse_game_date(&raw.date).ok_or_else(|| NormalizeError::InvalidDate {
        game_id: raw.id,
        date: raw.date.clone(),
    })?;

    let home_name = raw.home_team.display_name();
    let away_name = raw.visitor_team.display_name();
    let home_score = raw.home_team_score;
    let away_score = raw.visitor_team_score;

    let tracked_team_is_home = raw.home_team.id == tracked_team_id;
    let (tracked_team_score, opponent_score, opponent_name) = if tracked_team_is_home {
        (home_score, away_score, away_name.clone())
    } else {
        (away_score, home_score, home_name.clone())
    };

    Ok(Game {
        id: raw.id,
        date,
        home_name,
        away_name,
        home_score,
        away_score,
        tracked_team_is_home,
        tracked_team_score,
        opponent_score,
        // Strict: a tie is not a win.
        is_win: tracked_team_score > opponent_score,
        opponent_name,
    })
}

/// Normalize a season payload into the held list: every usable record,
/// newest first, capped at [`RECENT_GAMES_LIMIT`].
///
/// Records with unparseable dates are skipped. An empty payload, or one
/// where nothing survives, is [`FeedError::EmptyPayload`].
pub fn normalize_season(
    raw_games: &[RawGame],
    tracked_team_id: u64,
) -> Result<Vec<Game>, FeedError> {
    if raw_games.is_empty() {
        return Err(FeedError::empty("no games returned for season"));
    }

    let mut games: Vec<Game> = raw_games
        .iter()
        .filter_map(|raw| match normalize_game(raw, tracked_team_id) {
            Ok(game) => Some(game),
            Err(e) => {
                warn!("skipping game record: {e}");
                None
            }
        })
        .collect();

    if games.is_empty() {
        return Err(FeedError::empty("no game records could be normalized"));
    }

    games.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    games.truncate(RECENT_GAMES_LIMIT);
    Ok(games)
}
