// Remote data source seam, implemented by the HTTP client in `courtside-api`
// and by in-process fakes in tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FeedError;
use crate::model::{RawGame, Team};

#[async_trait]
pub trait GameSource: Send + Sync {
    /// Team metadata for `team_id`.
    async fn fetch_team(&self, team_id: u64) -> Result<Team, FeedError>;

    /// Every game `team_id` played in `season` (start-year labelled), in
    /// whatever order the source returns them.
    async fn fetch_games(&self, team_id: u64, season: i32) -> Result<Vec<RawGame>, FeedError>;
}

#[async_trait]
impl<T: GameSource + ?Sized> GameSource for Arc<T> {
    async fn fetch_team(&self, team_id: u64) -> Result<Team, FeedError> {
        (**self).fetch_team(team_id).await
    }

    async fn fetch_games(&self, team_id: u64, season: i32) -> Result<Vec<RawGame>, FeedError> {
        (**self).fetch_games(team_id, season).await
    }
}
