// balldontlie HTTP client.
//
// Thin adapter from the `/teams` and `/games` endpoints to the `GameSource`
// trait. Every failure is mapped onto `FeedError` so callers never see a
// reqwest error type.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use courtside_core::config::Config;
use courtside_core::error::FeedError;
use courtside_core::model::{RawGame, Team};
use courtside_core::source::GameSource;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Page size requested from `/games`; a regular season fits in one page.
const GAMES_PER_PAGE: u32 = 100;

/// Every response wraps its payload in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
}

// ---------------------------------------------------------------------------
// BallDontLieClient
// ---------------------------------------------------------------------------

pub struct BallDontLieClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BallDontLieClient {
    /// Create a client for `base_url` (no trailing slash needed) that sends
    /// `api_key` as a bearer token and gives up on a request after `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        Self::new(
            config.api_base_url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn team_url(&self, team_id: u64) -> String {
        format!("{}/teams/{team_id}", self.base_url)
    }

    pub fn games_url(&self, team_id: u64, season: i32) -> String {
        format!(
            "{}/games?team_ids[]={team_id}&seasons[]={season}&per_page={GAMES_PER_PAGE}",
            self.base_url
        )
    }

    /// GET `url` and return the `data` member of the envelope.
    async fn get_data(&self, url: &str) -> Result<Value, FeedError> {
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| FeedError::network(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("GET {url} returned {status}");
            return Err(FeedError::status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::network(format!("failed to read response body: {e}")))?;

        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|e| FeedError::empty(format!("response is not valid JSON: {e}")))?;

        match envelope.data {
            Some(Value::Null) | None => Err(FeedError::empty("response has no `data` member")),
            Some(data) => Ok(data),
        }
    }
}

#[async_trait]
impl GameSource for BallDontLieClient {
    async fn fetch_team(&self, team_id: u64) -> Result<Team, FeedError> {
        let data = self.get_data(&self.team_url(team_id)).await?;
        serde_json::from_value(data)
            .map_err(|e| FeedError::empty(format!("malformed team data: {e}")))
    }

    async fn fetch_games(&self, team_id: u64, season: i32) -> Result<Vec<RawGame>, FeedError> {
        let data = self.get_data(&self.games_url(team_id, season)).await?;
        let Value::Array(records) = data else {
            return Err(FeedError::empty("`data` is not a list of games"));
        };

        let total = records.len();
        let games: Vec<RawGame> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<RawGame>(record) {
                Ok(game) => Some(game),
                Err(e) => {
                    warn!("skipping malformed game record: {e}");
                    None
                }
            })
            .collect();

        debug!(
            "season {season}: {} of {total} game record(s) decoded",
            games.len()
        );
        Ok(games)
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        format!("request failed: {err}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
