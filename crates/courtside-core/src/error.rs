// Error taxonomy shared by the data source, normalizer and persistence layers.

use thiserror::Error;

/// Failures while fetching or interpreting a season's worth of remote data.
///
/// Both variants surface to callers of the view model as an error load state
/// with a human-readable message; neither is ever propagated further.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The request was rejected, timed out, or returned a non-success status.
    #[error("network failure: {message}")]
    NetworkFailure {
        message: String,
        status: Option<u16>,
    },

    /// The response decoded to zero usable records, or to malformed team data.
    #[error("empty payload: {what}")]
    EmptyPayload { what: String },
}

impl FeedError {
    pub fn network(message: impl Into<String>) -> Self {
        FeedError::NetworkFailure {
            message: message.into(),
            status: None,
        }
    }

    pub fn status(status: u16) -> Self {
        FeedError::NetworkFailure {
            message: format!("request returned HTTP {status}"),
            status: Some(status),
        }
    }

    pub fn empty(what: impl Into<String>) -> Self {
        FeedError::EmptyPayload { what: what.into() }
    }

    pub fn is_empty_payload(&self) -> bool {
        matches!(self, FeedError::EmptyPayload { .. })
    }
}

/// Failures reported by a [`crate::store::PersistentStore`] or while decoding
/// a value read from one.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored value under `{key}` is corrupt: {message}")]
    Corrupt { key: String, message: String },

    #[error("failed to read `{key}`: {message}")]
    ReadFailure { key: String, message: String },

    #[error("failed to write `{key}`: {message}")]
    WriteFailure { key: String, message: String },

    #[error("storage backend error: {0}")]
    Backend(#[from] rusqlite::Error),
}
