use reqwest::StatusCode;
use rocket_db_pools::sqlx;
use std::time::Duration;
use thiserror::Error;

use super::extract::ExtractError;

/// Failures of the tweet search provider.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("search HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search service returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("bearer token exchange failed: {0}")]
    Token(String),
}

/// Failures while downloading a photo.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("image HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image host returned status {0}")]
    Status(StatusCode),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("album '{0}' not found")]
    AlbumNotFound(String),
    #[error("tweet search unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
    #[error("failed to fetch {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("malformed tweet: {0}")]
    MalformedTweet(#[from] ExtractError),
    #[error("failed to store image file: {0}")]
    Media(#[from] std::io::Error),
    #[error("import did not finish within {0:?}")]
    DeadlineExceeded(Duration),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ImportError {
    /// Whether the error only concerns the tweet being processed, leaving the
    /// rest of the batch importable.
    pub fn is_tweet_scoped(&self) -> bool {
        matches!(
            self,
            ImportError::FetchFailed { .. } | ImportError::MalformedTweet(_) | ImportError::Media(_)
        )
    }
}
