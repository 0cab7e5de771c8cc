//! Hashtag photo import.
//!
//! An import run resolves the album, reads its watermark (the highest tweet id
//! already imported), searches the provider for newer tweets with images and
//! imports each tweet's photo:
//!
//! ```text
//! album ──> last_tweet_id ──> TweetSource::search ──> for each tweet:
//!                                                     photo_url? ─ no ─> skip
//!                                                     in album?  ─ yes ─> skip
//!                                                     stored?    ─ yes ─> relink
//!                                                     fetch + save + attach
//! ```
//!
//! Image rows are shared between albums and keyed by their source URL. The
//! store resolves concurrent inserts through unique constraints, so two runs
//! for the same album may overlap safely.

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod media;
pub mod source;
pub mod stats;
pub mod store;

pub use config::{ImporterConfig, TwitterCredentials};
pub use engine::{ImportEngine, ImportRun, SkipReason, TweetOutcome};
pub use error::{FetchError, ImportError, SourceError};
pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use media::MediaStorage;
pub use source::{TweetSource, TwitterSearchClient};
pub use stats::ImportStats;
pub use store::{AlbumStore, AttachOutcome, ImageSource, PgAlbumStore, TweetRef};

use std::time::Duration;

/// Importer wiring held in Rocket state.
pub struct ImporterState {
    engine: Result<ImportEngine, String>,
    pub default_limit: usize,
    /// Deadline applied to each import request.
    pub budget: Duration,
}

impl ImporterState {
    pub fn ready(engine: ImportEngine, default_limit: usize, budget: Duration) -> Self {
        Self {
            engine: Ok(engine),
            default_limit,
            budget,
        }
    }

    /// State for a server whose importer could not be configured; imports
    /// report `reason` instead of running.
    pub fn unavailable(reason: impl Into<String>, default_limit: usize, budget: Duration) -> Self {
        Self {
            engine: Err(reason.into()),
            default_limit,
            budget,
        }
    }

    pub fn engine(&self) -> Result<&ImportEngine, &str> {
        self.engine.as_ref().map_err(String::as_str)
    }
}
