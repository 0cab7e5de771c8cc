//! Per-run import counters.

use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::engine::SkipReason;
use super::error::ImportError;

/// Counters for a single album import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    /// Tweets returned by the search provider
    pub tweets: usize,
    /// Images downloaded and stored for the first time
    pub images_created: usize,
    /// Images already stored for another album and linked here
    pub images_relinked: usize,
    pub skipped_without_photo: usize,
    /// Tweets whose photo was already part of the album
    pub skipped_duplicates: usize,
    pub malformed_tweets: usize,
    /// Photo downloads or file writes that failed
    pub fetch_failures: usize,
}

impl ImportStats {
    pub fn record_import(&mut self, image_created: bool) {
        if image_created {
            self.images_created += 1;
        } else {
            self.images_relinked += 1;
        }
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NoPhoto => self.skipped_without_photo += 1,
            SkipReason::AlreadyInAlbum => self.skipped_duplicates += 1,
        }
    }

    pub fn record_failure(&mut self, err: &ImportError) {
        match err {
            ImportError::MalformedTweet(_) => self.malformed_tweets += 1,
            _ => self.fetch_failures += 1,
        }
    }

    pub fn imported(&self) -> usize {
        self.images_created + self.images_relinked
    }
}
