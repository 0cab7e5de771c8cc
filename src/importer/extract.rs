//! Field extraction from raw search API tweet records.
//!
//! Tweets are kept as [`serde_json::Value`] so that partial or oddly shaped
//! records never fail deserialization of the whole search page; each accessor
//! here decides on its own how much structure it needs.

use serde_json::Value;
use thiserror::Error;

/// Canonical tweet permalink, filled with the author handle and tweet id.
const TWEET_URL_PREFIX: &str = "https://twitter.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("tweet record is missing `{0}`")]
    MissingField(&'static str),
}

/// URL of the first photo attached to the tweet, if any.
///
/// Walks `entities.media` and returns the `media_url` of the first entry typed
/// `"photo"`. Missing or malformed nesting is treated as "no photo".
pub fn photo_url(tweet: &Value) -> Option<&str> {
    tweet
        .get("entities")?
        .get("media")?
        .as_array()?
        .iter()
        .find(|media| media.get("type").and_then(Value::as_str) == Some("photo"))
        .and_then(|media| media.get("media_url"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}

/// Provider-assigned tweet identifier.
pub fn tweet_id(tweet: &Value) -> Result<i64, ExtractError> {
    tweet
        .get("id")
        .and_then(Value::as_i64)
        .ok_or(ExtractError::MissingField("id"))
}

/// Absolute tweet URL built from the author's handle and the tweet id.
pub fn tweet_permalink(tweet: &Value) -> Result<String, ExtractError> {
    let screen_name = tweet
        .get("user")
        .and_then(|user| user.get("screen_name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(ExtractError::MissingField("user.screen_name"))?;
    let id = tweet_id(tweet)?;

    Ok(format!("{TWEET_URL_PREFIX}/{screen_name}/status/{id}/"))
}
