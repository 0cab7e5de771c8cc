use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ===== Persisted entities =====

/// A named photo collection keyed by a hashtag (stored without the `#`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Album {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A downloaded photo, deduplicated globally by `image_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Image {
    pub id: i32,
    pub image_url: String,
    /// Path of the stored file relative to the media root.
    pub image_file: String,
    pub created_at: DateTime<Utc>,
}

/// Record of an image entering an album through a specific tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct AlbumImageRelation {
    pub id: i32,
    pub album_id: i32,
    pub image_id: i32,
    pub tweet_id: i64,
    pub tweet_url: String,
    pub imported_at: DateTime<Utc>,
}

// ===== API payloads =====

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct ImageInfo {
    pub image_file: String,
    pub image_url: String,
}

/// Album listing entry with nested image references.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AlbumInfo {
    pub name: String,
    pub images: Vec<ImageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumImageEntry {
    pub image_id: i32,
    pub image_url: String,
    pub image_file: String,
    pub tweet_id: i64,
    pub tweet_url: String,
    pub imported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetail {
    #[serde(flatten)]
    pub album: Album,
    pub photo_count: i64,
    pub images: Vec<AlbumImageEntry>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateAlbumRequest {
    pub name: String,
}
