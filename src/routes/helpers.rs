//! Shared helper functions for Rocket route handlers.

use regex::Regex;
use rocket_db_pools::sqlx::{self, PgPool};
use std::sync::LazyLock;

use crate::error::ApiError;
use crate::models::Album;

/// Longest album name the schema accepts.
pub const MAX_ALBUM_NAME_LEN: usize = 140;

static ALBUM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid album name pattern"));

/// Normalize user input into an album name: trimmed, without a leading `#`,
/// 1 to 140 letters, digits or underscores.
pub fn normalize_album_name(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    let name = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if name.is_empty() {
        return Err(ApiError::BadRequest("Album name is required".to_string()));
    }
    if name.chars().count() > MAX_ALBUM_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Album name must be at most {MAX_ALBUM_NAME_LEN} characters"
        )));
    }
    if !ALBUM_NAME.is_match(name) {
        return Err(ApiError::BadRequest(
            "Album name may only contain letters, digits and underscores".to_string(),
        ));
    }

    Ok(name.to_string())
}

/// Resolve an album by name.
///
/// Returns [`ApiError::NotFound`] when the album does not exist.
pub async fn resolve_album(name: &str, pool: &PgPool) -> Result<Album, ApiError> {
    sqlx::query_as::<_, Album>("SELECT id, name, created_at FROM albums WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Album '{name}' not found")))
}
