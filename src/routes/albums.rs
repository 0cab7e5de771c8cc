//! Album listing, creation and hashtag import.

use rocket::State;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket_db_pools::sqlx::{self, FromRow, PgPool};
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::importer::source::MAX_SEARCH_COUNT;
use crate::importer::{ImportStats, ImporterState};
use crate::models::{
    Album, AlbumDetail, AlbumImageEntry, AlbumInfo, CreateAlbumRequest, DataResponse, ImageInfo,
};
use crate::notify::ImportNotifier;
use crate::routes::helpers::{normalize_album_name, resolve_album};

#[derive(Debug, FromRow)]
struct AlbumImageRow {
    name: String,
    image_file: Option<String>,
    image_url: Option<String>,
}

/// Fold `(album, image)` rows ordered by album into nested listings.
fn group_album_rows(rows: Vec<AlbumImageRow>) -> Vec<AlbumInfo> {
    let mut albums: Vec<AlbumInfo> = Vec::new();

    for row in rows {
        if albums.last().map(|album| album.name != row.name).unwrap_or(true) {
            albums.push(AlbumInfo {
                name: row.name.clone(),
                images: Vec::new(),
            });
        }

        if let (Some(image_file), Some(image_url), Some(album)) =
            (row.image_file, row.image_url, albums.last_mut())
        {
            album.images.push(ImageInfo {
                image_file,
                image_url,
            });
        }
    }

    albums
}

/// List every album with its images, newest import first.
#[openapi(tag = "Albums")]
#[get("/albums")]
pub async fn list_albums(
    pool: &State<PgPool>,
) -> Result<Json<DataResponse<Vec<AlbumInfo>>>, ApiError> {
    let rows = sqlx::query_as::<_, AlbumImageRow>(
        r#"
        SELECT a.name, i.image_file, i.image_url
        FROM albums a
        LEFT JOIN album_image_relations r ON r.album_id = a.id
        LEFT JOIN images i ON i.id = r.image_id
        ORDER BY a.name, r.imported_at DESC, r.id DESC
        "#,
    )
    .fetch_all(pool.inner())
    .await?;

    Ok(Json(DataResponse {
        data: group_album_rows(rows),
    }))
}

/// One album with the tweets its photos were imported from.
#[openapi(tag = "Albums")]
#[get("/albums/<name>")]
pub async fn get_album(name: String, pool: &State<PgPool>) -> Result<Json<AlbumDetail>, ApiError> {
    let album = resolve_album(&name, pool.inner()).await?;

    let images = sqlx::query_as::<_, AlbumImageEntry>(
        r#"
        SELECT i.id AS image_id, i.image_url, i.image_file,
               r.tweet_id, r.tweet_url, r.imported_at
        FROM album_image_relations r
        JOIN images i ON i.id = r.image_id
        WHERE r.album_id = $1
        ORDER BY r.imported_at DESC, r.id DESC
        "#,
    )
    .bind(album.id)
    .fetch_all(pool.inner())
    .await?;

    Ok(Json(AlbumDetail {
        photo_count: images.len() as i64,
        album,
        images,
    }))
}

/// Create an album for a hashtag.
#[openapi(tag = "Albums")]
#[post("/albums", data = "<payload>")]
pub async fn create_album(
    pool: &State<PgPool>,
    user: AuthUser,
    payload: Json<CreateAlbumRequest>,
) -> Result<status::Created<Json<Album>>, ApiError> {
    let name = normalize_album_name(&payload.name)?;

    let album: Option<Album> = sqlx::query_as(
        r#"INSERT INTO albums (name) VALUES ($1)
           ON CONFLICT (name) DO NOTHING
           RETURNING id, name, created_at"#,
    )
    .bind(&name)
    .fetch_optional(pool.inner())
    .await?;

    let album = album.ok_or_else(|| ApiError::Conflict(format!("Album '{name}' already exists")))?;
    log::info!("{} created album '{}'", user.email, album.name);

    Ok(status::Created::new(format!("/api/v1/albums/{}", album.name)).body(Json(album)))
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Images attached to the album by this import, in attachment order.
    pub image_ids: Vec<i32>,
    pub stats: ImportStats,
    /// `false` when the import stopped at its deadline; run it again to resume.
    pub completed: bool,
    /// Notification messages handed to the mailer.
    pub notified: usize,
}

/// Import new photos tweeted with the album's hashtag.
#[openapi(tag = "Albums")]
#[post("/albums/<name>/import?<limit>")]
pub async fn import_album(
    name: String,
    limit: Option<usize>,
    importer: &State<ImporterState>,
    notifier: &State<ImportNotifier>,
    user: AuthUser,
) -> Result<Json<ImportResponse>, ApiError> {
    let engine = importer
        .engine()
        .map_err(|reason| ApiError::ServiceUnavailable(reason.to_string()))?;

    let limit = limit.unwrap_or(importer.default_limit);
    if limit == 0 || limit > MAX_SEARCH_COUNT {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_SEARCH_COUNT}"
        )));
    }

    log::info!("{} requested import for '{}'", user.email, name);
    let run = engine
        .import_for_album_within(&name, limit, importer.budget)
        .await?;

    let notified = if run.image_ids.is_empty() {
        0
    } else {
        notifier.notify(&run.album, &run.image_ids).await
    };

    Ok(Json(ImportResponse {
        image_ids: run.image_ids,
        stats: run.stats,
        completed: run.completed,
        notified,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, image: Option<&str>) -> AlbumImageRow {
        AlbumImageRow {
            name: name.to_string(),
            image_file: image.map(|i| format!("uploads/{i}")),
            image_url: image.map(|i| format!("http://pbs.twimg.com/media/{i}")),
        }
    }

    #[test]
    fn rows_are_grouped_per_album() {
        let albums = group_album_rows(vec![
            row("django", None),
            row("golang", Some("b.jpg")),
            row("golang", Some("a.jpg")),
            row("rust", Some("c.jpg")),
        ]);

        assert_eq!(albums.len(), 3);
        assert_eq!(albums[0].name, "django");
        assert!(albums[0].images.is_empty());
        assert_eq!(albums[1].images.len(), 2);
        assert_eq!(albums[1].images[0].image_file, "uploads/b.jpg");
        assert_eq!(albums[2].images[0].image_url, "http://pbs.twimg.com/media/c.jpg");
    }
}
