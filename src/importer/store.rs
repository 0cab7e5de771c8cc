//! Persistence interface used by the importer and notification composer.

use rocket_db_pools::sqlx::{self, PgPool};

use crate::models::{Album, Image};

/// Image to attach to an album: one already stored, or a freshly downloaded
/// one that still needs its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    Existing(i32),
    New {
        image_url: &'a str,
        image_file: &'a str,
    },
}

/// Tweet through which an image enters an album.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweetRef<'a> {
    pub tweet_id: i64,
    pub tweet_url: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachOutcome {
    pub image_id: i32,
    /// The image row was inserted by this call.
    pub image_created: bool,
    /// The album relation was inserted by this call. `false` means another
    /// import attached the image (or the tweet) first.
    pub relation_created: bool,
}

#[rocket::async_trait]
pub trait AlbumStore: Send + Sync {
    async fn find_album(&self, name: &str) -> Result<Option<Album>, sqlx::Error>;

    /// Highest tweet id already imported into the album.
    async fn last_tweet_id(&self, album_id: i32) -> Result<Option<i64>, sqlx::Error>;

    /// Whether the album already holds the image stored for `image_url`.
    async fn relation_exists(&self, album_id: i32, image_url: &str) -> Result<bool, sqlx::Error>;

    async fn find_image_id(&self, image_url: &str) -> Result<Option<i32>, sqlx::Error>;

    /// Insert-or-reuse the image by URL and relate it to the album, atomically.
    ///
    /// A unique violation on the image URL resolves to the existing row. A
    /// unique violation on the relation leaves nothing behind: an image row
    /// created by this call is rolled back with it.
    async fn attach(
        &self,
        album_id: i32,
        image: ImageSource<'_>,
        tweet: TweetRef<'_>,
    ) -> Result<AttachOutcome, sqlx::Error>;

    /// Images for `ids`, in the order of `ids`; unknown ids are dropped.
    async fn images_by_ids(&self, ids: &[i32]) -> Result<Vec<Image>, sqlx::Error>;

    async fn count_album_images(&self, album_id: i32) -> Result<i64, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgAlbumStore {
    pool: PgPool,
}

impl PgAlbumStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[rocket::async_trait]
impl AlbumStore for PgAlbumStore {
    async fn find_album(&self, name: &str) -> Result<Option<Album>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, created_at FROM albums WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    async fn last_tweet_id(&self, album_id: i32) -> Result<Option<i64>, sqlx::Error> {
        // Served by the (album_id, tweet_id) unique index.
        sqlx::query_scalar("SELECT MAX(tweet_id) FROM album_image_relations WHERE album_id = $1")
            .bind(album_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn relation_exists(&self, album_id: i32, image_url: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"SELECT EXISTS(
                   SELECT 1
                   FROM album_image_relations r
                   JOIN images i ON i.id = r.image_id
                   WHERE r.album_id = $1 AND i.image_url = $2
               )"#,
        )
        .bind(album_id)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_image_id(&self, image_url: &str) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM images WHERE image_url = $1")
            .bind(image_url)
            .fetch_optional(&self.pool)
            .await
    }

    async fn attach(
        &self,
        album_id: i32,
        image: ImageSource<'_>,
        tweet: TweetRef<'_>,
    ) -> Result<AttachOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let (image_id, image_created) = match image {
            ImageSource::Existing(image_id) => (image_id, false),
            ImageSource::New {
                image_url,
                image_file,
            } => {
                let inserted: Option<i32> = sqlx::query_scalar(
                    r#"INSERT INTO images (image_url, image_file)
                       VALUES ($1, $2)
                       ON CONFLICT (image_url) DO NOTHING
                       RETURNING id"#,
                )
                .bind(image_url)
                .bind(image_file)
                .fetch_optional(&mut *tx)
                .await?;

                match inserted {
                    Some(image_id) => (image_id, true),
                    None => {
                        log::debug!("image {} was stored concurrently, reusing it", image_url);
                        let image_id: i32 =
                            sqlx::query_scalar("SELECT id FROM images WHERE image_url = $1")
                                .bind(image_url)
                                .fetch_one(&mut *tx)
                                .await?;
                        (image_id, false)
                    }
                }
            }
        };

        let relation_id: Option<i32> = sqlx::query_scalar(
            r#"INSERT INTO album_image_relations (album_id, image_id, tweet_id, tweet_url)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT DO NOTHING
               RETURNING id"#,
        )
        .bind(album_id)
        .bind(image_id)
        .bind(tweet.tweet_id)
        .bind(tweet.tweet_url)
        .fetch_optional(&mut *tx)
        .await?;

        if relation_id.is_none() {
            tx.rollback().await?;
            return Ok(AttachOutcome {
                image_id,
                image_created: false,
                relation_created: false,
            });
        }

        tx.commit().await?;

        Ok(AttachOutcome {
            image_id,
            image_created,
            relation_created: true,
        })
    }

    async fn images_by_ids(&self, ids: &[i32]) -> Result<Vec<Image>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<Image> = sqlx::query_as(
            "SELECT id, image_url, image_file, created_at FROM images WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids
            .iter()
            .filter_map(|id| rows.iter().find(|image| image.id == *id).cloned())
            .collect())
    }

    async fn count_album_images(&self, album_id: i32) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM album_image_relations WHERE album_id = $1")
            .bind(album_id)
            .fetch_one(&self.pool)
            .await
    }
}
