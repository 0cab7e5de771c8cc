#[macro_use]
extern crate rocket;

pub mod auth;
pub mod db;
pub mod error;
pub mod importer;
pub mod models;
pub mod notify;
pub mod request_logger;
pub mod routes;

use crate::auth::AuthState;
use crate::db::AlbumsDb;
use crate::importer::config::{default_limit_from_env, import_timeout_from_env, media_root_from_env};
use crate::importer::{AlbumStore, ImportEngine, ImporterConfig, ImporterState, PgAlbumStore};
use crate::notify::{ImportNotifier, LogMailer, NotificationComposer, NotifyConfig};
use crate::request_logger::RequestLogger;
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::fs::FileServer;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;
use rocket_okapi::{
    openapi_get_routes,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    // Stored photos are served from here, so it must exist before mounting.
    let media_root = media_root_from_env();
    std::fs::create_dir_all(&media_root).expect("Failed to create media directory");
    log::info!("Media directory initialized at: {}", media_root);

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(AlbumsDb::init())
        .attach(cors)
        .attach(AdHoc::try_on_ignite(
            "Run Migrations",
            |rocket| async move {
                match AlbumsDb::fetch(&rocket) {
                    Some(db) => {
                        let pool = (**db).clone();
                        match db::run_migrations(&pool).await {
                            Ok(_) => {
                                log::info!("database migrations successful");
                                Ok(rocket)
                            }
                            Err(e) => {
                                log::error!("database migrations failed: {}", e);
                                Err(rocket)
                            }
                        }
                    }
                    None => {
                        log::error!("database pool not available for migrations");
                        Err(rocket)
                    }
                }
            },
        ))
        .attach(AdHoc::try_on_ignite("Authentication", |rocket| async move {
            match AuthState::from_env() {
                Ok(state) => Ok(rocket.manage(state)),
                Err(err) => {
                    log::error!("failed to initialize authentication: {}", err);
                    Err(rocket)
                }
            }
        }))
        // Importer and notifier share the pool-backed album store
        .attach(AdHoc::try_on_ignite(
            "Manage DB Pool and Importer",
            |rocket| async move {
                let pool = match AlbumsDb::fetch(&rocket) {
                    Some(db) => (**db).clone(),
                    None => return Err(rocket),
                };

                let store: Arc<dyn AlbumStore> = Arc::new(PgAlbumStore::new(pool.clone()));
                let importer = build_importer(store.clone());
                let notifier = ImportNotifier::new(
                    NotificationComposer::new(store, NotifyConfig::from_env()),
                    Arc::new(LogMailer),
                );

                Ok(rocket.manage(pool).manage(importer).manage(notifier))
            },
        ))
        .mount(
            "/api/v1",
            openapi_get_routes![
                routes::health::health_check,
                routes::albums::list_albums,
                routes::albums::get_album,
                routes::albums::create_album,
                routes::albums::import_album,
                auth::routes::login,
                auth::routes::me,
            ],
        )
        .mount("/media", FileServer::from(media_root))
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
}

/// Importer state from the environment; a server without search credentials
/// still starts and answers imports with 503.
fn build_importer(store: Arc<dyn AlbumStore>) -> ImporterState {
    let config = match ImporterConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("importer disabled: {}", err);
            return ImporterState::unavailable(
                format!("importer is not configured: {err}"),
                default_limit_from_env(),
                import_timeout_from_env(),
            );
        }
    };

    match ImportEngine::from_config(&config, store) {
        Ok(engine) => {
            log::info!(
                "importer ready (api: {}, limit: {}, timeout: {:?})",
                config.api_base,
                config.default_limit,
                config.import_timeout
            );
            ImporterState::ready(engine, config.default_limit, config.import_timeout)
        }
        Err(err) => {
            log::error!("failed to build importer HTTP clients: {}", err);
            ImporterState::unavailable(
                format!("importer HTTP client unavailable: {err}"),
                config.default_limit,
                config.import_timeout,
            )
        }
    }
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};
    use rocket_db_pools::sqlx::{self, PgPool};

    use crate::auth::{AuthConfig, AuthState, JwtService, PasswordService};
    use crate::importer::ImporterState;
    use crate::notify::ImportNotifier;

    pub use database::{TestDatabase, TestDatabaseError};

    pub const TEST_JWT_SECRET: &str = "album-server-test-secret";

    /// Auth state with a fixed secret for route tests.
    pub fn test_auth_state() -> AuthState {
        let config = AuthConfig {
            issuer: "http://localhost".into(),
            audience: "album-server".into(),
            access_token_ttl_secs: 900,
            jwt_secret: TEST_JWT_SECRET.into(),
        };
        let jwt = JwtService::from_config(&config).expect("jwt service");
        AuthState::new(config, PasswordService::new().expect("password service"), jwt)
    }

    /// Convenience helpers for seeding users and albums in tests.
    pub struct TestFixtures<'a> {
        pool: &'a PgPool,
    }

    impl<'a> TestFixtures<'a> {
        /// Create a fixture helper bound to the provided pool.
        pub fn new(pool: &'a PgPool) -> Self {
            Self { pool }
        }

        /// Insert a user with an already hashed password, returning the new user id.
        pub async fn insert_user(
            &self,
            email: &str,
            display_name: Option<&str>,
            password_hash: &str,
        ) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar(
                "INSERT INTO users (email, display_name, password_hash) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(email)
            .bind(display_name.map(|name| name.to_string()))
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
        }

        pub async fn disable_user(&self, user_id: i32) -> Result<(), sqlx::Error> {
            sqlx::query("UPDATE users SET disabled = TRUE WHERE id = $1")
                .bind(user_id)
                .execute(self.pool)
                .await?;
            Ok(())
        }

        pub async fn insert_album(&self, name: &str) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar("INSERT INTO albums (name) VALUES ($1) RETURNING id")
                .bind(name)
                .fetch_one(self.pool)
                .await
        }

        /// Insert an image and relate it to an album through a tweet.
        pub async fn insert_album_image(
            &self,
            album_id: i32,
            image_url: &str,
            image_file: &str,
            tweet_id: i64,
        ) -> Result<i32, sqlx::Error> {
            let image_id: i32 = sqlx::query_scalar(
                "INSERT INTO images (image_url, image_file) VALUES ($1, $2) RETURNING id",
            )
            .bind(image_url)
            .bind(image_file)
            .fetch_one(self.pool)
            .await?;

            sqlx::query(
                "INSERT INTO album_image_relations (album_id, image_id, tweet_id, tweet_url) VALUES ($1, $2, $3, $4)",
            )
            .bind(album_id)
            .bind(image_id)
            .bind(tweet_id)
            .bind(format!("https://twitter.com/fixture/status/{tweet_id}/"))
            .execute(self.pool)
            .await?;

            Ok(image_id)
        }
    }

    /// In-process stand-ins for the importer's collaborators.
    pub mod fakes {
        use chrono::Utc;
        use parking_lot::Mutex;
        use reqwest::StatusCode;
        use rocket_db_pools::sqlx;
        use serde_json::{Value, json};
        use std::collections::{HashMap, HashSet};
        use std::time::Duration;

        use crate::importer::{
            AlbumStore, AttachOutcome, FetchError, ImageFetcher, ImageSource, SourceError,
            TweetRef, TweetSource,
        };
        use crate::models::{Album, AlbumImageRelation, Image};
        use crate::notify::{MailError, Mailer, OutgoingMessage};

        /// Raw tweet record shaped like the search API's, optionally with a photo.
        pub fn tweet(id: i64, screen_name: &str, photo_url: Option<&str>) -> Value {
            let media: Vec<Value> = photo_url
                .map(|url| vec![json!({"type": "photo", "media_url": url})])
                .unwrap_or_default();
            json!({
                "id": id,
                "id_str": id.to_string(),
                "text": format!("tweet {id}"),
                "user": {"screen_name": screen_name},
                "entities": {"hashtags": [], "media": media},
            })
        }

        #[derive(Default)]
        struct MemoryState {
            albums: Vec<Album>,
            images: Vec<Image>,
            relations: Vec<AlbumImageRelation>,
            next_id: i32,
        }

        impl MemoryState {
            fn next_id(&mut self) -> i32 {
                self.next_id += 1;
                self.next_id
            }
        }

        /// [`AlbumStore`] over vectors, honoring the same uniqueness rules as
        /// the database schema.
        #[derive(Default)]
        pub struct MemoryAlbumStore {
            state: Mutex<MemoryState>,
        }

        impl MemoryAlbumStore {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn create_album(&self, name: &str) -> Album {
                let mut state = self.state.lock();
                let album = Album {
                    id: state.next_id(),
                    name: name.to_string(),
                    created_at: Utc::now(),
                };
                state.albums.push(album.clone());
                album
            }

            /// Insert an image, or return the existing one for `image_url`.
            pub fn insert_image(&self, image_url: &str, image_file: &str) -> Image {
                let mut state = self.state.lock();
                if let Some(image) = state.images.iter().find(|i| i.image_url == image_url) {
                    return image.clone();
                }
                let image = Image {
                    id: state.next_id(),
                    image_url: image_url.to_string(),
                    image_file: image_file.to_string(),
                    created_at: Utc::now(),
                };
                state.images.push(image.clone());
                image
            }

            pub fn relate(
                &self,
                album_id: i32,
                image_id: i32,
                tweet_id: i64,
                tweet_url: &str,
            ) -> AlbumImageRelation {
                let mut state = self.state.lock();
                let relation = AlbumImageRelation {
                    id: state.next_id(),
                    album_id,
                    image_id,
                    tweet_id,
                    tweet_url: tweet_url.to_string(),
                    imported_at: Utc::now(),
                };
                state.relations.push(relation.clone());
                relation
            }

            pub fn images(&self) -> Vec<Image> {
                self.state.lock().images.clone()
            }

            pub fn relations(&self) -> Vec<AlbumImageRelation> {
                self.state.lock().relations.clone()
            }

            pub fn relations_for(&self, album_id: i32) -> Vec<AlbumImageRelation> {
                self.state
                    .lock()
                    .relations
                    .iter()
                    .filter(|r| r.album_id == album_id)
                    .cloned()
                    .collect()
            }
        }

        #[rocket::async_trait]
        impl AlbumStore for MemoryAlbumStore {
            async fn find_album(&self, name: &str) -> Result<Option<Album>, sqlx::Error> {
                Ok(self.state.lock().albums.iter().find(|a| a.name == name).cloned())
            }

            async fn last_tweet_id(&self, album_id: i32) -> Result<Option<i64>, sqlx::Error> {
                Ok(self
                    .state
                    .lock()
                    .relations
                    .iter()
                    .filter(|r| r.album_id == album_id)
                    .map(|r| r.tweet_id)
                    .max())
            }

            async fn relation_exists(
                &self,
                album_id: i32,
                image_url: &str,
            ) -> Result<bool, sqlx::Error> {
                let state = self.state.lock();
                Ok(state
                    .images
                    .iter()
                    .filter(|i| i.image_url == image_url)
                    .any(|i| {
                        state
                            .relations
                            .iter()
                            .any(|r| r.album_id == album_id && r.image_id == i.id)
                    }))
            }

            async fn find_image_id(&self, image_url: &str) -> Result<Option<i32>, sqlx::Error> {
                Ok(self
                    .state
                    .lock()
                    .images
                    .iter()
                    .find(|i| i.image_url == image_url)
                    .map(|i| i.id))
            }

            async fn attach(
                &self,
                album_id: i32,
                image: ImageSource<'_>,
                tweet: TweetRef<'_>,
            ) -> Result<AttachOutcome, sqlx::Error> {
                let mut state = self.state.lock();

                let (image_id, image_created) = match image {
                    ImageSource::Existing(image_id) => (image_id, false),
                    ImageSource::New {
                        image_url,
                        image_file,
                    } => match state.images.iter().find(|i| i.image_url == image_url) {
                        Some(existing) => (existing.id, false),
                        None => {
                            let id = state.next_id();
                            state.images.push(Image {
                                id,
                                image_url: image_url.to_string(),
                                image_file: image_file.to_string(),
                                created_at: Utc::now(),
                            });
                            (id, true)
                        }
                    },
                };

                let collides = state.relations.iter().any(|r| {
                    r.album_id == album_id
                        && (r.image_id == image_id || r.tweet_id == tweet.tweet_id)
                });
                if collides {
                    if image_created {
                        state.images.retain(|i| i.id != image_id);
                    }
                    return Ok(AttachOutcome {
                        image_id,
                        image_created: false,
                        relation_created: false,
                    });
                }

                let id = state.next_id();
                state.relations.push(AlbumImageRelation {
                    id,
                    album_id,
                    image_id,
                    tweet_id: tweet.tweet_id,
                    tweet_url: tweet.tweet_url.to_string(),
                    imported_at: Utc::now(),
                });

                Ok(AttachOutcome {
                    image_id,
                    image_created,
                    relation_created: true,
                })
            }

            async fn images_by_ids(&self, ids: &[i32]) -> Result<Vec<Image>, sqlx::Error> {
                let state = self.state.lock();
                Ok(ids
                    .iter()
                    .filter_map(|id| state.images.iter().find(|i| i.id == *id).cloned())
                    .collect())
            }

            async fn count_album_images(&self, album_id: i32) -> Result<i64, sqlx::Error> {
                Ok(self
                    .state
                    .lock()
                    .relations
                    .iter()
                    .filter(|r| r.album_id == album_id)
                    .count() as i64)
            }
        }

        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct SearchCall {
            pub hashtag: String,
            pub limit: usize,
            pub since_id: Option<i64>,
        }

        /// [`TweetSource`] returning a fixed set of tweets.
        ///
        /// By default it filters by `since_id` like the real provider;
        /// `ignoring_since_id` simulates a provider serving stale results.
        pub struct ScriptedTweetSource {
            tweets: Vec<Value>,
            honor_since_id: bool,
            unavailable: bool,
            delay: Option<Duration>,
            calls: Mutex<Vec<SearchCall>>,
        }

        impl ScriptedTweetSource {
            pub fn new(tweets: Vec<Value>) -> Self {
                Self {
                    tweets,
                    honor_since_id: true,
                    unavailable: false,
                    delay: None,
                    calls: Mutex::new(Vec::new()),
                }
            }

            pub fn ignoring_since_id(mut self) -> Self {
                self.honor_since_id = false;
                self
            }

            /// Every search fails with a 503 from the provider.
            pub fn unavailable(mut self) -> Self {
                self.unavailable = true;
                self
            }

            pub fn delayed(mut self, delay: Duration) -> Self {
                self.delay = Some(delay);
                self
            }

            pub fn calls(&self) -> Vec<SearchCall> {
                self.calls.lock().clone()
            }
        }

        #[rocket::async_trait]
        impl TweetSource for ScriptedTweetSource {
            async fn search(
                &self,
                hashtag: &str,
                limit: usize,
                since_id: Option<i64>,
            ) -> Result<Vec<Value>, SourceError> {
                self.calls.lock().push(SearchCall {
                    hashtag: hashtag.to_string(),
                    limit,
                    since_id,
                });

                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                if self.unavailable {
                    return Err(SourceError::Status {
                        status: StatusCode::SERVICE_UNAVAILABLE,
                        body: "over capacity".to_string(),
                    });
                }

                Ok(self
                    .tweets
                    .iter()
                    .filter(|tweet| match (self.honor_since_id, since_id) {
                        (true, Some(since)) => {
                            tweet.get("id").and_then(Value::as_i64).unwrap_or(0) > since
                        }
                        _ => true,
                    })
                    .take(limit)
                    .cloned()
                    .collect())
            }
        }

        /// [`ImageFetcher`] serving bytes from a map; unknown URLs are 404s.
        #[derive(Default)]
        pub struct StaticImageFetcher {
            images: HashMap<String, Vec<u8>>,
            failing: HashSet<String>,
            delays: HashMap<String, Duration>,
            fetched: Mutex<Vec<String>>,
        }

        impl StaticImageFetcher {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn with_image(mut self, url: &str, bytes: &[u8]) -> Self {
                self.images.insert(url.to_string(), bytes.to_vec());
                self
            }

            /// Downloads of `url` fail with a 502.
            pub fn failing(mut self, url: &str) -> Self {
                self.failing.insert(url.to_string());
                self
            }

            pub fn slow(mut self, url: &str, delay: Duration) -> Self {
                self.delays.insert(url.to_string(), delay);
                self
            }

            /// URLs requested so far, in order.
            pub fn fetched(&self) -> Vec<String> {
                self.fetched.lock().clone()
            }
        }

        #[rocket::async_trait]
        impl ImageFetcher for StaticImageFetcher {
            async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
                self.fetched.lock().push(url.to_string());

                if let Some(delay) = self.delays.get(url) {
                    tokio::time::sleep(*delay).await;
                }
                if self.failing.contains(url) {
                    return Err(FetchError::Status(StatusCode::BAD_GATEWAY));
                }

                self.images
                    .get(url)
                    .cloned()
                    .ok_or(FetchError::Status(StatusCode::NOT_FOUND))
            }
        }

        /// [`Mailer`] keeping every message it was handed.
        #[derive(Default)]
        pub struct RecordingMailer {
            sent: Mutex<Vec<OutgoingMessage>>,
            fail: bool,
        }

        impl RecordingMailer {
            pub fn failing() -> Self {
                Self {
                    fail: true,
                    ..Default::default()
                }
            }

            pub fn sent(&self) -> Vec<OutgoingMessage> {
                self.sent.lock().clone()
            }
        }

        #[rocket::async_trait]
        impl Mailer for RecordingMailer {
            async fn send(&self, message: &OutgoingMessage) -> Result<(), MailError> {
                if self.fail {
                    return Err(MailError::Transport("connection refused".to_string()));
                }
                self.sent.lock().push(message.clone());
                Ok(())
            }
        }
    }

    pub mod database {
        use log::LevelFilter;
        use rocket_db_pools::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use rocket_db_pools::sqlx::{self, ConnectOptions, Connection, PgPool};
        use testcontainers::ImageExt;
        use testcontainers_modules::postgres::Postgres;
        use testcontainers_modules::testcontainers::{
            ContainerAsync, core::error::TestcontainersError, runners::AsyncRunner,
        };
        use thiserror::Error;
        use tokio::runtime::Handle;
        use uuid::Uuid;

        static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("TEST_DATABASE_URL not set")]
            MissingUrl,
            #[error("database error: {0}")]
            Sqlx(#[from] sqlx::Error),
            #[error("migration error: {0}")]
            Migration(#[from] sqlx::migrate::MigrateError),
            #[error("container error: {0}")]
            Container(#[from] TestcontainersError),
        }

        /// Ephemeral database factory for integration tests.
        pub struct TestDatabase {
            pool: Option<PgPool>,
            admin_options: PgConnectOptions,
            database_name: String,
            // Held so the container outlives the pool.
            _container: Option<ContainerAsync<Postgres>>,
        }

        impl TestDatabase {
            /// Use `TEST_DATABASE_URL` when set, otherwise launch a disposable
            /// Postgres container.
            pub async fn new_from_env() -> Result<Self, TestDatabaseError> {
                match std::env::var("TEST_DATABASE_URL") {
                    Ok(url) if !url.is_empty() => Self::with_admin_url(&url, None).await,
                    _ => Self::new().await,
                }
            }

            /// Like [`TestDatabase::new_from_env`], but returns `None` (after
            /// saying so on stderr) when no database can be provisioned here.
            pub async fn provision_or_skip(test_name: &str) -> Option<Self> {
                match Self::new_from_env().await {
                    Ok(db) => Some(db),
                    Err(TestDatabaseError::MissingUrl) => {
                        eprintln!("skipping {test_name}: TEST_DATABASE_URL not set");
                        None
                    }
                    Err(TestDatabaseError::Container(err)) => {
                        eprintln!("skipping {test_name}: cannot start postgres container: {err}");
                        None
                    }
                    Err(err) => panic!("failed to provision test database: {err:?}"),
                }
            }

            /// Provision a fresh database in a new Postgres container.
            pub async fn new() -> Result<Self, TestDatabaseError> {
                let container = Postgres::default().with_tag("16-alpine").start().await?;

                let host = container.get_host().await?.to_string();
                let port = container.get_host_port_ipv4(5432).await?;
                let admin_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

                Self::with_admin_url(&admin_url, Some(container)).await
            }

            async fn with_admin_url(
                admin_url: &str,
                container: Option<ContainerAsync<Postgres>>,
            ) -> Result<Self, TestDatabaseError> {
                let base_options: PgConnectOptions =
                    admin_url.parse().map_err(TestDatabaseError::Sqlx)?;
                let base_options = base_options.log_statements(LevelFilter::Off);

                let base_name = base_options
                    .get_database()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "postgres".to_string());

                let admin_options = base_options.clone().database("postgres");
                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(admin_options.clone())
                    .await
                    .map_err(TestDatabaseError::Sqlx)?;

                let new_db_name = format!("{}_{}", base_name, Uuid::new_v4().simple());
                let create_sql = format!("CREATE DATABASE \"{}\" TEMPLATE template0", new_db_name);
                sqlx::query(&create_sql)
                    .execute(&admin_pool)
                    .await
                    .map_err(TestDatabaseError::Sqlx)?;
                admin_pool.close().await;

                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(base_options.clone().database(&new_db_name))
                    .await
                    .map_err(TestDatabaseError::Sqlx)?;

                MIGRATOR.run(&pool).await?;

                Ok(Self {
                    pool: Some(pool),
                    admin_options,
                    database_name: new_db_name,
                    _container: container,
                })
            }

            /// Cloneable connection pool for use in tests and Rocket state.
            pub fn pool(&self) -> &PgPool {
                self.pool.as_ref().expect("test database pool is available")
            }

            /// Convenience method returning a clone of the pooled connection handle.
            pub fn pool_clone(&self) -> PgPool {
                self.pool().clone()
            }

            /// Close pool connections and drop the ephemeral database.
            pub async fn close(mut self) -> Result<(), TestDatabaseError> {
                if let Some(pool) = self.pool.take() {
                    pool.close().await;
                }
                drop_database(self.admin_options.clone(), &self.database_name).await?;
                Ok(())
            }
        }

        /// Requires Postgres 13+ for `WITH (FORCE)`.
        async fn drop_database(
            admin_options: PgConnectOptions,
            database_name: &str,
        ) -> Result<(), sqlx::Error> {
            let mut conn = admin_options.connect().await?;
            sqlx::query(&format!(
                "DROP DATABASE IF EXISTS \"{database_name}\" WITH (FORCE)"
            ))
            .execute(&mut conn)
            .await?;
            conn.close().await
        }

        impl Drop for TestDatabase {
            // Tests that panic before `close` still clean up when a runtime is
            // around; container-backed databases go away with the container.
            fn drop(&mut self) {
                let Some(pool) = self.pool.take() else {
                    return;
                };
                if let Ok(handle) = Handle::try_current() {
                    let admin_options = self.admin_options.clone();
                    let database_name = std::mem::take(&mut self.database_name);
                    handle.spawn(async move {
                        pool.close().await;
                        if let Err(err) = drop_database(admin_options, &database_name).await {
                            eprintln!("failed to drop test database {database_name}: {err}");
                        }
                    });
                }
            }
        }
    }

    /// Builder for constructing Rocket instances tailored for integration tests.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        pg_pool: Option<PgPool>,
        auth: Option<AuthState>,
        importer: Option<ImporterState>,
        notifier: Option<ImportNotifier>,
    }

    impl TestRocketBuilder {
        /// Start a builder with sensible defaults: random port, logging disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                ..Default::default()
            }
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        /// Manage a `PgPool` instance for tests that exercise database-backed routes.
        pub fn manage_pg_pool(mut self, pool: PgPool) -> Self {
            self.pg_pool = Some(pool);
            self
        }

        /// Manage [`test_auth_state`] so bearer tokens minted with it are accepted.
        pub fn with_test_auth(mut self) -> Self {
            self.auth = Some(test_auth_state());
            self
        }

        pub fn manage_importer(mut self, importer: ImporterState) -> Self {
            self.importer = Some(importer);
            self
        }

        pub fn manage_notifier(mut self, notifier: ImportNotifier) -> Self {
            self.notifier = Some(notifier);
            self
        }

        /// Finish building the Rocket instance.
        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(pool) = self.pg_pool {
                rocket = rocket.manage(pool);
            }
            if let Some(auth) = self.auth {
                rocket = rocket.manage(auth);
            }
            if let Some(importer) = self.importer {
                rocket = rocket.manage(importer);
            }
            if let Some(notifier) = self.notifier {
                rocket = rocket.manage(notifier);
            }

            rocket
        }

        /// Convenience helper to produce a blocking local client.
        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        /// Convenience helper to produce an asynchronous local client.
        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
