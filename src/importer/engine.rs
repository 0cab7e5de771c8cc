//! Album import workflow: watermark lookup, hashtag search, and per-tweet
//! dedup/persist decisions.

use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};

use super::config::ImporterConfig;
use super::error::ImportError;
use super::extract;
use super::fetch::{HttpImageFetcher, ImageFetcher};
use super::media::MediaStorage;
use super::source::{TweetSource, TwitterSearchClient};
use super::stats::ImportStats;
use super::store::{AlbumStore, AttachOutcome, ImageSource, TweetRef};
use crate::models::Album;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoPhoto,
    AlreadyInAlbum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweetOutcome {
    Imported { image_id: i32, image_created: bool },
    Skipped(SkipReason),
}

/// Result of an import run bounded by a deadline.
#[derive(Debug, Clone)]
pub struct ImportRun {
    pub album: Album,
    /// Images attached to the album by this run, in the order they were attached.
    pub image_ids: Vec<i32>,
    pub stats: ImportStats,
    /// `false` when the deadline stopped the run before every tweet was handled.
    pub completed: bool,
}

pub struct ImportEngine {
    store: Arc<dyn AlbumStore>,
    source: Arc<dyn TweetSource>,
    fetcher: Arc<dyn ImageFetcher>,
    media: MediaStorage,
}

impl ImportEngine {
    pub fn new(
        store: Arc<dyn AlbumStore>,
        source: Arc<dyn TweetSource>,
        fetcher: Arc<dyn ImageFetcher>,
        media: MediaStorage,
    ) -> Self {
        Self {
            store,
            source,
            fetcher,
            media,
        }
    }

    /// Engine wired to the Twitter search API and plain HTTP photo downloads.
    pub fn from_config(
        config: &ImporterConfig,
        store: Arc<dyn AlbumStore>,
    ) -> Result<Self, reqwest::Error> {
        let source = TwitterSearchClient::new(config)?;
        let fetcher = HttpImageFetcher::new(config.http_timeout)?;

        Ok(Self::new(
            store,
            Arc::new(source),
            Arc::new(fetcher),
            MediaStorage::new(config.media_root.clone()),
        ))
    }

    pub fn store(&self) -> &Arc<dyn AlbumStore> {
        &self.store
    }

    /// Import new photos for `album_name`, returning the ids of images attached
    /// to the album, in attachment order.
    pub async fn import_for_album(
        &self,
        album_name: &str,
        limit: usize,
    ) -> Result<Vec<i32>, ImportError> {
        self.run(album_name, limit, None)
            .await
            .map(|run| run.image_ids)
    }

    /// Like [`ImportEngine::import_for_album`], bounded by `budget`.
    ///
    /// The search must answer within the budget. The deadline is checked
    /// between tweets and bounds each photo download; once a photo is
    /// downloaded its tweet is always saved and attached, so every committed
    /// relation is reported. Tweets left over report `completed: false`.
    pub async fn import_for_album_within(
        &self,
        album_name: &str,
        limit: usize,
        budget: Duration,
    ) -> Result<ImportRun, ImportError> {
        self.run(album_name, limit, Some((Instant::now() + budget, budget)))
            .await
    }

    async fn run(
        &self,
        album_name: &str,
        limit: usize,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<ImportRun, ImportError> {
        log::info!("starting import for album '{}'", album_name);

        let album = self
            .store
            .find_album(album_name)
            .await?
            .ok_or_else(|| ImportError::AlbumNotFound(album_name.to_string()))?;

        let since_id = self.store.last_tweet_id(album.id).await?;
        match since_id {
            Some(id) => log::debug!("album '{}' resumes after tweet {}", album.name, id),
            None => log::debug!("no previous imports for album '{}'", album.name),
        }

        let search = self.source.search(&album.name, limit, since_id);
        let tweets = match deadline {
            Some((at, budget)) => timeout_at(at, search)
                .await
                .map_err(|_| ImportError::DeadlineExceeded(budget))??,
            None => search.await?,
        };
        log::debug!("search returned {} tweets for '{}'", tweets.len(), album.name);

        let mut stats = ImportStats {
            tweets: tweets.len(),
            ..Default::default()
        };
        let mut image_ids = Vec::new();
        let mut completed = true;

        for tweet in &tweets {
            if deadline.is_some_and(|(at, _)| Instant::now() >= at) {
                completed = false;
                break;
            }

            match self.import_tweet(tweet, &album, deadline).await {
                Ok(TweetOutcome::Imported {
                    image_id,
                    image_created,
                }) => {
                    stats.record_import(image_created);
                    image_ids.push(image_id);
                }
                Ok(TweetOutcome::Skipped(reason)) => stats.record_skip(reason),
                Err(ImportError::DeadlineExceeded(_)) => {
                    log::debug!(
                        "download for tweet {} abandoned at the deadline",
                        tweet.get("id").unwrap_or(&Value::Null)
                    );
                    completed = false;
                    break;
                }
                Err(err) if err.is_tweet_scoped() => {
                    log::warn!(
                        "skipping tweet {} for album '{}': {}",
                        tweet.get("id").unwrap_or(&Value::Null),
                        album.name,
                        err
                    );
                    stats.record_failure(&err);
                }
                Err(err) => return Err(err),
            }
        }

        if completed {
            log::info!(
                "imported {} photo(s) into '{}' ({} tweets)",
                image_ids.len(),
                album.name,
                stats.tweets
            );
        } else {
            log::warn!(
                "import for '{}' hit its deadline after {} photo(s); rerun to resume",
                album.name,
                image_ids.len()
            );
        }

        Ok(ImportRun {
            album,
            image_ids,
            stats,
            completed,
        })
    }

    /// Import the photo of a single tweet into `album`.
    pub async fn import_one(
        &self,
        tweet: &Value,
        album: &Album,
    ) -> Result<TweetOutcome, ImportError> {
        self.import_tweet(tweet, album, None).await
    }

    async fn import_tweet(
        &self,
        tweet: &Value,
        album: &Album,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<TweetOutcome, ImportError> {
        let Some(photo_url) = extract::photo_url(tweet) else {
            log::debug!("no photo attached to tweet {}", tweet.get("id").unwrap_or(&Value::Null));
            return Ok(TweetOutcome::Skipped(SkipReason::NoPhoto));
        };

        let tweet_id = extract::tweet_id(tweet)?;
        let tweet_url = extract::tweet_permalink(tweet)?;

        if self.store.relation_exists(album.id, photo_url).await? {
            log::debug!("skipping duplicate image entry for tweet {}", tweet_url);
            return Ok(TweetOutcome::Skipped(SkipReason::AlreadyInAlbum));
        }

        let tweet_ref = TweetRef {
            tweet_id,
            tweet_url: &tweet_url,
        };

        let outcome = match self.store.find_image_id(photo_url).await? {
            Some(image_id) => {
                log::debug!("relinking stored image {} ({})", image_id, photo_url);
                self.store
                    .attach(album.id, ImageSource::Existing(image_id), tweet_ref)
                    .await?
            }
            None => {
                self.download_and_attach(album, photo_url, tweet_ref, deadline)
                    .await?
            }
        };

        if !outcome.relation_created {
            log::debug!("tweet {} was imported concurrently into '{}'", tweet_url, album.name);
            return Ok(TweetOutcome::Skipped(SkipReason::AlreadyInAlbum));
        }

        Ok(TweetOutcome::Imported {
            image_id: outcome.image_id,
            image_created: outcome.image_created,
        })
    }

    async fn download_and_attach(
        &self,
        album: &Album,
        photo_url: &str,
        tweet: TweetRef<'_>,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<AttachOutcome, ImportError> {
        log::debug!("fetching image file from {}", photo_url);
        let fetch = self.fetcher.fetch(photo_url);
        let fetched = match deadline {
            Some((at, budget)) => timeout_at(at, fetch)
                .await
                .map_err(|_| ImportError::DeadlineExceeded(budget))?,
            None => fetch.await,
        };
        let bytes = fetched.map_err(|source| ImportError::FetchFailed {
            url: photo_url.to_string(),
            source,
        })?;

        // Not cancelled past here: the file is either attached or removed.
        let image_file = self.media.save(photo_url, &bytes).await?;
        let attached = self
            .store
            .attach(
                album.id,
                ImageSource::New {
                    image_url: photo_url,
                    image_file: &image_file,
                },
                tweet,
            )
            .await;

        // Our file is only referenced when our image row won.
        if !matches!(&attached, Ok(outcome) if outcome.image_created) {
            if let Err(err) = self.media.remove(&image_file).await {
                log::warn!("failed to remove unused file {}: {}", image_file, err);
            }
        }

        Ok(attached?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::FetchError;
    use crate::models::Image;
    use crate::test_support::fakes::{
        MemoryAlbumStore, ScriptedTweetSource, StaticImageFetcher, tweet,
    };
    use rocket_db_pools::sqlx;
    use tempfile::TempDir;

    const PHOTO_A: &str = "http://pbs.twimg.com/media/a.jpg";
    const PHOTO_B: &str = "http://pbs.twimg.com/media/b.jpg";
    const PHOTO_C: &str = "http://pbs.twimg.com/media/c.jpg";

    struct Harness {
        engine: ImportEngine,
        store: Arc<MemoryAlbumStore>,
        source: Arc<ScriptedTweetSource>,
        fetcher: Arc<StaticImageFetcher>,
        media_dir: TempDir,
    }

    impl Harness {
        fn new(source: ScriptedTweetSource, fetcher: StaticImageFetcher) -> Self {
            let store = Arc::new(MemoryAlbumStore::new());
            let source = Arc::new(source);
            let fetcher = Arc::new(fetcher);
            let media_dir = tempfile::tempdir().expect("media dir");
            let engine = ImportEngine::new(
                store.clone(),
                source.clone(),
                fetcher.clone(),
                MediaStorage::new(media_dir.path()),
            );

            Self {
                engine,
                store,
                source,
                fetcher,
                media_dir,
            }
        }

        fn stored_files(&self) -> usize {
            std::fs::read_dir(self.media_dir.path().join("uploads"))
                .map(|entries| entries.count())
                .unwrap_or(0)
        }
    }

    fn photos() -> StaticImageFetcher {
        StaticImageFetcher::new()
            .with_image(PHOTO_A, b"photo-a")
            .with_image(PHOTO_B, b"photo-b")
            .with_image(PHOTO_C, b"photo-c")
    }

    fn golang_tweets() -> Vec<Value> {
        vec![
            tweet(100, "gopher", Some(PHOTO_A)),
            tweet(101, "gopher", None),
            tweet(102, "gopher", Some(PHOTO_B)),
        ]
    }

    #[tokio::test]
    async fn imports_photos_in_received_order() {
        let h = Harness::new(ScriptedTweetSource::new(golang_tweets()), photos());
        let album = h.store.create_album("golang");

        let ids = h.engine.import_for_album("golang", 100).await.expect("import");

        let images = h.store.images();
        assert_eq!(images.len(), 2);
        let id_of = |url: &str| images.iter().find(|i| i.image_url == url).map(|i| i.id);
        assert_eq!(ids, vec![id_of(PHOTO_A).unwrap(), id_of(PHOTO_B).unwrap()]);

        let relations = h.store.relations_for(album.id);
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0].tweet_url, "https://twitter.com/gopher/status/100/");
        assert_eq!(h.stored_files(), 2);

        h.engine.import_for_album("golang", 100).await.expect("second run");
        let calls = h.source.calls();
        assert_eq!(calls[0].since_id, None);
        assert_eq!(calls[0].hashtag, "golang");
        assert_eq!(calls[0].limit, 100);
        assert_eq!(calls[1].since_id, Some(102));
    }

    #[tokio::test]
    async fn rerun_with_stale_results_skips_known_photos() {
        let h = Harness::new(
            ScriptedTweetSource::new(golang_tweets()).ignoring_since_id(),
            photos(),
        );
        let album = h.store.create_album("golang");
        let image = h.store.insert_image(PHOTO_A, "uploads/a.jpg");
        h.store
            .relate(album.id, image.id, 100, "https://twitter.com/gopher/status/100/");

        let ids = h.engine.import_for_album("golang", 100).await.expect("import");

        assert_eq!(ids.len(), 1);
        assert_ne!(ids[0], image.id);
        assert_eq!(h.fetcher.fetched(), vec![PHOTO_B.to_string()]);
        assert_eq!(h.source.calls()[0].since_id, Some(100));
        assert_eq!(h.store.relations_for(album.id).len(), 2);
    }

    #[tokio::test]
    async fn second_run_without_new_tweets_is_a_no_op() {
        let h = Harness::new(
            ScriptedTweetSource::new(golang_tweets()).ignoring_since_id(),
            photos(),
        );
        h.store.create_album("golang");

        let first = h.engine.import_for_album("golang", 100).await.expect("first");
        let images_after_first = h.store.images();
        let relations_after_first = h.store.relations();

        let second = h.engine.import_for_album("golang", 100).await.expect("second");

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(h.store.images(), images_after_first);
        assert_eq!(h.store.relations(), relations_after_first);
        assert_eq!(h.fetcher.fetched().len(), 2);
    }

    #[tokio::test]
    async fn missing_album_fails_before_searching() {
        let h = Harness::new(ScriptedTweetSource::new(golang_tweets()), photos());

        let err = h.engine.import_for_album("nonexistent", 100).await.unwrap_err();

        assert!(matches!(err, ImportError::AlbumNotFound(name) if name == "nonexistent"));
        assert!(h.source.calls().is_empty());
        assert!(h.store.images().is_empty());
    }

    #[tokio::test]
    async fn photo_from_another_album_is_relinked_not_refetched() {
        let h = Harness::new(
            ScriptedTweetSource::new(vec![tweet(200, "pythonista", Some(PHOTO_A))])
                .ignoring_since_id(),
            photos(),
        );
        let python = h.store.create_album("python");
        let django = h.store.create_album("django");

        let first = h.engine.import_for_album("python", 100).await.expect("python");
        let second = h.engine.import_for_album("django", 100).await.expect("django");

        assert_eq!(first, second);
        assert_eq!(h.store.images().len(), 1);
        assert_eq!(h.fetcher.fetched(), vec![PHOTO_A.to_string()]);
        assert_eq!(h.store.relations_for(python.id).len(), 1);
        assert_eq!(h.store.relations_for(django.id).len(), 1);
    }

    #[tokio::test]
    async fn same_photo_in_two_tweets_is_attached_once() {
        let h = Harness::new(
            ScriptedTweetSource::new(vec![
                tweet(300, "first", Some(PHOTO_C)),
                tweet(301, "retweeter", Some(PHOTO_C)),
            ]),
            photos(),
        );
        let album = h.store.create_album("rustlang");

        let run = h
            .engine
            .import_for_album_within("rustlang", 100, Duration::from_secs(30))
            .await
            .expect("import");

        assert_eq!(run.image_ids.len(), 1);
        assert_eq!(run.stats.skipped_duplicates, 1);
        assert_eq!(h.store.images().len(), 1);
        assert_eq!(h.store.relations_for(album.id).len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_only_skips_that_tweet() {
        let h = Harness::new(
            ScriptedTweetSource::new(vec![
                tweet(400, "a", Some(PHOTO_A)),
                tweet(401, "b", Some(PHOTO_B)),
                tweet(402, "c", Some(PHOTO_C)),
            ]),
            photos().failing(PHOTO_B),
        );
        let album = h.store.create_album("isolation");

        let run = h
            .engine
            .import_for_album_within("isolation", 100, Duration::from_secs(30))
            .await
            .expect("import");

        assert_eq!(run.image_ids.len(), 2);
        assert_eq!(run.stats.fetch_failures, 1);
        assert!(run.completed);
        let tweet_ids: Vec<i64> = h
            .store
            .relations_for(album.id)
            .iter()
            .map(|r| r.tweet_id)
            .collect();
        assert_eq!(tweet_ids, vec![400, 402]);
    }

    #[tokio::test]
    async fn malformed_tweet_is_skipped() {
        let mut anonymous = tweet(500, "ghost", Some(PHOTO_A));
        anonymous["user"] = Value::Null;
        let h = Harness::new(
            ScriptedTweetSource::new(vec![anonymous, tweet(501, "named", Some(PHOTO_B))]),
            photos(),
        );
        h.store.create_album("malformed");

        let run = h
            .engine
            .import_for_album_within("malformed", 100, Duration::from_secs(30))
            .await
            .expect("import");

        assert_eq!(run.image_ids.len(), 1);
        assert_eq!(run.stats.malformed_tweets, 1);
        assert_eq!(h.fetcher.fetched(), vec![PHOTO_B.to_string()]);
    }

    #[tokio::test]
    async fn tweet_without_photo_or_user_is_not_malformed() {
        let mut bare = tweet(510, "ghost", None);
        bare["user"] = Value::Null;
        let h = Harness::new(
            ScriptedTweetSource::new(vec![bare, tweet(511, "named", Some(PHOTO_A))]),
            photos(),
        );
        h.store.create_album("bare");

        let run = h
            .engine
            .import_for_album_within("bare", 100, Duration::from_secs(30))
            .await
            .expect("import");

        assert_eq!(run.image_ids.len(), 1);
        assert_eq!(run.stats.skipped_without_photo, 1);
        assert_eq!(run.stats.malformed_tweets, 0);
        assert!(run.completed);
    }

    #[tokio::test]
    async fn source_failure_aborts_without_writes() {
        let h = Harness::new(ScriptedTweetSource::new(golang_tweets()).unavailable(), photos());
        h.store.create_album("golang");

        let err = h.engine.import_for_album("golang", 100).await.unwrap_err();

        assert!(matches!(err, ImportError::SourceUnavailable(_)));
        assert!(h.store.images().is_empty());
        assert!(h.fetcher.fetched().is_empty());
    }

    /// Stores the image itself while "downloading", as a concurrent run would.
    struct RacingFetcher {
        store: Arc<MemoryAlbumStore>,
    }

    #[rocket::async_trait]
    impl ImageFetcher for RacingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.store.insert_image(url, "uploads/other-run.jpg");
            Ok(b"late bytes".to_vec())
        }
    }

    #[tokio::test]
    async fn concurrent_image_creation_reuses_the_winner() {
        let store = Arc::new(MemoryAlbumStore::new());
        let album = store.create_album("race");
        let media_dir = tempfile::tempdir().expect("media dir");
        let engine = ImportEngine::new(
            store.clone(),
            Arc::new(ScriptedTweetSource::new(vec![tweet(600, "racer", Some(PHOTO_A))])),
            Arc::new(RacingFetcher {
                store: store.clone(),
            }),
            MediaStorage::new(media_dir.path()),
        );

        let ids = engine.import_for_album("race", 100).await.expect("import");

        let images = store.images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].image_file, "uploads/other-run.jpg");
        assert_eq!(ids, vec![images[0].id]);
        assert_eq!(store.relations_for(album.id).len(), 1);
        let leftover = std::fs::read_dir(media_dir.path().join("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn deadline_keeps_committed_tweets() {
        let h = Harness::new(
            ScriptedTweetSource::new(vec![
                tweet(700, "fast", Some(PHOTO_A)),
                tweet(701, "slow", Some(PHOTO_B)),
                tweet(702, "never", Some(PHOTO_C)),
            ]),
            photos().slow(PHOTO_B, Duration::from_secs(10)),
        );
        let album = h.store.create_album("deadline");

        let run = h
            .engine
            .import_for_album_within("deadline", 100, Duration::from_millis(300))
            .await
            .expect("partial import");

        assert!(!run.completed);
        assert_eq!(run.image_ids.len(), 1);
        assert_eq!(h.store.relations_for(album.id).len(), 1);
        assert_eq!(h.store.images().len(), 1);
    }

    #[tokio::test]
    async fn slow_search_exceeds_deadline() {
        let h = Harness::new(
            ScriptedTweetSource::new(golang_tweets()).delayed(Duration::from_secs(10)),
            photos(),
        );
        h.store.create_album("golang");

        let err = h
            .engine
            .import_for_album_within("golang", 100, Duration::from_millis(100))
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::DeadlineExceeded(_)));
        assert!(h.store.relations().is_empty());
    }

    /// Delegates to a [`MemoryAlbumStore`] but takes `delay` around `attach`,
    /// either before the write lands or after it has.
    struct SlowAttachStore {
        inner: Arc<MemoryAlbumStore>,
        delay: Duration,
        delay_after_commit: bool,
    }

    #[rocket::async_trait]
    impl AlbumStore for SlowAttachStore {
        async fn find_album(&self, name: &str) -> Result<Option<Album>, sqlx::Error> {
            self.inner.find_album(name).await
        }

        async fn last_tweet_id(&self, album_id: i32) -> Result<Option<i64>, sqlx::Error> {
            self.inner.last_tweet_id(album_id).await
        }

        async fn relation_exists(&self, album_id: i32, image_url: &str) -> Result<bool, sqlx::Error> {
            self.inner.relation_exists(album_id, image_url).await
        }

        async fn find_image_id(&self, image_url: &str) -> Result<Option<i32>, sqlx::Error> {
            self.inner.find_image_id(image_url).await
        }

        async fn attach(
            &self,
            album_id: i32,
            image: ImageSource<'_>,
            tweet: TweetRef<'_>,
        ) -> Result<AttachOutcome, sqlx::Error> {
            if !self.delay_after_commit {
                tokio::time::sleep(self.delay).await;
            }
            let outcome = self.inner.attach(album_id, image, tweet).await;
            if self.delay_after_commit {
                tokio::time::sleep(self.delay).await;
            }
            outcome
        }

        async fn images_by_ids(&self, ids: &[i32]) -> Result<Vec<Image>, sqlx::Error> {
            self.inner.images_by_ids(ids).await
        }

        async fn count_album_images(&self, album_id: i32) -> Result<i64, sqlx::Error> {
            self.inner.count_album_images(album_id).await
        }
    }

    fn slow_attach_engine(
        delay_after_commit: bool,
    ) -> (ImportEngine, Arc<MemoryAlbumStore>, TempDir) {
        let inner = Arc::new(MemoryAlbumStore::new());
        let media_dir = tempfile::tempdir().expect("media dir");
        let engine = ImportEngine::new(
            Arc::new(SlowAttachStore {
                inner: inner.clone(),
                delay: Duration::from_millis(500),
                delay_after_commit,
            }),
            Arc::new(ScriptedTweetSource::new(vec![
                tweet(800, "first", Some(PHOTO_A)),
                tweet(801, "second", Some(PHOTO_B)),
            ])),
            Arc::new(photos()),
            MediaStorage::new(media_dir.path()),
        );
        (engine, inner, media_dir)
    }

    #[tokio::test]
    async fn attach_finishing_past_the_deadline_is_reported() {
        let (engine, store, _media_dir) = slow_attach_engine(true);
        let album = store.create_album("slowcommit");

        let run = engine
            .import_for_album_within("slowcommit", 100, Duration::from_millis(200))
            .await
            .expect("partial import");

        let relations = store.relations_for(album.id);
        assert_eq!(relations.len(), 1);
        assert_eq!(run.image_ids, vec![relations[0].image_id]);
        assert_eq!(run.stats.images_created, 1);
        assert!(!run.completed);
    }

    #[tokio::test]
    async fn deadline_during_attach_leaves_no_unreferenced_files() {
        let (engine, store, media_dir) = slow_attach_engine(false);
        store.create_album("slowwrite");

        let run = engine
            .import_for_album_within("slowwrite", 100, Duration::from_millis(200))
            .await
            .expect("partial import");

        assert!(!run.completed);
        let images = store.images();
        assert_eq!(images.len(), 1);
        let files: Vec<String> = std::fs::read_dir(media_dir.path().join("uploads"))
            .expect("uploads dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(images[0].image_file, format!("uploads/{}", files[0]));
    }
}
