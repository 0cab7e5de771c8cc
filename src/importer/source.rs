//! Hashtag search against the tweet provider.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use super::config::{ImporterConfig, TwitterCredentials};
use super::error::SourceError;

/// Largest page the search endpoint will return for a single request.
pub const MAX_SEARCH_COUNT: usize = 100;

/// Provider of raw tweet records for a hashtag.
#[rocket::async_trait]
pub trait TweetSource: Send + Sync {
    /// Tweets tagged `#hashtag` that carry images, newest provider page first.
    ///
    /// With `since_id` only tweets with a greater id are returned. Results
    /// come back in provider order, which is not guaranteed to be sorted.
    async fn search(
        &self,
        hashtag: &str,
        limit: usize,
        since_id: Option<i64>,
    ) -> Result<Vec<Value>, SourceError>;
}

/// Provider query for an album hashtag, restricted to tweets with images.
pub fn build_query(hashtag: &str) -> String {
    format!("#{hashtag} filter:images")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token_type: String,
    access_token: String,
}

/// Search client for the Twitter v1.1 standard search API using app-only auth.
pub struct TwitterSearchClient {
    http: reqwest::Client,
    api_base: String,
    credentials: TwitterCredentials,
    /// Token exchanged from the app credentials; dropped when the API rejects it.
    minted: Mutex<Option<String>>,
}

impl TwitterSearchClient {
    pub fn new(config: &ImporterConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent("album-server/0.1")
            .build()?;

        Ok(Self::with_client(
            http,
            &config.api_base,
            config.credentials.clone(),
        ))
    }

    pub fn with_client(http: reqwest::Client, api_base: &str, credentials: TwitterCredentials) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
            minted: Mutex::new(None),
        }
    }

    fn configured_token(&self) -> Option<&str> {
        self.credentials
            .bearer_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }

    async fn bearer_token(&self) -> Result<String, SourceError> {
        if let Some(token) = self.configured_token() {
            return Ok(token.to_string());
        }

        let mut minted = self.minted.lock().await;
        if let Some(token) = minted.as_ref() {
            return Ok(token.clone());
        }
        let token = self.exchange_token().await?;
        *minted = Some(token.clone());
        Ok(token)
    }

    /// Forget an exchanged token so the next search requests a fresh one.
    async fn invalidate_token(&self) {
        if self.configured_token().is_none() {
            log::warn!("search token rejected, a new one will be requested");
            *self.minted.lock().await = None;
        }
    }

    async fn exchange_token(&self) -> Result<String, SourceError> {
        log::debug!("requesting app-only bearer token");
        let response = self
            .http
            .post(format!("{}/oauth2/token", self.api_base))
            .basic_auth(&self.credentials.app_key, Some(&self.credentials.app_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        let body = response.bytes().await?;
        let parsed: TokenResponse = serde_json::from_slice(&body)?;
        if !parsed.token_type.eq_ignore_ascii_case("bearer") {
            return Err(SourceError::Token(format!(
                "unexpected token type '{}'",
                parsed.token_type
            )));
        }

        Ok(parsed.access_token)
    }
}

#[rocket::async_trait]
impl TweetSource for TwitterSearchClient {
    async fn search(
        &self,
        hashtag: &str,
        limit: usize,
        since_id: Option<i64>,
    ) -> Result<Vec<Value>, SourceError> {
        let count = limit.clamp(1, MAX_SEARCH_COUNT);
        if count != limit {
            log::debug!("search limit {} clamped to {}", limit, count);
        }

        let mut params = vec![
            ("q", build_query(hashtag)),
            ("count", count.to_string()),
            ("include_entities", "true".to_string()),
            ("result_type", "recent".to_string()),
        ];
        if let Some(since_id) = since_id {
            params.push(("since_id", since_id.to_string()));
        }

        let token = self.bearer_token().await?;
        let response = self
            .http
            .get(format!("{}/1.1/search/tweets.json", self.api_base))
            .bearer_auth(&token)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
        }
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status { status, body });
        }

        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        log::debug!(
            "search for #{} returned {} statuses (since_id: {:?})",
            hashtag,
            parsed.statuses.len(),
            since_id
        );

        Ok(parsed.statuses)
    }
}
