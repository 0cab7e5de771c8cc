use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub(crate) fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

pub(crate) fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("no twitter credentials configured (set TWITTER_BEARER_TOKEN or TWITTER_CREDENTIALS_FILE)")]
    Missing,
    #[error("failed to read credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid credentials file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Application credentials for the search API.
///
/// Either a ready bearer token or the app key/secret pair used to obtain one.
#[derive(Clone, Default, Deserialize)]
pub struct TwitterCredentials {
    #[serde(default)]
    pub app_key: String,
    #[serde(default)]
    pub app_secret: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl TwitterCredentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Load credentials from a JSON file with `app_key`, `app_secret` and an
    /// optional `bearer_token`.
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let raw = std::fs::read(path).map_err(|source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| CredentialsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `TWITTER_BEARER_TOKEN` wins over `TWITTER_CREDENTIALS_FILE`.
    pub fn from_env() -> Result<Self, CredentialsError> {
        if let Some(token) = env::var("TWITTER_BEARER_TOKEN").ok().filter(|t| !t.is_empty()) {
            return Ok(Self::bearer(token));
        }

        match env::var("TWITTER_CREDENTIALS_FILE") {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Err(CredentialsError::Missing),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.bearer_token.as_deref().is_some_and(|t| !t.is_empty())
            || (!self.app_key.is_empty() && !self.app_secret.is_empty())
    }
}

/// Settings for the import engine and its HTTP collaborators.
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    pub api_base: String,
    pub credentials: TwitterCredentials,
    pub default_limit: usize,
    pub import_timeout: Duration,
    pub http_timeout: Duration,
    pub media_root: PathBuf,
}

impl ImporterConfig {
    pub fn from_env() -> Result<Self, CredentialsError> {
        let credentials = TwitterCredentials::from_env()?;
        if !credentials.is_usable() {
            return Err(CredentialsError::Missing);
        }

        Ok(Self {
            api_base: env_string("TWITTER_API_BASE", "https://api.twitter.com"),
            credentials,
            default_limit: default_limit_from_env(),
            import_timeout: import_timeout_from_env(),
            http_timeout: env_duration_millis("IMPORT_HTTP_TIMEOUT_MS", 15_000),
            media_root: PathBuf::from(media_root_from_env()),
        })
    }
}

pub fn media_root_from_env() -> String {
    env_string("MEDIA_ROOT", "./media")
}

pub fn default_limit_from_env() -> usize {
    env_usize("IMPORT_DEFAULT_LIMIT", 100).clamp(1, super::source::MAX_SEARCH_COUNT)
}

pub fn import_timeout_from_env() -> Duration {
    env_duration_millis("IMPORT_TIMEOUT_MS", 60_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_credentials_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"app_key": "key", "app_secret": "secret"}}"#).expect("write");

        let credentials = TwitterCredentials::from_file(file.path()).expect("credentials");
        assert_eq!(credentials.app_key, "key");
        assert_eq!(credentials.app_secret, "secret");
        assert!(credentials.bearer_token.is_none());
        assert!(credentials.is_usable());
    }

    #[test]
    fn rejects_garbage_credentials_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "app_key=key").expect("write");

        let err = TwitterCredentials::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CredentialsError::Parse { .. }));
    }

    #[test]
    fn empty_credentials_are_not_usable() {
        assert!(!TwitterCredentials::default().is_usable());
        assert!(TwitterCredentials::bearer("abc").is_usable());
        assert!(!TwitterCredentials::bearer("").is_usable());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = TwitterCredentials {
            app_key: "key".into(),
            app_secret: "very-secret".into(),
            bearer_token: Some("token-value".into()),
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("token-value"));
    }
}
