//! On-disk storage for fetched photo bytes.
//!
//! Files live under `<media_root>/uploads/` and are referenced from the
//! `images.image_file` column by their path relative to the media root.

use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use uuid::Uuid;

const UPLOAD_DIR: &str = "uploads";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid file name pattern"));

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, image_file: &str) -> PathBuf {
        self.root.join(image_file)
    }

    /// Write `bytes` for the photo at `image_url`, returning the relative
    /// handle to persist.
    pub async fn save(&self, image_url: &str, bytes: &[u8]) -> io::Result<String> {
        let dir = self.root.join(UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let name = format!("{}_{}", Uuid::new_v4().simple(), file_name_from_url(image_url));
        let final_path = dir.join(&name);
        let partial_path = dir.join(format!("{name}.part"));

        tokio::fs::write(&partial_path, bytes).await?;
        if let Err(err) = tokio::fs::rename(&partial_path, &final_path).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(err);
        }

        Ok(format!("{UPLOAD_DIR}/{name}"))
    }

    /// Remove a stored file; a file that is already gone is not an error.
    pub async fn remove(&self, image_file: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.path_for(image_file)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// Last path segment of the URL, without query or fragment, reduced to a
/// filesystem-safe name.
fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last = path.rsplit('/').next().unwrap_or_default();
    let cleaned = UNSAFE_FILE_CHARS.replace_all(last, "_");
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.chars().take(100).collect()
    }
}
