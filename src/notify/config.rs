use crate::importer::config::env_string;

/// Sender, recipients and link bases for import notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    pub from_address: String,
    pub managers: Vec<String>,
    /// Absolute base URL of the site, without trailing slash.
    pub site_url: String,
    /// Base under which stored image files are served; absolute or
    /// relative to `site_url`.
    pub media_url: String,
}

impl NotifyConfig {
    pub fn from_env() -> Self {
        Self {
            from_address: env_string("NOTIFY_FROM_ADDRESS", "albums@localhost"),
            managers: parse_addresses(&env_string("NOTIFY_MANAGERS", "")),
            site_url: env_string("SITE_URL", "http://localhost:8000")
                .trim_end_matches('/')
                .to_string(),
            media_url: env_string("MEDIA_URL", "/media")
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Public link to an album page.
    pub fn album_link(&self, album_name: &str) -> String {
        format!("{}/albums/{}", self.site_url, album_name)
    }

    /// Public link to a stored image file.
    pub fn media_link(&self, image_file: &str) -> String {
        let file = image_file.trim_start_matches('/');
        if self.media_url.starts_with("http://") || self.media_url.starts_with("https://") {
            format!("{}/{}", self.media_url, file)
        } else {
            format!(
                "{}/{}/{}",
                self.site_url,
                self.media_url.trim_start_matches('/'),
                file
            )
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Comma-separated address list; blanks are dropped.
fn parse_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(media_url: &str) -> NotifyConfig {
        NotifyConfig {
            from_address: "albums@example.com".into(),
            managers: vec![],
            site_url: "https://photos.example.com".into(),
            media_url: media_url.into(),
        }
    }

    #[test]
    fn manager_list_ignores_blanks() {
        assert_eq!(
            parse_addresses(" ops@example.com, ,editor@example.com,"),
            vec!["ops@example.com", "editor@example.com"]
        );
        assert!(parse_addresses("").is_empty());
    }

    #[test]
    fn links_are_built_from_site_and_media_bases() {
        let relative = config("/media");
        assert_eq!(
            relative.album_link("golang"),
            "https://photos.example.com/albums/golang"
        );
        assert_eq!(
            relative.media_link("uploads/a.jpg"),
            "https://photos.example.com/media/uploads/a.jpg"
        );

        let cdn = config("https://cdn.example.com/media");
        assert_eq!(
            cdn.media_link("uploads/a.jpg"),
            "https://cdn.example.com/media/uploads/a.jpg"
        );
    }
}
