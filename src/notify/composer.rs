use rocket_db_pools::sqlx;
use std::sync::Arc;

use super::config::NotifyConfig;
use super::mailer::OutgoingMessage;
use crate::importer::AlbumStore;
use crate::models::{Album, Image};

/// Renders the "new photos imported" message for each recipient.
pub struct NotificationComposer {
    store: Arc<dyn AlbumStore>,
    config: NotifyConfig,
}

impl NotificationComposer {
    pub fn new(store: Arc<dyn AlbumStore>, config: NotifyConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// One message per recipient describing `new_image_ids`; nothing when no
    /// photos were imported.
    pub async fn compose(
        &self,
        album: &Album,
        new_image_ids: &[i32],
        recipients: &[String],
    ) -> Result<Vec<OutgoingMessage>, sqlx::Error> {
        if new_image_ids.is_empty() || recipients.is_empty() {
            return Ok(Vec::new());
        }

        let images = self.store.images_by_ids(new_image_ids).await?;
        let total = self.store.count_album_images(album.id).await?;

        let subject = single_line(&subject_for(album, images.len()));
        let body = self.render_body(album, &images, total);

        Ok(recipients
            .iter()
            .map(|recipient| OutgoingMessage {
                subject: subject.clone(),
                body: body.clone(),
                from_address: self.config.from_address.clone(),
                to: vec![recipient.clone()],
            })
            .collect())
    }

    fn render_body(&self, album: &Album, images: &[Image], total: i64) -> String {
        let mut body = format!(
            "{} new photo(s) were imported into the album #{}.\n\n\
             Album: {}\n\
             Photos in album: {}\n\n\
             New photos:\n",
            images.len(),
            album.name,
            self.config.album_link(&album.name),
            total
        );
        for image in images {
            body.push_str(&format!(
                "- {} (stored at {})\n",
                image.image_url,
                self.config.media_link(&image.image_file)
            ));
        }
        body
    }
}

fn subject_for(album: &Album, count: usize) -> String {
    format!("{} new photo(s) in album #{}", count, album.name)
}

/// Collapse line breaks so the value is safe as a mail header.
fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
