//! Manager notifications for newly imported photos.

pub mod composer;
pub mod config;
pub mod mailer;

pub use composer::NotificationComposer;
pub use config::NotifyConfig;
pub use mailer::{LogMailer, MailError, Mailer, OutgoingMessage};

use std::sync::Arc;

use crate::models::Album;

/// Composes import notifications for the configured managers and hands them
/// to a [`Mailer`].
pub struct ImportNotifier {
    composer: NotificationComposer,
    mailer: Arc<dyn Mailer>,
}

impl ImportNotifier {
    pub fn new(composer: NotificationComposer, mailer: Arc<dyn Mailer>) -> Self {
        Self { composer, mailer }
    }

    /// Notify managers about `new_image_ids`, returning how many messages were
    /// handed off. Failures are logged and never propagated.
    pub async fn notify(&self, album: &Album, new_image_ids: &[i32]) -> usize {
        let recipients = &self.composer.config().managers;
        if recipients.is_empty() {
            log::debug!("no managers configured, skipping notification for '{}'", album.name);
            return 0;
        }

        let messages = match self.composer.compose(album, new_image_ids, recipients).await {
            Ok(messages) => messages,
            Err(err) => {
                log::error!("failed to compose notification for '{}': {}", album.name, err);
                return 0;
            }
        };

        let mut sent = 0;
        for message in &messages {
            match self.mailer.send(message).await {
                Ok(()) => sent += 1,
                Err(err) => log::warn!(
                    "failed to notify {} about '{}': {}",
                    message.to.join(", "),
                    album.name,
                    err
                ),
            }
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fakes::{MemoryAlbumStore, RecordingMailer};

    fn notify_config(managers: &[&str]) -> NotifyConfig {
        NotifyConfig {
            from_address: "albums@example.com".into(),
            managers: managers.iter().map(|m| m.to_string()).collect(),
            site_url: "http://localhost:8000".into(),
            media_url: "/media".into(),
        }
    }

    #[tokio::test]
    async fn delivers_to_every_manager() {
        let store = Arc::new(MemoryAlbumStore::new());
        let album = store.create_album("rustlang");
        let image = store.insert_image("http://pbs.twimg.com/media/r.jpg", "uploads/r.jpg");
        store.relate(album.id, image.id, 1, "https://twitter.com/r/status/1/");

        let mailer = Arc::new(RecordingMailer::default());
        let notifier = ImportNotifier::new(
            NotificationComposer::new(store, notify_config(&["a@example.com", "b@example.com"])),
            mailer.clone(),
        );

        assert_eq!(notifier.notify(&album, &[image.id]).await, 2);
        assert_eq!(notifier.notify(&album, &[]).await, 0);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, vec!["b@example.com".to_string()]);
    }

    #[tokio::test]
    async fn delivery_failures_are_not_counted() {
        let store = Arc::new(MemoryAlbumStore::new());
        let album = store.create_album("rustlang");
        let image = store.insert_image("http://pbs.twimg.com/media/r.jpg", "uploads/r.jpg");

        let notifier = ImportNotifier::new(
            NotificationComposer::new(store, notify_config(&["a@example.com"])),
            Arc::new(RecordingMailer::failing()),
        );

        assert_eq!(notifier.notify(&album, &[image.id]).await, 0);
    }
}
