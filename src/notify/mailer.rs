use serde::Serialize;
use thiserror::Error;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub subject: String,
    pub body: String,
    pub from_address: String,
    pub to: Vec<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Delivery seam for composed messages.
#[rocket::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), MailError>;
}

/// Writes messages to the application log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[rocket::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), MailError> {
        log::info!(
            "mail from {} to {}: {}\n{}",
            message.from_address,
            message.to.join(", "),
            message.subject,
            message.body
        );
        Ok(())
    }
}
