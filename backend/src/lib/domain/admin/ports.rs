use async_trait::async_trait;

use crate::domain::admin::errors::MailError;

/// Port for outbound mail delivery.
#[async_trait]
pub trait MailSender: Send + Sync + 'static {
    /// Send a plain-text message.
    ///
    /// # Errors
    /// * `Settings` - Delivery settings missing or unreadable
    /// * `InvalidAddress` - Sender or recipient address rejected
    /// * `Transport` - Message could not be handed to the mail server
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
