use crate::error::Result;
use crate::models::NotificationMessage;
use async_trait::async_trait;

/// Trait for delivering outbound notifications
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver a single message. One attempt, no retry.
    async fn send(&self, message: &NotificationMessage) -> Result<()>;

    /// Destination description for logs
    fn destination(&self) -> &str;
}
