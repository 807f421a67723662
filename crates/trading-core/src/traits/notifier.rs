//! Operator notification trait.

use crate::error::NotificationError;
use async_trait::async_trait;

/// Delivers human-readable status and error messages to an operator channel.
///
/// Delivery is best effort. Callers log failures and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message.
    async fn notify(&self, message: &str) -> Result<(), NotificationError>;

    /// Get the notifier name.
    fn name(&self) -> &str;
}
