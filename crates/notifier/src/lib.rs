// In crates/notifier/src/lib.rs

use async_trait::async_trait;

pub mod error;
pub mod telegram;

// Re-export public types
pub use error::{Error, Result};
pub use telegram::TelegramNotifier;

/// The universal interface for delivering a text message to a single recipient.
///
/// Delivery is at-most-once: a failed send is reported to the caller, which logs
/// it. Nothing retries.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The name of the notifier (e.g., "Telegram").
    fn name(&self) -> &'static str;

    /// The configured recipient identifier, if any.
    fn recipient(&self) -> Option<&str>;

    /// Sends one message.
    async fn send_message(&self, text: &str) -> Result<()>;
}
