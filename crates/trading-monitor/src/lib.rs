//! Logging and operator notifications.

mod logging;
mod notifier;

pub use logging::setup_logging;
pub use notifier::{DiscordNotifier, LogNotifier};
