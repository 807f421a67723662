//! Operator notifiers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use trading_core::error::NotificationError;
use trading_core::traits::Notifier;
use tracing::{debug, info};

/// Discord rejects message content longer than this many characters.
const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
}

/// Posts messages to a Discord channel webhook.
///
/// Every message is also logged, so the log carries the full operator
/// transcript even when delivery fails.
pub struct DiscordNotifier {
    client: Client,
    url: String,
    username: String,
    avatar_url: Option<String>,
}

impl DiscordNotifier {
    /// Create a notifier for the webhook with the given id and token.
    pub fn new(webhook_id: &str, webhook_token: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("https://discordapp.com/api/webhooks/{}/{}", webhook_id, webhook_token),
            username: "alpaca-algorithmic-trader".to_string(),
            avatar_url: None,
        }
    }

    /// Read the webhook id and token from the named environment variables.
    pub fn from_env(id_var: &str, token_var: &str) -> Result<Self, NotificationError> {
        let id = std::env::var(id_var)
            .map_err(|_| NotificationError::Configuration(format!("{} not set", id_var)))?;
        let token = std::env::var(token_var)
            .map_err(|_| NotificationError::Configuration(format!("{} not set", token_var)))?;
        Ok(Self::new(&id, &token))
    }

    /// Set the display name of the webhook user.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the avatar of the webhook user.
    pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url;
        self
    }

    fn payload<'a>(&'a self, content: &'a str) -> WebhookPayload<'a> {
        WebhookPayload {
            content: clip(content, MAX_CONTENT_CHARS),
            username: &self.username,
            avatar_url: self.avatar_url.as_deref(),
        }
    }
}

/// Cut `text` to at most `max_chars` characters.
fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        info!("{}", message);

        let resp = self
            .client
            .post(&self.url)
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NotificationError::Delivery(format!("{}: {}", status, text)));
        }

        debug!("Notification delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "Discord"
    }
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotificationError> {
        info!(target: "operator", "{}", message);
        Ok(())
    }

    fn name(&self) -> &str {
        "Log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let notifier = DiscordNotifier::new("123", "abc").with_username("bot");
        let json = serde_json::to_value(notifier.payload("hello")).unwrap();

        assert_eq!(json["content"], "hello");
        assert_eq!(json["username"], "bot");
        assert!(json.get("avatar_url").is_none());
        assert_eq!(notifier.url, "https://discordapp.com/api/webhooks/123/abc");
    }

    #[test]
    fn test_long_content_is_clipped() {
        let notifier = DiscordNotifier::new("1", "t");
        let long = "é".repeat(2500);

        let payload = notifier.payload(&long);
        assert_eq!(payload.content.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_missing_webhook_env() {
        let err = DiscordNotifier::from_env("CROSSOVER_TEST_NO_ID", "CROSSOVER_TEST_NO_TOKEN")
            .err()
            .unwrap();
        assert!(matches!(err, NotificationError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify("Is the market open? false!").await.is_ok());
    }
}
