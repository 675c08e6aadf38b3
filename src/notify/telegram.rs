//! Telegram Bot API notifier

use super::{Notifier, NotifyError};
use reqwest::Client;
use std::time::Duration;
use tokio::runtime::Handle;

/// Environment variable holding the bot token
pub const TELEGRAM_TOKEN_ENV: &str = "KIMP_TELEGRAM_TOKEN";

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Sends alerts to a Telegram chat.
///
/// Delivery is spawned on the current tokio runtime; failures are logged,
/// not returned.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: TELEGRAM_API_URL.to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Read the bot token from [`TELEGRAM_TOKEN_ENV`]
    pub fn from_env(chat_id: impl Into<String>) -> Result<Self, NotifyError> {
        let token = std::env::var(TELEGRAM_TOKEN_ENV)
            .map_err(|_| NotifyError::Config(format!("{} is not set", TELEGRAM_TOKEN_ENV)))?;
        Self::new(token, chat_id)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let handle = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;

        let request = self.client.post(self.endpoint()).json(&serde_json::json!({
            "chat_id": self.chat_id,
            "text": message,
        }));

        handle.spawn(async move {
            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(_) => tracing::debug!("Telegram alert delivered"),
                // without_url keeps the bot token out of the logs
                Err(e) => tracing::warn!(error = %e.without_url(), "Telegram delivery failed"),
            }
        });

        Ok(())
    }
}
