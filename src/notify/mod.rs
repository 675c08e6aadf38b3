//! Alert delivery
//!
//! Notifiers are called inline from the feed task that triggered the alert,
//! so implementations must return quickly. Network delivery is spawned.

mod file;
mod telegram;

pub use file::FileNotifier;
pub use telegram::{TelegramNotifier, TELEGRAM_TOKEN_ENV};

use crate::config::NotifyConfig;
use std::sync::Arc;
use thiserror::Error;

/// Notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No async runtime to deliver on")]
    NoRuntime,

    #[error("Notifier misconfigured: {0}")]
    Config(String),
}

/// Sink for alert messages
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// Prints alerts to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        println!("{}", message);
        Ok(())
    }
}

/// Fans one message out to every notifier
#[derive(Default, Clone)]
pub struct NotifierSet {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Build the configured notifiers
    pub fn from_config(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let mut set = Self::new();

        if config.console {
            set = set.with(Arc::new(ConsoleNotifier));
        }
        if let Some(path) = &config.log_file {
            set = set.with(Arc::new(FileNotifier::open(path)?));
        }
        if config.telegram {
            let chat_id = config.telegram_chat_id.clone().ok_or_else(|| {
                NotifyError::Config("telegram enabled without telegram_chat_id".to_string())
            })?;
            set = set.with(Arc::new(TelegramNotifier::from_env(chat_id)?));
        }

        tracing::info!(notifiers = set.len(), "Alert notifiers configured");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for NotifierSet {
    /// Every notifier is tried; the first failure is returned.
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let mut first_err = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(message) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
