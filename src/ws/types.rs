//! WebSocket types and configuration

use std::time::Duration;

/// WebSocket session configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Maximum time to wait for the handshake to complete
    pub connect_timeout: Duration,
    /// Interval for sending keepalives
    pub ping_interval: Duration,
    /// Text keepalive sent instead of a protocol ping frame, for venues
    /// that expect an application-level heartbeat
    pub heartbeat: Option<String>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(30),
            heartbeat: None,
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set handshake timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Send this text frame as the keepalive
    pub fn heartbeat(mut self, text: Option<String>) -> Self {
        self.heartbeat = text;
        self
    }
}

/// Data frames surfaced by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
}

/// WebSocket errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WsError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Handshake did not complete in time
    #[error("Connection timed out")]
    ConnectTimeout,
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
    /// Keepalive went unanswered for a full interval
    #[error("Pong timeout")]
    PongTimeout,
    /// Stream ended without a close frame
    #[error("Stream ended unexpectedly")]
    StreamEnded,
}
