//! WebSocket client library
//!
//! Provides a single-session WebSocket client with ping/pong keepalive.
//! Reconnection is owned by the caller (see [`crate::supervisor`]).

mod client;
mod types;

pub use client::WsSession;
pub use types::{WsConfig, WsError, WsMessage};

use async_trait::async_trait;

/// Anything that yields inbound frames in arrival order
#[async_trait]
pub trait FrameSource: Send {
    /// Next data frame. `None` means the peer closed the session cleanly.
    async fn next_frame(&mut self) -> Option<Result<WsMessage, WsError>>;
}
