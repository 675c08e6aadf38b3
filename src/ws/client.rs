//! WebSocket session with keepalive handling

use super::types::{WsConfig, WsError, WsMessage};
use super::FrameSource;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A single websocket session.
///
/// The session never reconnects on its own: once `next_frame` yields an error
/// or `None` the session is finished. Dropping it closes the socket.
pub struct WsSession {
    url: String,
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    ping_interval: Interval,
    heartbeat: Option<String>,
    waiting_for_pong: bool,
}

impl WsSession {
    /// Connect to the configured URL
    pub async fn connect(config: &WsConfig) -> Result<Self, WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = timeout(config.connect_timeout, connect_async(config.url.as_str()))
            .await
            .map_err(|_| WsError::ConnectTimeout)?
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (write, read) = ws_stream.split();

        tracing::info!(url = %config.url, "WebSocket connected");

        let mut ping_interval = interval_at(Instant::now() + config.ping_interval, config.ping_interval);
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Ok(Self {
            url: config.url.clone(),
            write,
            read,
            ping_interval,
            heartbeat: config.heartbeat.clone(),
            waiting_for_pong: false,
        })
    }

    /// Send a text frame
    pub async fn send_text(&mut self, text: String) -> Result<(), WsError> {
        self.write
            .send(Message::Text(text))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }

    async fn send_keepalive(&mut self) -> Result<(), WsError> {
        let frame = match &self.heartbeat {
            Some(text) => Message::Text(text.clone()),
            None => Message::Ping(vec![]),
        };
        self.write
            .send(frame)
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }
}

#[async_trait]
impl FrameSource for WsSession {
    async fn next_frame(&mut self) -> Option<Result<WsMessage, WsError>> {
        loop {
            tokio::select! {
                msg = self.read.next() => {
                    // Any inbound traffic proves the peer is alive
                    self.waiting_for_pong = false;
                    match msg {
                        Some(Ok(Message::Text(text))) => return Some(Ok(WsMessage::Text(text))),
                        Some(Ok(Message::Binary(data))) => return Some(Ok(WsMessage::Binary(data))),
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = self.write.send(Message::Pong(data)).await {
                                return Some(Err(WsError::SendFailed(e.to_string())));
                            }
                        }
                        Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(url = %self.url, ?frame, "Received close frame");
                            return None;
                        }
                        Some(Err(e)) => return Some(Err(WsError::ConnectionFailed(e.to_string()))),
                        None => return Some(Err(WsError::StreamEnded)),
                    }
                }

                _ = self.ping_interval.tick() => {
                    if self.waiting_for_pong {
                        return Some(Err(WsError::PongTimeout));
                    }
                    if let Err(e) = self.send_keepalive().await {
                        return Some(Err(e));
                    }
                    self.waiting_for_pong = true;
                }
            }
        }
    }
}

/// Channel-backed frame source, used to replay frames without a socket
#[async_trait]
impl FrameSource for mpsc::Receiver<Result<WsMessage, WsError>> {
    async fn next_frame(&mut self) -> Option<Result<WsMessage, WsError>> {
        self.recv().await
    }
}
