//! Price feed module
//!
//! One connector per exchange. Each connector owns a websocket session,
//! sends the venue's subscription once per connection and writes decoded
//! samples into a [`SampleSink`].

mod binance;
mod hyperliquid;
mod types;
mod upbit;

pub use binance::{BinanceDecoder, BINANCE_WS_URL};
pub use hyperliquid::{HyperliquidDecoder, HYPERLIQUID_WS_URL};
pub use types::{DecodeError, Exchange, FeedError, PriceKey, PriceSample, Symbol, Venue};
pub use upbit::{UpbitDecoder, UPBIT_WS_URL};

use crate::price::SampleSink;
use crate::telemetry;
use crate::ws::{FrameSource, WsConfig, WsMessage, WsSession};
use async_trait::async_trait;
use std::sync::Arc;

/// Venue-specific wire protocol
pub trait FrameDecoder: Send + Sync {
    /// Exchange this decoder speaks to
    fn exchange(&self) -> Exchange;

    /// Subscription message to send right after connecting, if any
    fn subscription(&self) -> Option<String>;

    /// Application-level keepalive, if the venue wants one instead of ping frames
    fn heartbeat(&self) -> Option<String> {
        None
    }

    /// Decode one text frame. Frames that carry no price decode to an empty vec.
    fn decode(&self, frame: &str) -> Result<Vec<PriceSample>, DecodeError>;
}

/// A long-running feed connection
#[async_trait]
pub trait FeedConnector: Send + Sync {
    /// Exchange label for logging
    fn exchange(&self) -> Exchange;

    /// Run one session. Returns when the session ends; never retries.
    async fn run(&self, sink: Arc<dyn SampleSink>) -> Result<(), FeedError>;
}

/// Connector driving a [`FrameDecoder`] over a real websocket
pub struct VenueConnector<D> {
    decoder: D,
    ws_config: WsConfig,
}

impl<D: FrameDecoder> VenueConnector<D> {
    pub fn new(decoder: D, ws_config: WsConfig) -> Self {
        let heartbeat = decoder.heartbeat();
        Self {
            decoder,
            ws_config: ws_config.heartbeat(heartbeat),
        }
    }
}

#[async_trait]
impl<D: FrameDecoder + 'static> FeedConnector for VenueConnector<D> {
    fn exchange(&self) -> Exchange {
        self.decoder.exchange()
    }

    async fn run(&self, sink: Arc<dyn SampleSink>) -> Result<(), FeedError> {
        let mut session = WsSession::connect(&self.ws_config)
            .await
            .map_err(FeedError::Connect)?;

        if let Some(sub) = self.decoder.subscription() {
            session
                .send_text(sub)
                .await
                .map_err(FeedError::Transport)?;
            tracing::info!(exchange = %self.exchange(), "Sent subscription");
        }

        pump(&mut session, &self.decoder, sink.as_ref()).await
    }
}

/// Decode frames from `source` into `sink` until the session ends.
///
/// Decode failures are logged and skipped; only transport errors end the loop.
pub async fn pump<S, D>(
    source: &mut S,
    decoder: &D,
    sink: &dyn SampleSink,
) -> Result<(), FeedError>
where
    S: FrameSource + ?Sized,
    D: FrameDecoder + ?Sized,
{
    let exchange = decoder.exchange();

    while let Some(frame) = source.next_frame().await {
        let text = match frame {
            Ok(WsMessage::Text(text)) => text,
            Ok(WsMessage::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => text,
                Err(_) => {
                    report_decode_error(exchange, &DecodeError::Utf8, "");
                    continue;
                }
            },
            Err(e) => {
                tracing::warn!(exchange = %exchange, error = %e, "Feed session dropped");
                return Err(FeedError::Transport(e));
            }
        };

        match decoder.decode(&text) {
            Ok(samples) => {
                telemetry::record_frame(exchange, samples.len());
                for sample in samples {
                    sink.record(sample);
                }
            }
            Err(e) => report_decode_error(exchange, &e, &text),
        }
    }

    tracing::info!(exchange = %exchange, "Feed session closed by peer");
    Ok(())
}

fn report_decode_error(exchange: Exchange, error: &DecodeError, frame: &str) {
    telemetry::record_decode_error(exchange);
    tracing::warn!(
        exchange = %exchange,
        error = %error,
        preview = %frame.chars().take(120).collect::<String>(),
        "Failed to decode frame"
    );
}
