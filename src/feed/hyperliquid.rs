//! Hyperliquid `allMids` decoder
//!
//! Mid prices are written to the reference venue, the same key the Binance
//! feed writes. Whichever arrives last wins.

use super::{DecodeError, Exchange, FrameDecoder, PriceSample, Symbol, Venue};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;

/// Hyperliquid WebSocket URL
pub const HYPERLIQUID_WS_URL: &str = "wss://api.hyperliquid.xyz/ws";

#[derive(Debug, Deserialize)]
struct ChannelFrame {
    channel: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct AllMids {
    mids: HashMap<String, String>,
}

/// Decoder for the alternate derivatives venue
pub struct HyperliquidDecoder {
    symbols: Vec<Symbol>,
}

impl HyperliquidDecoder {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }
}

impl FrameDecoder for HyperliquidDecoder {
    fn exchange(&self) -> Exchange {
        Exchange::Hyperliquid
    }

    fn subscription(&self) -> Option<String> {
        let msg = serde_json::json!({
            "method": "subscribe",
            "subscription": {"type": "allMids"}
        });
        Some(msg.to_string())
    }

    fn heartbeat(&self) -> Option<String> {
        Some(serde_json::json!({"method": "ping"}).to_string())
    }

    fn decode(&self, frame: &str) -> Result<Vec<PriceSample>, DecodeError> {
        let frame: ChannelFrame = serde_json::from_str(frame)?;

        match frame.channel.as_deref() {
            Some("allMids") => {}
            Some("error") => {
                let msg = frame
                    .data
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| frame.data.to_string());
                return Err(DecodeError::Venue(msg));
            }
            // subscriptionResponse, pong, other channels
            _ => return Ok(vec![]),
        }

        let mids: AllMids = serde_json::from_value(frame.data)?;
        let timestamp = Utc::now();
        let mut samples = Vec::with_capacity(self.symbols.len());
        let mut rejected = None;

        for symbol in &self.symbols {
            let Some(raw) = mids.mids.get(symbol.as_str()) else {
                continue;
            };
            let price = match DecodeError::parse_price(symbol.as_str(), raw) {
                Ok(price) => price,
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "Skipping mid");
                    rejected = Some(e);
                    continue;
                }
            };
            samples.push(PriceSample {
                venue: Venue::Reference,
                symbol: symbol.clone(),
                price,
                timestamp,
                source: Exchange::Hyperliquid,
            });
        }

        // A frame whose tracked mids were all bad still counts as a decode error
        match rejected {
            Some(e) if samples.is_empty() => Err(e),
            _ => Ok(samples),
        }
    }
}
