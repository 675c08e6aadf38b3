//! Binance combined-stream ticker decoder
//!
//! Frames look like `{"stream":"btcusdt@ticker","data":{"s":"BTCUSDT","c":"95000.10",...}}`.
//! The stream list is part of the URL, so no subscription message is sent.

use super::{DecodeError, Exchange, FrameDecoder, PriceSample, Symbol, Venue};
use chrono::{TimeZone, Utc};
use serde::Deserialize;

/// Binance spot WebSocket base URL
pub const BINANCE_WS_URL: &str = "wss://stream.binance.com:9443";

/// Combined stream envelope
#[derive(Debug, Deserialize)]
struct CombinedFrame {
    /// Stream name, e.g. "btcusdt@ticker"
    stream: Option<String>,
    /// Ticker payload
    data: Option<TickerPayload>,
    /// Error code on request failures
    code: Option<i64>,
    /// Error message on request failures
    msg: Option<String>,
}

/// 24hr ticker payload
#[derive(Debug, Deserialize)]
struct TickerPayload {
    /// Symbol, e.g. "BTCUSDT"
    #[serde(rename = "s")]
    symbol: Option<String>,
    /// Last price
    #[serde(rename = "c")]
    last_price: Option<String>,
    /// Event time (milliseconds)
    #[serde(rename = "E")]
    event_time: Option<i64>,
}

/// Decoder for the reference venue
pub struct BinanceDecoder {
    symbols: Vec<Symbol>,
    quote: String,
}

impl BinanceDecoder {
    /// Track `symbols` quoted in `quote` (e.g. "USDT")
    pub fn new(symbols: Vec<Symbol>, quote: impl AsRef<str>) -> Self {
        Self {
            symbols,
            quote: quote.as_ref().to_uppercase(),
        }
    }

    /// Stream names for the tracked symbols
    pub fn streams(&self) -> Vec<String> {
        self.symbols
            .iter()
            .map(|s| format!("{}{}@ticker", s.as_str(), self.quote).to_lowercase())
            .collect()
    }

    /// Build the combined-stream URL under `base`
    pub fn stream_url(&self, base: &str) -> String {
        format!(
            "{}/stream?streams={}",
            base.trim_end_matches('/'),
            self.streams().join("/")
        )
    }

    /// Strip the quote suffix from a Binance pair name
    fn base_symbol(&self, pair: &str) -> Option<Symbol> {
        let pair = pair.to_uppercase();
        let base = pair.strip_suffix(&self.quote)?;
        (!base.is_empty()).then(|| Symbol::new(base))
    }
}

impl FrameDecoder for BinanceDecoder {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    fn subscription(&self) -> Option<String> {
        None
    }

    fn decode(&self, frame: &str) -> Result<Vec<PriceSample>, DecodeError> {
        let frame: CombinedFrame = serde_json::from_str(frame)?;

        if frame.stream.is_none() {
            if let Some(msg) = frame.msg {
                return Err(DecodeError::Venue(format!(
                    "{} (code {})",
                    msg,
                    frame.code.unwrap_or_default()
                )));
            }
            return Ok(vec![]);
        }

        let Some(payload) = frame.data else {
            return Ok(vec![]);
        };
        let (Some(pair), Some(last_price)) = (payload.symbol, payload.last_price) else {
            return Ok(vec![]);
        };

        let symbol = self
            .base_symbol(&pair)
            .ok_or_else(|| DecodeError::InvalidMarketCode(pair.clone()))?;
        if !self.symbols.contains(&symbol) {
            return Ok(vec![]);
        }

        let price = DecodeError::parse_price(&pair, &last_price)?;

        let timestamp = payload
            .event_time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(Utc::now);

        Ok(vec![PriceSample {
            venue: Venue::Reference,
            symbol,
            price,
            timestamp,
            source: Exchange::Binance,
        }])
    }
}
