//! Upbit ticker decoder
//!
//! One subscription covers every market code. Frames arrive as binary JSON,
//! e.g. `{"type":"ticker","code":"KRW-BTC","trade_price":138700000.0,...}`.

use super::{DecodeError, Exchange, FrameDecoder, PriceSample, Symbol, Venue};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Upbit WebSocket URL
pub const UPBIT_WS_URL: &str = "wss://api.upbit.com/websocket/v1";

/// Ticker frame. Every field is optional; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct TickerFrame {
    /// Market code, e.g. "KRW-BTC"
    code: Option<String>,
    /// Last traded price
    trade_price: Option<Decimal>,
    /// Frame time (milliseconds)
    timestamp: Option<i64>,
    /// Error object on rejected requests
    error: Option<UpbitError>,
}

#[derive(Debug, Deserialize)]
struct UpbitError {
    name: Option<String>,
    message: Option<String>,
}

/// Decoder for the domestic venue
pub struct UpbitDecoder {
    symbols: Vec<Symbol>,
    stable_symbol: Symbol,
    quote: String,
}

impl UpbitDecoder {
    /// Track `symbols` plus the stable asset, all quoted in `quote` (e.g. "KRW")
    pub fn new(symbols: Vec<Symbol>, stable_symbol: impl Into<Symbol>, quote: impl AsRef<str>) -> Self {
        Self {
            symbols,
            stable_symbol: stable_symbol.into(),
            quote: quote.as_ref().to_uppercase(),
        }
    }

    /// Market codes to subscribe to, stable asset included
    pub fn market_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .symbols
            .iter()
            .map(|s| format!("{}-{}", self.quote, s))
            .collect();
        let stable = format!("{}-{}", self.quote, self.stable_symbol);
        if !codes.contains(&stable) {
            codes.push(stable);
        }
        codes
    }

    /// Split "KRW-BTC" into ("KRW", "BTC")
    fn split_code(code: &str) -> Result<(&str, Symbol), DecodeError> {
        match code.split_once('-') {
            Some((quote, base)) if !quote.is_empty() && !base.is_empty() => {
                Ok((quote, Symbol::new(base)))
            }
            _ => Err(DecodeError::InvalidMarketCode(code.to_string())),
        }
    }
}

impl FrameDecoder for UpbitDecoder {
    fn exchange(&self) -> Exchange {
        Exchange::Upbit
    }

    fn subscription(&self) -> Option<String> {
        let msg = serde_json::json!([
            {"ticket": Uuid::new_v4().to_string()},
            {"type": "ticker", "codes": self.market_codes()},
            {"format": "DEFAULT"}
        ]);
        Some(msg.to_string())
    }

    fn decode(&self, frame: &str) -> Result<Vec<PriceSample>, DecodeError> {
        let frame: TickerFrame = serde_json::from_str(frame)?;

        if let Some(err) = frame.error {
            return Err(DecodeError::Venue(format!(
                "{}: {}",
                err.name.unwrap_or_default(),
                err.message.unwrap_or_default()
            )));
        }

        let (Some(code), Some(price)) = (frame.code, frame.trade_price) else {
            return Ok(vec![]);
        };

        let (quote, symbol) = Self::split_code(&code)?;
        if quote != self.quote {
            return Ok(vec![]);
        }
        if symbol != self.stable_symbol && !self.symbols.contains(&symbol) {
            return Ok(vec![]);
        }

        let price = DecodeError::check_price(&code, price)?;

        let timestamp = frame
            .timestamp
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(Utc::now);

        Ok(vec![PriceSample {
            venue: Venue::Domestic,
            symbol,
            price,
            timestamp,
            source: Exchange::Upbit,
        }])
    }
}
