//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ws::WsError;

/// Logical market role a price belongs to.
///
/// Several exchanges may feed the same venue (Binance and Hyperliquid both
/// write the reference leg); the last writer wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    /// Global reference market, priced in the reference quote (e.g. USDT)
    Reference,
    /// Domestic market, priced in local currency (e.g. KRW)
    Domestic,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Reference => write!(f, "reference"),
            Venue::Domestic => write!(f, "domestic"),
        }
    }
}

/// Concrete exchange a sample was observed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Upbit,
    Hyperliquid,
}

impl Exchange {
    /// Static label used for logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Upbit => "upbit",
            Exchange::Hyperliquid => "hyperliquid",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base asset symbol, normalized to upper case (e.g. "BTC", "USDT")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite price table key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub venue: Venue,
    pub symbol: Symbol,
}

impl PriceKey {
    pub fn new(venue: Venue, symbol: impl Into<Symbol>) -> Self {
        Self {
            venue,
            symbol: symbol.into(),
        }
    }
}

/// A single decoded price observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Logical venue this price counts for
    pub venue: Venue,
    /// Base asset
    pub symbol: Symbol,
    /// Last / mid price in the venue's quote currency
    pub price: Decimal,
    /// Observation time (exchange time when the frame carries one)
    pub timestamp: DateTime<Utc>,
    /// Exchange that produced the sample
    pub source: Exchange,
}

impl PriceSample {
    pub fn key(&self) -> PriceKey {
        PriceKey::new(self.venue, self.symbol.clone())
    }
}

/// Errors produced while decoding a single frame.
///
/// None of these end a connection; the frame is skipped.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not valid UTF-8")]
    Utf8,
    #[error("invalid price {value:?} for {symbol}")]
    InvalidPrice { symbol: String, value: String },
    #[error("invalid market code: {0}")]
    InvalidMarketCode(String),
    #[error("venue reported error: {0}")]
    Venue(String),
}

/// Connector-level errors, all of which end the current session
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Could not establish the websocket session
    #[error("connect failed: {0}")]
    Connect(#[source] WsError),
    /// Session dropped after it was established
    #[error("transport error: {0}")]
    Transport(#[source] WsError),
}

impl DecodeError {
    /// Parse a quoted price, rejecting anything that is not strictly positive
    pub fn parse_price(symbol: &str, raw: &str) -> Result<Decimal, DecodeError> {
        let price: Decimal = raw.trim().parse().map_err(|_| DecodeError::InvalidPrice {
            symbol: symbol.to_string(),
            value: raw.to_string(),
        })?;
        Self::check_price(symbol, price)
    }

    /// Reject zero and negative prices
    pub fn check_price(symbol: &str, price: Decimal) -> Result<Decimal, DecodeError> {
        if price <= Decimal::ZERO {
            return Err(DecodeError::InvalidPrice {
                symbol: symbol.to_string(),
                value: price.to_string(),
            });
        }
        Ok(price)
    }
}

impl FeedError {
    /// Whether the session had been established before failing
    pub fn was_connected(&self) -> bool {
        matches!(self, FeedError::Transport(_))
    }
}
