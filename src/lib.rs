//! kimp-monitor: cross-exchange premium monitor
//!
//! This library provides the core components for:
//! - Real-time price feeds from Binance, Upbit and Hyperliquid
//! - A shared latest-price table keyed by venue and symbol
//! - Kimp spread evaluation against the domestic stable-asset rate
//! - Threshold alerting to console, file and Telegram
//! - Connector supervision with backoff restarts
//! - Hyperliquid funding-rate history
//! - Logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod decimal;
pub mod feed;
pub mod funding;
pub mod notify;
pub mod price;
pub mod spread;
pub mod supervisor;
pub mod telemetry;
pub mod ws;
