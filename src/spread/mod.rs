//! Spread module
//!
//! Turns price updates into kimp readings and gated alerts:
//! - [`SpreadEvaluator`]: cross rate and spread from the price table
//! - [`AlertGate`]: threshold check with optional per-symbol cooldown
//! - [`SpreadMonitor`]: sample sink wiring the two to a notifier

mod evaluator;
mod gate;
mod monitor;

pub use evaluator::{compute, SpreadEvaluator};
pub use gate::{Alert, AlertDecision, AlertGate, AlertGateConfig, SymbolSpreadState};
pub use monitor::SpreadMonitor;

use crate::feed::Symbol;
use crate::price::Legs;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One spread computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadReading {
    pub symbol: Symbol,
    pub legs: Legs,
    /// Domestic price over reference price
    pub cross_rate: Decimal,
    /// Cross rate minus the domestic stable-asset price
    pub spread: Decimal,
    pub computed_at: DateTime<Utc>,
}
