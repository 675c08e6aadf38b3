//! Alert threshold gate

use super::SpreadReading;
use crate::decimal::to_fixed;
use crate::feed::Symbol;
use crate::price::Legs;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Configuration for the alert gate
#[derive(Debug, Clone)]
pub struct AlertGateConfig {
    /// Minimum absolute spread that fires an alert
    pub threshold: Decimal,
    /// Minimum time between alerts for one symbol. `None` fires on every
    /// qualifying update.
    pub cooldown: Option<Duration>,
}

impl Default for AlertGateConfig {
    fn default() -> Self {
        Self {
            threshold: dec!(3.5),
            cooldown: None,
        }
    }
}

/// Per-symbol bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSpreadState {
    pub last_spread: Decimal,
    pub last_alert_at: Option<DateTime<Utc>>,
}

/// An alert that passed the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub symbol: Symbol,
    pub spread: Decimal,
    pub cross_rate: Decimal,
    pub legs: Legs,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Human-readable notification text
    pub fn message(&self) -> String {
        format!(
            "[{}] {} kimp alert: spread {} (cross rate {}, stable rate {}, domestic price {}, reference price {})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.symbol,
            to_fixed(self.spread, 2),
            to_fixed(self.cross_rate, 2),
            self.legs.stable_price,
            self.legs.domestic_price,
            self.legs.reference_price,
        )
    }
}

/// Gate decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDecision {
    Fire(Alert),
    Suppress,
}

/// Decides whether a spread reading warrants a notification
#[derive(Debug)]
pub struct AlertGate {
    config: AlertGateConfig,
    states: HashMap<Symbol, SymbolSpreadState>,
}

impl AlertGate {
    pub fn new(config: AlertGateConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Record `reading` and decide whether to alert
    pub fn consider(&mut self, reading: &SpreadReading, now: DateTime<Utc>) -> AlertDecision {
        let state = self
            .states
            .entry(reading.symbol.clone())
            .or_insert_with(|| SymbolSpreadState {
                last_spread: reading.spread,
                last_alert_at: None,
            });
        state.last_spread = reading.spread;

        if reading.spread.abs() < self.config.threshold {
            return AlertDecision::Suppress;
        }

        if let (Some(cooldown), Some(last)) = (self.config.cooldown, state.last_alert_at) {
            if now - last < cooldown {
                tracing::debug!(symbol = %reading.symbol, "Alert suppressed by cooldown");
                return AlertDecision::Suppress;
            }
        }

        state.last_alert_at = Some(now);
        AlertDecision::Fire(Alert {
            symbol: reading.symbol.clone(),
            spread: reading.spread,
            cross_rate: reading.cross_rate,
            legs: reading.legs,
            timestamp: now,
        })
    }

    /// Bookkeeping for `symbol`, once it has been evaluated
    pub fn state(&self, symbol: &Symbol) -> Option<&SymbolSpreadState> {
        self.states.get(symbol)
    }
}
