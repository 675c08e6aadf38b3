//! Price update handling

use super::{AlertDecision, AlertGate, SpreadEvaluator, SpreadReading};
use crate::feed::{PriceSample, Symbol, Venue};
use crate::notify::Notifier;
use crate::price::{PriceTable, SampleSink};
use crate::telemetry;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;

/// Sample sink that stores each update and re-evaluates the affected spreads.
///
/// A domestic stable-asset update re-evaluates every tracked symbol; any
/// other update re-evaluates only its own symbol.
pub struct SpreadMonitor {
    table: PriceTable,
    evaluator: SpreadEvaluator,
    tracked: Vec<Symbol>,
    gate: Mutex<AlertGate>,
    notifier: Arc<dyn Notifier>,
}

impl SpreadMonitor {
    pub fn new(
        table: PriceTable,
        tracked: Vec<Symbol>,
        gate: AlertGate,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            evaluator: SpreadEvaluator::new(table.clone()),
            table,
            tracked,
            gate: Mutex::new(gate),
            notifier,
        }
    }

    pub fn table(&self) -> &PriceTable {
        &self.table
    }

    fn affected(&self, sample: &PriceSample) -> Vec<Symbol> {
        if sample.venue == Venue::Domestic && &sample.symbol == self.table.stable_symbol() {
            self.tracked.clone()
        } else if self.tracked.contains(&sample.symbol) {
            vec![sample.symbol.clone()]
        } else {
            Vec::new()
        }
    }

    /// Apply one sample and return the readings it produced
    pub fn on_sample(&self, sample: PriceSample) -> Vec<SpreadReading> {
        let affected = self.affected(&sample);
        self.table.set(sample);

        let mut readings = Vec::with_capacity(affected.len());
        for symbol in affected {
            let Some(reading) = self.evaluator.evaluate(&symbol) else {
                tracing::trace!(%symbol, "Spread not ready");
                continue;
            };
            self.handle_reading(&reading);
            readings.push(reading);
        }
        readings
    }

    fn handle_reading(&self, reading: &SpreadReading) {
        tracing::info!(
            symbol = %reading.symbol,
            spread = %reading.spread.round_dp(2),
            cross_rate = %reading.cross_rate.round_dp(2),
            stable = %reading.legs.stable_price,
            "Spread"
        );
        if let Some(spread) = reading.spread.to_f64() {
            telemetry::set_spread(&reading.symbol, spread);
        }

        let decision = self.gate.lock().consider(reading, Utc::now());
        if let AlertDecision::Fire(alert) = decision {
            telemetry::record_alert(&alert.symbol);
            let message = alert.message();
            tracing::warn!(symbol = %alert.symbol, spread = %alert.spread.round_dp(2), "Spread alert");
            if let Err(e) = self.notifier.notify(&message) {
                tracing::warn!(error = %e, "Alert notification failed");
            }
        }
    }
}

impl SampleSink for SpreadMonitor {
    fn record(&self, sample: PriceSample) {
        self.on_sample(sample);
    }
}
