//! Cross-rate spread evaluation

use super::SpreadReading;
use crate::feed::Symbol;
use crate::price::{Legs, PriceTable};
use chrono::{DateTime, Utc};

/// Computes the kimp spread for a symbol from the price table
#[derive(Debug, Clone)]
pub struct SpreadEvaluator {
    table: PriceTable,
}

impl SpreadEvaluator {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }

    /// Current spread for `symbol`, or `None` while a leg is missing
    pub fn evaluate(&self, symbol: &Symbol) -> Option<SpreadReading> {
        let legs = self.table.get_all_legs(symbol)?;
        compute(symbol, legs, Utc::now())
    }
}

/// `cross_rate = domestic / reference`, `spread = cross_rate - stable`.
///
/// Returns `None` unless every leg is strictly positive.
pub fn compute(symbol: &Symbol, legs: Legs, at: DateTime<Utc>) -> Option<SpreadReading> {
    if !legs.is_positive() {
        return None;
    }
    let cross_rate = legs.domestic_price.checked_div(legs.reference_price)?;
    let spread = cross_rate - legs.stable_price;

    Some(SpreadReading {
        symbol: symbol.clone(),
        legs,
        cross_rate,
        spread,
        computed_at: at,
    })
}
