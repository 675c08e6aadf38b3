//! Shared latest-price table

use super::{Legs, SampleSink};
use crate::feed::{PriceKey, PriceSample, Symbol, Venue};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// Latest observed price per `(venue, symbol)`.
///
/// Cloning yields another handle to the same table. Every operation holds
/// the lock only for a single map access, so writers never wait on I/O.
#[derive(Debug, Clone)]
pub struct PriceTable {
    stable_symbol: Symbol,
    entries: Arc<RwLock<HashMap<PriceKey, PriceSample>>>,
}

impl PriceTable {
    /// Create an empty table. `stable_symbol` is the domestic asset used as
    /// the fiat benchmark leg (e.g. USDT on a KRW market).
    pub fn new(stable_symbol: impl Into<Symbol>) -> Self {
        Self {
            stable_symbol: stable_symbol.into(),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn stable_symbol(&self) -> &Symbol {
        &self.stable_symbol
    }

    /// Overwrite the entry for the sample's key
    pub fn set(&self, sample: PriceSample) {
        self.entries.write().insert(sample.key(), sample);
    }

    /// Latest price for a key
    pub fn get(&self, venue: Venue, symbol: &Symbol) -> Option<Decimal> {
        self.sample(venue, symbol).map(|s| s.price)
    }

    /// Latest full sample for a key
    pub fn sample(&self, venue: Venue, symbol: &Symbol) -> Option<PriceSample> {
        let key = PriceKey::new(venue, symbol.clone());
        self.entries.read().get(&key).cloned()
    }

    /// All three legs for `symbol`, or `None` while any is missing.
    ///
    /// Legs are read one at a time; they may come from slightly different
    /// instants.
    pub fn get_all_legs(&self, symbol: &Symbol) -> Option<Legs> {
        let reference_price = self.get(Venue::Reference, symbol)?;
        let domestic_price = self.get(Venue::Domestic, symbol)?;
        let stable_price = self.get(Venue::Domestic, &self.stable_symbol)?;
        Some(Legs {
            reference_price,
            domestic_price,
            stable_price,
        })
    }

    /// Number of populated keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of every entry
    pub fn snapshot(&self) -> Vec<PriceSample> {
        self.entries.read().values().cloned().collect()
    }
}

impl SampleSink for PriceTable {
    fn record(&self, sample: PriceSample) {
        self.set(sample);
    }
}
