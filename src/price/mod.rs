//! Price table module
//!
//! Holds the latest price per venue and symbol, shared by every feed

mod table;

pub use table::PriceTable;

use crate::feed::PriceSample;
use rust_decimal::Decimal;

/// The three observations needed to compute a spread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Legs {
    /// Symbol price on the reference venue (e.g. BTC/USDT)
    pub reference_price: Decimal,
    /// Symbol price on the domestic venue (e.g. BTC/KRW)
    pub domestic_price: Decimal,
    /// Stable asset price on the domestic venue (e.g. USDT/KRW)
    pub stable_price: Decimal,
}

impl Legs {
    /// Whether every leg holds a usable (strictly positive) price
    pub fn is_positive(&self) -> bool {
        [self.reference_price, self.domestic_price, self.stable_price]
            .iter()
            .all(|p| *p > Decimal::ZERO)
    }
}

/// Destination for decoded samples.
///
/// Implementations must not block: they run inline on the connector's task.
pub trait SampleSink: Send + Sync {
    fn record(&self, sample: PriceSample);
}
