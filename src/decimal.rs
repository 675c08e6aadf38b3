//! Decimal display helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Render `value` with exactly `dp` fractional digits, rounding half away from zero
pub fn to_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}
