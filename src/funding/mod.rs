//! Funding-rate history
//!
//! Fetches hourly perp funding rates from the Hyperliquid info endpoint in
//! fixed-width time windows and summarizes them as APR.

mod client;
mod report;

pub use client::FundingClient;
pub use report::{render_summary, render_table, write_csv};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Funding periods per year (hourly funding)
const PERIODS_PER_YEAR: i64 = 24 * 365;

/// One funding payment as returned by the `fundingHistory` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRecord {
    pub coin: String,
    pub funding_rate: Decimal,
    #[serde(default)]
    pub premium: Option<Decimal>,
    /// Milliseconds since the epoch
    pub time: i64,
}

impl FundingRecord {
    /// Funding rate in percent
    pub fn rate_pct(&self) -> Decimal {
        self.funding_rate * Decimal::ONE_HUNDRED
    }

    /// Annualized funding rate in percent
    pub fn apr_pct(&self) -> Decimal {
        self.rate_pct() * Decimal::from(PERIODS_PER_YEAR)
    }
}

/// Split `[start_ms, end_ms]` into windows of at most `window_ms`.
///
/// Each window starts 1 ms after the previous one ends.
pub fn time_windows(start_ms: i64, end_ms: i64, window_ms: i64) -> Vec<(i64, i64)> {
    let mut windows = Vec::new();
    if window_ms <= 0 {
        return windows;
    }

    let mut start = start_ms;
    while start < end_ms {
        let end = start.saturating_add(window_ms).min(end_ms);
        windows.push((start, end));
        start = end + 1;
    }
    windows
}

/// Drop records with a duplicate `time` (the later one wins) and sort ascending
pub fn dedupe_and_sort(records: Vec<FundingRecord>) -> Vec<FundingRecord> {
    records
        .into_iter()
        .map(|r| (r.time, r))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect()
}

/// Mean APR (percent) over the last `n` records, `None` when there are none
pub fn average_apr(records: &[FundingRecord], n: usize) -> Option<Decimal> {
    let tail = &records[records.len().saturating_sub(n)..];
    if tail.is_empty() {
        return None;
    }
    let sum: Decimal = tail.iter().map(|r| r.funding_rate).sum();
    let mean = sum / Decimal::from(tail.len());
    Some(mean * Decimal::ONE_HUNDRED * Decimal::from(PERIODS_PER_YEAR))
}
