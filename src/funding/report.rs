//! Funding history output

use super::{average_apr, FundingRecord};
use crate::decimal::to_fixed;
use chrono::{FixedOffset, TimeZone, Utc};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const RULE_WIDTH: usize = 60;

fn offset_label(offset: &FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    if secs % 3600 == 0 {
        format!("UTC{:+}", secs / 3600)
    } else {
        format!("UTC{}", offset)
    }
}

/// Per-record table with timestamps shown in `offset`
pub fn render_table(coin: &str, records: &[FundingRecord], offset: FixedOffset) -> String {
    if records.is_empty() {
        return "No funding rates found for the specified time range.\n".to_string();
    }

    let label = offset_label(&offset);
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "Historical Funding Rates for {}-USD:", coin);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{:<30} {:<20} {:<20}", "Timestamp", "Funding Rate (%)", "APR (%)");
    let _ = writeln!(out, "{}", rule);

    for record in records {
        let timestamp = match Utc.timestamp_millis_opt(record.time).single() {
            Some(t) => format!(
                "{} {}",
                t.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S"),
                label
            ),
            None => "Invalid Timestamp".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<30} {:<20} {:<20}",
            timestamp,
            to_fixed(record.rate_pct(), 4),
            to_fixed(record.apr_pct(), 4),
        );
    }

    out
}

/// APR averages over the trailing windows in `windows`; empty when there are no records
pub fn render_summary(records: &[FundingRecord], windows: &[usize]) -> String {
    let mut out = String::new();
    for &n in windows {
        if let Some(apr) = average_apr(records, n) {
            let _ = writeln!(
                out,
                "Average of the last {} funding rates: {}%",
                n,
                to_fixed(apr, 1)
            );
        }
    }
    out
}

/// Write records as CSV with the API's field names
pub fn write_csv(path: impl AsRef<Path>, records: &[FundingRecord]) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "coin,fundingRate,premium,time")?;
    for r in records {
        let premium = r.premium.map(|p| p.to_string()).unwrap_or_default();
        writeln!(w, "{},{},{},{}", r.coin, r.funding_rate, premium, r.time)?;
    }
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn records() -> Vec<FundingRecord> {
        vec![
            FundingRecord {
                coin: "HYPE".to_string(),
                funding_rate: dec!(0.0000126),
                premium: Some(dec!(-0.0003)),
                // 2024-01-01 00:00:00 UTC
                time: 1_704_067_200_000,
            },
            FundingRecord {
                coin: "HYPE".to_string(),
                funding_rate: dec!(0.0001),
                premium: None,
                time: 1_704_070_800_000,
            },
        ]
    }

    #[test]
    fn test_render_table() {
        let table = render_table("HYPE", &records(), kst());
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines[0], "Historical Funding Rates for HYPE-USD:");
        assert!(lines[2].starts_with("Timestamp"));
        assert!(lines[4].starts_with("2024-01-01 09:00:00 UTC+9"), "{}", lines[4]);
        assert!(lines[4].contains("0.0013"), "{}", lines[4]);
        assert!(lines[4].contains("11.0376"), "{}", lines[4]);
        assert!(lines[5].starts_with("2024-01-01 10:00:00 UTC+9"));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_render_table_empty() {
        assert!(render_table("HYPE", &[], kst()).starts_with("No funding rates"));
    }

    #[test]
    fn test_render_summary() {
        let summary = render_summary(&records(), &[48, 24]);
        // mean rate 0.0000563 -> 49.3188% APR
        assert_eq!(
            summary,
            "Average of the last 48 funding rates: 49.3%\n\
             Average of the last 24 funding rates: 49.3%\n"
        );
        assert!(render_summary(&[], &[48, 24]).is_empty());
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funding.csv");
        write_csv(&path, &records()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "coin,fundingRate,premium,time\n\
             HYPE,0.0000126,-0.0003,1704067200000\n\
             HYPE,0.0001,,1704070800000\n"
        );
    }
}
