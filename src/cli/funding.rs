//! Funding command implementation

use crate::config::FundingConfig;
use crate::funding::{render_summary, render_table, write_csv, FundingClient};
use chrono::{FixedOffset, Utc};
use clap::Args;
use std::path::PathBuf;

/// Trailing record counts to average
const SUMMARY_WINDOWS: [usize; 2] = [48, 24];

#[derive(Args, Debug)]
pub struct FundingArgs {
    /// Coin to query (e.g. HYPE)
    pub coin: String,

    /// Also write the records to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Override the lookback in hours
    #[arg(long)]
    pub hours: Option<u64>,
}

impl FundingArgs {
    pub async fn execute(&self, config: &FundingConfig) -> anyhow::Result<()> {
        let coin = self.coin.trim().to_uppercase();
        let mut config = config.clone();
        if let Some(hours) = self.hours {
            config.lookback_hours = hours;
        }

        let offset = config
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow::anyhow!("Invalid utc_offset_hours: {}", config.utc_offset_hours))?;

        let client = FundingClient::with_config(config)?;
        let records = client
            .fetch_history(&coin, Utc::now().timestamp_millis())
            .await;

        print!("{}", render_table(&coin, &records, offset));
        let summary = render_summary(&records, &SUMMARY_WINDOWS);
        if !summary.is_empty() {
            println!();
            print!("{}", summary);
        }

        if let Some(path) = &self.csv {
            if records.is_empty() {
                println!("No data to save.");
            } else {
                write_csv(path, &records)?;
                println!("Data saved to {}", path.display());
            }
        }

        println!("Crypto: {}", coin);
        Ok(())
    }
}
