//! CLI interface for kimp-monitor
//!
//! Provides subcommands for:
//! - `monitor`: Stream prices and alert on spread breaches
//! - `funding`: Print funding-rate history for a coin
//! - `config`: Show the effective configuration

mod funding;
mod monitor;

pub use funding::FundingArgs;
pub use monitor::{build_connectors, MonitorArgs};

use crate::config::Config;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kimp")]
#[command(about = "Cross-exchange premium monitor and funding-rate tooling")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream prices and alert on spread breaches
    Monitor(MonitorArgs),
    /// Print funding-rate history for a coin
    Funding(FundingArgs),
    /// Show the effective configuration
    Config,
}

/// Human-readable summary of the effective configuration
pub fn describe_config(config: &Config) -> String {
    let tracked: Vec<_> = config
        .monitor
        .tracked_symbols
        .iter()
        .map(|s| s.as_str())
        .collect();
    let feed = |name: &str, enabled: bool, url: &str| {
        format!(
            "  {:<12} {} {}",
            name,
            if enabled { "on " } else { "off" },
            url
        )
    };

    [
        "Current configuration:".to_string(),
        format!(
            "  Tracking: {} (stable {}, {}/{})",
            tracked.join(", "),
            config.monitor.stable_symbol,
            config.monitor.reference_quote,
            config.monitor.domestic_quote
        ),
        format!(
            "  Alert: threshold={}, cooldown={}",
            config.alert.threshold,
            config
                .alert
                .cooldown_secs
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "off".to_string())
        ),
        "  Feeds:".to_string(),
        feed("binance", config.feeds.binance.enabled, config.feeds.binance_url()),
        feed("upbit", config.feeds.upbit.enabled, config.feeds.upbit_url()),
        feed(
            "hyperliquid",
            config.feeds.hyperliquid.enabled,
            config.feeds.hyperliquid_url(),
        ),
        format!(
            "  Supervisor: backoff {}-{}ms, max_attempts={}, stable_session={}ms",
            config.supervisor.initial_delay_ms,
            config.supervisor.max_delay_ms,
            config.supervisor.max_attempts,
            config.supervisor.stable_session_ms
        ),
    ]
    .join("\n")
}
