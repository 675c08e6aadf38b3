//! Configuration types for kimp-monitor

use crate::feed::{Symbol, BINANCE_WS_URL, HYPERLIQUID_WS_URL, UPBIT_WS_URL};
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Bundled example configuration, used when no config file is found
pub const DEFAULT_CONFIG: &str = include_str!("../config.toml.example");

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub alert: AlertConfig,
    pub feeds: FeedsConfig,
    pub supervisor: SupervisorConfig,
    pub telemetry: TelemetryConfig,
    pub funding: FundingConfig,
}

/// What to track and how markets are quoted
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Base assets to compute spreads for
    pub tracked_symbols: Vec<Symbol>,
    /// Stable asset whose domestic price is the benchmark rate
    pub stable_symbol: Symbol,
    /// Quote currency on the reference venue
    pub reference_quote: String,
    /// Quote currency on the domestic venue
    pub domestic_quote: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tracked_symbols: vec![Symbol::new("BTC")],
            stable_symbol: Symbol::new("USDT"),
            reference_quote: "USDT".to_string(),
            domestic_quote: "KRW".to_string(),
        }
    }
}

/// Alert gate configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Minimum absolute spread that fires an alert
    #[serde(default = "default_threshold")]
    pub threshold: Decimal,

    /// Per-symbol cooldown; unset alerts on every qualifying update
    #[serde(default)]
    pub cooldown_secs: Option<u64>,

    #[serde(default)]
    pub notify: NotifyConfig,
}

fn default_threshold() -> Decimal {
    Decimal::new(35, 1) // 3.5
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            cooldown_secs: None,
            notify: NotifyConfig::default(),
        }
    }
}

impl AlertConfig {
    pub fn cooldown(&self) -> Option<chrono::Duration> {
        self.cooldown_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }
}

/// Alert delivery targets. The Telegram token comes from the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub console: bool,
    pub log_file: Option<PathBuf>,
    pub telegram: bool,
    pub telegram_chat_id: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            console: true,
            log_file: None,
            telegram: false,
            telegram_chat_id: None,
        }
    }
}

/// Per-exchange feed settings
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "FeedConfig::enabled")]
    pub binance: FeedConfig,
    #[serde(default = "FeedConfig::enabled")]
    pub upbit: FeedConfig,
    #[serde(default = "FeedConfig::disabled")]
    pub hyperliquid: FeedConfig,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            binance: FeedConfig::enabled(),
            upbit: FeedConfig::enabled(),
            hyperliquid: FeedConfig::disabled(),
        }
    }
}

impl FeedsConfig {
    pub fn binance_url(&self) -> &str {
        self.binance.url.as_deref().unwrap_or(BINANCE_WS_URL)
    }

    pub fn upbit_url(&self) -> &str {
        self.upbit.url.as_deref().unwrap_or(UPBIT_WS_URL)
    }

    pub fn hyperliquid_url(&self) -> &str {
        self.hyperliquid.url.as_deref().unwrap_or(HYPERLIQUID_WS_URL)
    }
}

/// Single feed settings
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Endpoint override; the exchange's public endpoint when unset
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_ping_interval_secs() -> u64 {
    30
}

impl FeedConfig {
    fn enabled() -> Self {
        Self {
            enabled: true,
            url: None,
            ping_interval_secs: default_ping_interval_secs(),
        }
    }

    fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::enabled()
        }
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs.max(1))
    }
}

/// Connector restart policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Consecutive failed connects before a connector gives up; 0 retries forever
    pub max_attempts: u32,
    /// A session must last this long before the backoff resets
    pub stable_session_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
            max_attempts: 10,
            stable_session_ms: 30_000,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

/// Funding-rate history command configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FundingConfig {
    pub api_url: String,
    /// Width of each request window
    pub window_days: u64,
    /// How far back to fetch
    pub lookback_hours: u64,
    /// Pause between window requests
    pub request_delay_ms: u64,
    /// Offset used when printing timestamps
    pub utc_offset_hours: i32,
    pub timeout_secs: u64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.hyperliquid.xyz/info".to_string(),
            window_days: 30,
            lookback_hours: 52,
            request_delay_ms: 500,
            utc_offset_hours: 9,
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The bundled example configuration
    pub fn bundled() -> anyhow::Result<Self> {
        let config: Config = toml::from_str(DEFAULT_CONFIG)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the monitor cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.monitor.tracked_symbols.is_empty() {
            anyhow::bail!("monitor.tracked_symbols must not be empty");
        }
        if self
            .monitor
            .tracked_symbols
            .contains(&self.monitor.stable_symbol)
        {
            anyhow::bail!(
                "stable symbol {} cannot also be tracked",
                self.monitor.stable_symbol
            );
        }
        if self.alert.threshold.is_sign_negative() {
            anyhow::bail!("alert.threshold must not be negative");
        }
        if self.supervisor.initial_delay_ms > self.supervisor.max_delay_ms {
            anyhow::bail!("supervisor.initial_delay_ms exceeds max_delay_ms");
        }
        if self.funding.window_days == 0 {
            anyhow::bail!("funding.window_days must be positive");
        }
        Ok(())
    }
}
