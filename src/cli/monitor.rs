//! Monitor command implementation

use crate::config::Config;
use crate::feed::{
    BinanceDecoder, FeedConnector, HyperliquidDecoder, Symbol, UpbitDecoder, VenueConnector,
};
use crate::notify::NotifierSet;
use crate::price::PriceTable;
use crate::spread::{AlertGate, AlertGateConfig, SpreadMonitor};
use crate::supervisor::{ConnectorExit, RestartPolicy, Supervisor};
use crate::ws::WsConfig;
use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Override the alert threshold
    #[arg(long)]
    pub threshold: Option<Decimal>,

    /// Comma-separated symbols to track instead of the configured ones
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,
}

impl MonitorArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut config = config.clone();
        if !self.symbols.is_empty() {
            config.monitor.tracked_symbols = self.symbols.iter().map(Symbol::new).collect();
        }
        if let Some(threshold) = self.threshold {
            config.alert.threshold = threshold;
        }
        config.validate()?;

        let tracked = config.monitor.tracked_symbols.clone();
        let table = PriceTable::new(config.monitor.stable_symbol.clone());
        let notifier = NotifierSet::from_config(&config.alert.notify)?;
        let gate = AlertGate::new(AlertGateConfig {
            threshold: config.alert.threshold,
            cooldown: config.alert.cooldown(),
        });
        let monitor = Arc::new(SpreadMonitor::new(
            table,
            tracked.clone(),
            gate,
            Arc::new(notifier),
        ));

        let connectors = build_connectors(&config);
        if connectors.is_empty() {
            anyhow::bail!("No feeds enabled");
        }

        let supervisor = connectors.into_iter().fold(
            Supervisor::new(monitor, RestartPolicy::from(&config.supervisor)),
            Supervisor::with_connector,
        );
        let shutdown = supervisor.shutdown_token();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown requested");
                    shutdown.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "Could not listen for Ctrl-C"),
            }
        });

        tracing::info!(
            symbols = ?tracked.iter().map(Symbol::as_str).collect::<Vec<_>>(),
            threshold = %config.alert.threshold,
            feeds = supervisor.len(),
            "Monitor started"
        );

        let exits = supervisor.run().await;
        if exits
            .iter()
            .all(|(_, exit)| matches!(exit, ConnectorExit::GaveUp { .. }))
        {
            anyhow::bail!("All feeds gave up");
        }

        tracing::info!("Monitor stopped");
        Ok(())
    }
}

/// One connector per enabled feed
pub fn build_connectors(config: &Config) -> Vec<Arc<dyn FeedConnector>> {
    let tracked = &config.monitor.tracked_symbols;
    let feeds = &config.feeds;
    let mut connectors: Vec<Arc<dyn FeedConnector>> = Vec::new();

    if feeds.binance.enabled {
        let decoder = BinanceDecoder::new(tracked.clone(), &config.monitor.reference_quote);
        let ws = WsConfig::new(decoder.stream_url(feeds.binance_url()))
            .ping_interval(feeds.binance.ping_interval());
        connectors.push(Arc::new(VenueConnector::new(decoder, ws)));
    }

    if feeds.upbit.enabled {
        let decoder = UpbitDecoder::new(
            tracked.clone(),
            config.monitor.stable_symbol.clone(),
            &config.monitor.domestic_quote,
        );
        let ws = WsConfig::new(feeds.upbit_url()).ping_interval(feeds.upbit.ping_interval());
        connectors.push(Arc::new(VenueConnector::new(decoder, ws)));
    }

    if feeds.hyperliquid.enabled {
        if feeds.binance.enabled {
            tracing::info!("Binance and Hyperliquid both feed the reference leg; latest update wins");
        }
        let decoder = HyperliquidDecoder::new(tracked.clone());
        let ws = WsConfig::new(feeds.hyperliquid_url())
            .ping_interval(feeds.hyperliquid.ping_interval());
        connectors.push(Arc::new(VenueConnector::new(decoder, ws)));
    }

    connectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Exchange;

    #[test]
    fn test_build_connectors_default() {
        let connectors = build_connectors(&Config::default());
        let exchanges: Vec<_> = connectors.iter().map(|c| c.exchange()).collect();
        assert_eq!(exchanges, vec![Exchange::Binance, Exchange::Upbit]);
    }

    #[test]
    fn test_build_connectors_all() {
        let mut config = Config::default();
        config.feeds.hyperliquid.enabled = true;
        config.feeds.upbit.enabled = false;
        let exchanges: Vec<_> = build_connectors(&config)
            .iter()
            .map(|c| c.exchange())
            .collect();
        assert_eq!(exchanges, vec![Exchange::Binance, Exchange::Hyperliquid]);
    }

    #[tokio::test]
    async fn test_no_feeds_enabled() {
        let mut config = Config::default();
        config.feeds.binance.enabled = false;
        config.feeds.upbit.enabled = false;
        config.alert.notify.console = false;

        let args = MonitorArgs {
            threshold: None,
            symbols: vec![],
        };
        let err = args.execute(&config).await.unwrap_err();
        assert!(err.to_string().contains("No feeds enabled"));
    }
}
