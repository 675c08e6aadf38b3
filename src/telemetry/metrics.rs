//! Prometheus metrics
//!
//! Recorded through the `metrics` facade; a no-op until an exporter is installed.

use crate::feed::{Exchange, Symbol};
use ::metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint on `0.0.0.0:port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// A frame was decoded into `samples` price samples
pub fn record_frame(exchange: Exchange, samples: usize) {
    counter!("kimp_frames_total", "exchange" => exchange.as_str()).increment(1);
    if samples > 0 {
        counter!("kimp_samples_total", "exchange" => exchange.as_str()).increment(samples as u64);
    }
}

/// A frame could not be decoded
pub fn record_decode_error(exchange: Exchange) {
    counter!("kimp_decode_errors_total", "exchange" => exchange.as_str()).increment(1);
}

/// A connector session ended and will be restarted
pub fn record_reconnect(exchange: Exchange) {
    counter!("kimp_reconnects_total", "exchange" => exchange.as_str()).increment(1);
}

/// Latest spread for a symbol
pub fn set_spread(symbol: &Symbol, spread: f64) {
    gauge!("kimp_spread", "symbol" => symbol.to_string()).set(spread);
}

/// An alert passed the gate
pub fn record_alert(symbol: &Symbol) {
    counter!("kimp_alerts_total", "symbol" => symbol.to_string()).increment(1);
}
