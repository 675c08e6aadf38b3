//! End-to-end integration tests

use futures_util::{SinkExt, StreamExt};
use kimp_monitor::cli::build_connectors;
use kimp_monitor::config::Config;
use kimp_monitor::notify::FileNotifier;
use kimp_monitor::price::PriceTable;
use kimp_monitor::spread::{AlertGate, AlertGateConfig, SpreadMonitor};
use kimp_monitor::supervisor::{ConnectorExit, RestartPolicy, Supervisor};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

#[test]
fn test_config_example_loads() {
    let config = Config::load("config.toml.example").unwrap();
    assert_eq!(config.monitor.tracked_symbols.len(), 1);
    assert_eq!(config.monitor.stable_symbol.as_str(), "USDT");
    assert_eq!(config.alert.threshold, dec!(3.5));
    assert!(config.alert.cooldown().is_none());
    assert!(config.feeds.binance.enabled);
    assert!(config.feeds.upbit.enabled);
    assert!(!config.feeds.hyperliquid.enabled);
    assert_eq!(config.funding.window_days, 30);
}

/// Serve `frames` to every client that connects, then keep the socket open
async fn spawn_venue(frames: Vec<String>, expect_subscription: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let frames = frames.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                if expect_subscription && ws.next().await.is_none() {
                    return;
                }
                for frame in frames {
                    if ws.send(Message::Text(frame)).await.is_err() {
                        return;
                    }
                }
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    url
}

#[tokio::test]
async fn test_monitor_alerts_from_live_sessions() {
    let binance = spawn_venue(
        vec![r#"{"stream":"btcusdt@ticker","data":{"E":1704067200000,"s":"BTCUSDT","c":"95000"}}"#
            .to_string()],
        false,
    )
    .await;
    let upbit = spawn_venue(
        vec![
            r#"{"type":"ticker","code":"KRW-USDT","trade_price":1450}"#.to_string(),
            r#"{"type":"ticker","code":"KRW-BTC","trade_price":138700000}"#.to_string(),
        ],
        true,
    )
    .await;

    let mut config = Config::default();
    config.feeds.binance.url = Some(binance);
    config.feeds.upbit.url = Some(upbit);
    let connectors = build_connectors(&config);
    assert_eq!(connectors.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("alerts.log");
    let monitor = Arc::new(SpreadMonitor::new(
        PriceTable::new("USDT"),
        config.monitor.tracked_symbols.clone(),
        AlertGate::new(AlertGateConfig::default()),
        Arc::new(FileNotifier::open(&log_path).unwrap()),
    ));

    let supervisor = connectors.into_iter().fold(
        Supervisor::new(monitor.clone(), RestartPolicy::default()),
        Supervisor::with_connector,
    );
    let shutdown = supervisor.shutdown_token();
    let handle = tokio::spawn(supervisor.run());

    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let content = std::fs::read_to_string(&log_path).unwrap_or_default();
            if content.ends_with('\n') {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("no alert written");

    let alert = std::fs::read_to_string(&log_path).unwrap();
    assert!(alert.contains("BTC kimp alert: spread 10.00"), "{alert}");
    assert_eq!(monitor.table().len(), 3);

    shutdown.cancel();
    let exits = handle.await.unwrap();
    assert_eq!(exits.len(), 2);
    assert!(exits
        .iter()
        .all(|(_, exit)| *exit == ConnectorExit::Cancelled));
}
