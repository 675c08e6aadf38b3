//! Integration tests for the decode -> price table -> spread -> alert path

use kimp_monitor::feed::{pump, BinanceDecoder, HyperliquidDecoder, Symbol, UpbitDecoder, Venue};
use kimp_monitor::notify::{FileNotifier, Notifier, NotifyError};
use kimp_monitor::price::PriceTable;
use kimp_monitor::spread::{AlertGate, AlertGateConfig, SpreadMonitor};
use kimp_monitor::ws::{WsError, WsMessage};
use parking_lot::Mutex;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
struct Recording(Mutex<Vec<String>>);

impl Notifier for Recording {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.0.lock().push(message.to_string());
        Ok(())
    }
}

fn monitor(notifier: Arc<dyn Notifier>, config: AlertGateConfig) -> SpreadMonitor {
    SpreadMonitor::new(
        PriceTable::new("USDT"),
        vec![Symbol::new("BTC")],
        AlertGate::new(config),
        notifier,
    )
}

/// Queue `frames` on a closed channel so the source ends after the last one
async fn replay(frames: &[String]) -> mpsc::Receiver<Result<WsMessage, WsError>> {
    let (tx, rx) = mpsc::channel(frames.len().max(1));
    for frame in frames {
        tx.send(Ok(WsMessage::Text(frame.clone()))).await.unwrap();
    }
    rx
}

fn binance(price: &str) -> String {
    format!(
        r#"{{"stream":"btcusdt@ticker","data":{{"E":1704067200000,"s":"BTCUSDT","c":"{}"}}}}"#,
        price
    )
}

fn upbit(code: &str, price: &str) -> String {
    format!(r#"{{"type":"ticker","code":"{}","trade_price":{}}}"#, code, price)
}

#[tokio::test]
async fn test_alert_fires_on_premium() {
    let notifier = Arc::new(Recording::default());
    let monitor = monitor(notifier.clone(), AlertGateConfig::default());
    let btc = vec![Symbol::new("BTC")];

    let mut rx = replay(&[binance("95000")]).await;
    pump_all(&mut rx, &BinanceDecoder::new(btc.clone(), "USDT"), &monitor).await;

    let frames = [upbit("KRW-USDT", "1450"), upbit("KRW-BTC", "138700000")];
    let mut rx = replay(&frames).await;
    pump_all(&mut rx, &UpbitDecoder::new(btc, "USDT", "KRW"), &monitor).await;

    let messages = notifier.0.lock().clone();
    assert_eq!(messages.len(), 1, "{messages:?}");
    assert!(messages[0].contains("BTC"));
    assert!(messages[0].contains("spread 10.00"));
    assert!(messages[0].contains("cross rate 1460.00"));
}

#[tokio::test]
async fn test_no_alert_at_parity() {
    let notifier = Arc::new(Recording::default());
    let monitor = monitor(notifier.clone(), AlertGateConfig::default());
    let btc = vec![Symbol::new("BTC")];

    let frames = [
        upbit("KRW-USDT", "1450"),
        upbit("KRW-BTC", "137750000"),
    ];
    let mut rx = replay(&frames).await;
    pump_all(&mut rx, &UpbitDecoder::new(btc.clone(), "USDT", "KRW"), &monitor).await;

    let mut rx = replay(&[binance("95000")]).await;
    pump_all(&mut rx, &BinanceDecoder::new(btc, "USDT"), &monitor).await;

    assert!(notifier.0.lock().is_empty());
    let legs = monitor.table().get_all_legs(&Symbol::new("BTC")).unwrap();
    assert_eq!(legs.domestic_price, dec!(137750000));
}

#[tokio::test]
async fn test_hyperliquid_overrides_reference_leg() {
    let notifier = Arc::new(Recording::default());
    let monitor = monitor(notifier.clone(), AlertGateConfig::default());
    let btc = vec![Symbol::new("BTC")];

    let frames = [upbit("KRW-USDT", "1450"), upbit("KRW-BTC", "137750000")];
    let mut rx = replay(&frames).await;
    pump_all(&mut rx, &UpbitDecoder::new(btc.clone(), "USDT", "KRW"), &monitor).await;

    let mut rx = replay(&[binance("95000")]).await;
    pump_all(&mut rx, &BinanceDecoder::new(btc.clone(), "USDT"), &monitor).await;
    assert!(notifier.0.lock().is_empty());

    // A cheaper reference quote from the second reference feed widens the spread
    let mut rx = replay(&[r#"{"channel":"allMids","data":{"mids":{"BTC":"94000"}}}"#.to_string()]).await;
    pump_all(&mut rx, &HyperliquidDecoder::new(btc), &monitor).await;

    assert_eq!(
        monitor.table().get(Venue::Reference, &Symbol::new("BTC")),
        Some(dec!(94000))
    );
    assert_eq!(notifier.0.lock().len(), 1);
}

#[tokio::test]
async fn test_alerts_written_to_file_with_cooldown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.log");
    let notifier = Arc::new(FileNotifier::open(&path).unwrap());
    let monitor = monitor(
        notifier,
        AlertGateConfig {
            threshold: dec!(3.5),
            cooldown: Some(chrono::Duration::minutes(10)),
        },
    );
    let btc = vec![Symbol::new("BTC")];

    let mut rx = replay(&[binance("95000")]).await;
    pump_all(&mut rx, &BinanceDecoder::new(btc.clone(), "USDT"), &monitor).await;

    let frames = [
        upbit("KRW-USDT", "1450"),
        upbit("KRW-BTC", "138700000"),
        upbit("KRW-BTC", "138800000"),
    ];
    let mut rx = replay(&frames).await;
    pump_all(&mut rx, &UpbitDecoder::new(btc, "USDT", "KRW"), &monitor).await;

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1, "{content}");
}

#[tokio::test]
async fn test_zero_domestic_price_does_not_alert() {
    let notifier = Arc::new(Recording::default());
    let monitor = monitor(notifier.clone(), AlertGateConfig::default());
    let btc = vec![Symbol::new("BTC")];

    let mut rx = replay(&[binance("95000")]).await;
    pump_all(&mut rx, &BinanceDecoder::new(btc.clone(), "USDT"), &monitor).await;

    let frames = [
        upbit("KRW-USDT", "1450"),
        upbit("KRW-BTC", "137750000"),
        upbit("KRW-BTC", "0"),
    ];
    let mut rx = replay(&frames).await;
    pump_all(&mut rx, &UpbitDecoder::new(btc, "USDT", "KRW"), &monitor).await;

    assert!(notifier.0.lock().is_empty(), "{:?}", notifier.0.lock());
    assert_eq!(
        monitor.table().get(Venue::Domestic, &Symbol::new("BTC")),
        Some(dec!(137750000))
    );
}

#[tokio::test]
async fn test_zero_stable_price_does_not_alert() {
    let notifier = Arc::new(Recording::default());
    let monitor = monitor(notifier.clone(), AlertGateConfig::default());
    let btc = vec![Symbol::new("BTC")];

    let frames = [
        upbit("KRW-USDT", "1450"),
        upbit("KRW-BTC", "137750000"),
        upbit("KRW-USDT", "0"),
    ];
    let mut rx = replay(&frames).await;
    pump_all(&mut rx, &UpbitDecoder::new(btc.clone(), "USDT", "KRW"), &monitor).await;

    let mut rx = replay(&[binance("95000"), binance("0")]).await;
    pump_all(&mut rx, &BinanceDecoder::new(btc, "USDT"), &monitor).await;

    assert!(notifier.0.lock().is_empty(), "{:?}", notifier.0.lock());
    let legs = monitor.table().get_all_legs(&Symbol::new("BTC")).unwrap();
    assert_eq!(legs.stable_price, dec!(1450));
    assert_eq!(legs.reference_price, dec!(95000));
}

async fn pump_all<D: kimp_monitor::feed::FrameDecoder>(
    rx: &mut mpsc::Receiver<Result<WsMessage, WsError>>,
    decoder: &D,
    monitor: &SpreadMonitor,
) {
    pump(rx, decoder, monitor).await.unwrap();
}
