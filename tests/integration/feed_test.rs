//! Integration tests for feed connectors against a local websocket server

use futures_util::{SinkExt, StreamExt};
use kimp_monitor::feed::{
    BinanceDecoder, FeedConnector, FeedError, Symbol, UpbitDecoder, Venue, VenueConnector,
};
use kimp_monitor::price::PriceTable;
use kimp_monitor::ws::WsConfig;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Accept one client, optionally read its subscription, send `frames`, then close
async fn serve_once(
    frames: Vec<Message>,
    expect_subscription: bool,
) -> (String, tokio::task::JoinHandle<Option<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let subscription = if expect_subscription {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => Some(text),
                other => panic!("expected subscription, got {:?}", other),
            }
        } else {
            None
        };

        for frame in frames {
            ws.send(frame).await.unwrap();
        }
        ws.close(None).await.unwrap();
        subscription
    });

    (url, handle)
}

fn btc() -> Vec<Symbol> {
    vec![Symbol::new("BTC")]
}

#[tokio::test]
async fn test_upbit_session_populates_table() {
    let frames = vec![
        Message::Binary(br#"{"type":"ticker","code":"KRW-BTC","trade_price":138700000}"#.to_vec()),
        Message::Text("not json".to_string()),
        Message::Binary(br#"{"type":"ticker","code":"KRW-USDT","trade_price":1450}"#.to_vec()),
    ];
    let (url, server) = serve_once(frames, true).await;

    let table = PriceTable::new("USDT");
    let connector = VenueConnector::new(UpbitDecoder::new(btc(), "USDT", "KRW"), WsConfig::new(url));
    connector.run(Arc::new(table.clone())).await.unwrap();

    let subscription = server.await.unwrap().unwrap();
    let sub: serde_json::Value = serde_json::from_str(&subscription).unwrap();
    assert_eq!(sub[1]["type"], "ticker");
    assert_eq!(
        sub[1]["codes"],
        serde_json::json!(["KRW-BTC", "KRW-USDT"])
    );

    assert_eq!(
        table.get(Venue::Domestic, &Symbol::new("BTC")),
        Some(dec!(138700000))
    );
    assert_eq!(
        table.get(Venue::Domestic, &Symbol::new("USDT")),
        Some(dec!(1450))
    );
}

#[tokio::test]
async fn test_binance_combined_stream() {
    let frames = vec![Message::Text(
        r#"{"stream":"btcusdt@ticker","data":{"e":"24hrTicker","E":1704067200000,"s":"BTCUSDT","c":"95000.00"}}"#
            .to_string(),
    )];
    let (base, server) = serve_once(frames, false).await;

    let decoder = BinanceDecoder::new(btc(), "USDT");
    let url = decoder.stream_url(&base);
    assert!(url.ends_with("/stream?streams=btcusdt@ticker"));

    let table = PriceTable::new("USDT");
    let connector = VenueConnector::new(decoder, WsConfig::new(url));
    connector.run(Arc::new(table.clone())).await.unwrap();
    assert!(server.await.unwrap().is_none());

    let sample = table.sample(Venue::Reference, &Symbol::new("BTC")).unwrap();
    assert_eq!(sample.price, dec!(95000));
    assert_eq!(sample.timestamp.timestamp_millis(), 1_704_067_200_000);
}

#[tokio::test]
async fn test_connect_refused() {
    let connector = VenueConnector::new(
        UpbitDecoder::new(btc(), "USDT", "KRW"),
        WsConfig::new("ws://127.0.0.1:1"),
    );
    let err = connector
        .run(Arc::new(PriceTable::new("USDT")))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Connect(_)));
    assert!(!err.was_connected());
}
