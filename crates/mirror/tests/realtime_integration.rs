//! Realtime mirror integration tests
//!
//! Runs the mirror against a scripted venue served by tokio-tungstenite on a
//! local port: handshake, priming, streamed updates and connection shutdown.

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use realtime_mirror::{
    CloseReason, ConfigError, MirrorConfigFile, MirrorError, RealtimeMirror, Ticker, sign,
};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone)]
struct Handshake {
    path: String,
    query: String,
    headers: HashMap<String, String>,
}

enum Push {
    Frame(Value),
    Close,
}

struct Venue {
    addr: SocketAddr,
    handshake: Arc<Mutex<Option<Handshake>>>,
    commands: Arc<Mutex<Vec<Value>>>,
    push: mpsc::UnboundedSender<Push>,
}

impl Venue {
    fn endpoint(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    fn send(&self, frame: Value) {
        self.push.send(Push::Frame(frame)).unwrap();
    }

    fn close(&self) {
        self.push.send(Push::Close).unwrap();
    }

    fn handshake(&self) -> Handshake {
        self.handshake.lock().clone().expect("no handshake received")
    }
}

fn text(frame: Value) -> Message {
    Message::Text(frame.to_string().into())
}

fn partial(table: &str, keys: &[&str], data: Value) -> Value {
    json!({"table": table, "action": "partial", "keys": keys, "data": data})
}

/// Frames the venue answers a priming command with
fn priming_reply(command: &Value) -> Vec<Value> {
    match command["op"].as_str() {
        Some("getAccount") => vec![
            partial(
                "margin",
                &["account", "currency"],
                json!([{"account": 1, "currency": "XBt", "walletBalance": 100000}]),
            ),
            partial(
                "position",
                &["account", "symbol"],
                json!([{"account": 1, "symbol": "XBTUSD", "currentQty": 10}]),
            ),
            partial(
                "order",
                &["orderID"],
                json!([
                    {"orderID": "o1", "clOrdID": "bot-1", "leavesQty": 3, "price": 99.5},
                    {"orderID": "o2", "clOrdID": "bot-2", "leavesQty": 0, "price": 99.0},
                    {"orderID": "o3", "clOrdID": "other-1", "leavesQty": 5, "price": 98.0},
                ]),
            ),
        ],
        Some("getSymbol") => vec![
            partial(
                "quote",
                &[],
                json!([{"symbol": "XBTUSD", "bidPrice": 100.0, "askPrice": 100.5}]),
            ),
            partial(
                "orderBook25",
                &["symbol"],
                json!([{"symbol": "XBTUSD", "bids": [[100.0, 50]], "asks": [[100.5, 20]]}]),
            ),
            partial(
                "trade",
                &[],
                json!([{"symbol": "XBTUSD", "price": 100.37, "size": 1}]),
            ),
            partial(
                "instrument",
                &["symbol"],
                json!([{"symbol": "XBTUSD", "tickSize": 0.5}]),
            ),
        ],
        _ => Vec::new(),
    }
}

/// Start a venue that accepts one connection.
async fn start_venue(answer_priming: bool) -> Venue {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handshake = Arc::new(Mutex::new(None));
    let commands = Arc::new(Mutex::new(Vec::new()));
    let (push_tx, mut push_rx) = mpsc::unbounded_channel();

    let seen_handshake = Arc::clone(&handshake);
    let seen_commands = Arc::clone(&commands);
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();

        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let headers = req
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            *seen_handshake.lock() = Some(Handshake {
                path: req.uri().path().to_string(),
                query: req.uri().query().unwrap_or_default().to_string(),
                headers,
            });
            Ok(resp)
        };
        let mut ws = accept_hdr_async(stream, callback).await.unwrap();

        ws.send(text(json!({"info": "Welcome to the API."})))
            .await
            .unwrap();
        ws.send(text(json!({"success": true, "subscribe": "trade:XBTUSD"})))
            .await
            .unwrap();

        loop {
            tokio::select! {
                msg = ws.next() => match msg {
                    Some(Ok(Message::Text(body))) => {
                        let command: Value = serde_json::from_str(body.as_str()).unwrap();
                        seen_commands.lock().push(command.clone());
                        if answer_priming {
                            for frame in priming_reply(&command) {
                                ws.send(text(frame)).await.unwrap();
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                },
                push = push_rx.recv() => match push {
                    Some(Push::Frame(frame)) => ws.send(text(frame)).await.unwrap(),
                    Some(Push::Close) => {
                        let _ = ws.close(None).await;
                        break;
                    }
                    None => break,
                },
            }
        }
    });

    Venue {
        addr,
        handshake,
        commands,
        push: push_tx,
    }
}

async fn connect(config: &MirrorConfigFile) -> Result<RealtimeMirror, MirrorError> {
    tokio::time::timeout(Duration::from_secs(10), RealtimeMirror::connect(config))
        .await
        .expect("connect did not return")
}

async fn eventually(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ============================================================================
// Construction
// ============================================================================

#[tokio::test]
async fn test_connect_signs_and_subscribes() {
    let venue = start_venue(true).await;
    let config = MirrorConfigFile::new(venue.endpoint(), "XBTUSD").with_api_key("key", "secret");

    let mirror = connect(&config).await.unwrap();
    assert!(mirror.state().is_open());

    let handshake = venue.handshake();
    assert_eq!(handshake.path, "/realtime");
    assert_eq!(
        handshake.query,
        "subscribe=order:XBTUSD,execution:XBTUSD,position:XBTUSD,quote:XBTUSD,trade:XBTUSD,margin"
    );

    let nonce: i64 = handshake.headers["api-nonce"].parse().unwrap();
    assert_eq!(handshake.headers["api-key"], "key");
    assert_eq!(
        handshake.headers["api-signature"],
        sign("secret", "GET", "/realtime", nonce, "")
    );

    assert_eq!(
        *venue.commands.lock(),
        vec![
            json!({"op": "getAccount", "args": []}),
            json!({"op": "getSymbol", "args": "XBTUSD"}),
        ]
    );
}

#[tokio::test]
async fn test_connect_with_login() {
    let venue = start_venue(true).await;
    let config =
        MirrorConfigFile::new(venue.endpoint(), "XBTUSD").with_login("me@example.com", "pw");

    let _mirror = connect(&config).await.unwrap();

    let handshake = venue.handshake();
    assert_eq!(handshake.headers["email"], "me@example.com");
    assert_eq!(handshake.headers["password"], "pw");
    assert!(!handshake.headers.contains_key("api-signature"));
}

#[tokio::test]
async fn test_views_ready_after_connect() {
    let venue = start_venue(true).await;
    let config = MirrorConfigFile::new(venue.endpoint(), "XBTUSD").with_api_key("key", "secret");
    let mirror = connect(&config).await.unwrap();

    assert_eq!(mirror.get_instrument().unwrap()["tickLog"], json!(0));
    assert_eq!(
        mirror.get_ticker().unwrap(),
        Ticker {
            last: dec!(100),
            buy: dec!(100),
            sell: dec!(101),
            mid: dec!(100),
        }
    );
    assert_eq!(mirror.funds().unwrap()["walletBalance"], json!(100000));
    assert_eq!(mirror.market_depth().unwrap().len(), 1);
    assert_eq!(mirror.recent_trades().unwrap().len(), 1);

    let open = mirror.open_orders("bot").unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["orderID"], json!("o1"));
}

#[tokio::test]
async fn test_missing_credentials_fail_before_connecting() {
    let config = MirrorConfigFile::new("http://127.0.0.1:9/api/v1", "XBTUSD");
    let err = connect(&config).await.err().unwrap();
    assert!(matches!(
        err,
        MirrorError::Config(ConfigError::MissingCredentials)
    ));
}

#[tokio::test]
async fn test_connect_timeout() {
    // Accepts TCP but never answers the WebSocket handshake
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let config = MirrorConfigFile::new(format!("http://{}/api/v1", addr), "XBTUSD")
        .with_api_key("key", "secret")
        .with_connect_timeout(Duration::from_secs(1));

    let err = connect(&config).await.err().unwrap();
    assert!(matches!(err, MirrorError::ConnectTimeout(t) if t == Duration::from_secs(1)));
}

#[tokio::test]
async fn test_close_during_priming_is_reported() {
    let venue = start_venue(false).await;
    let config = MirrorConfigFile::new(venue.endpoint(), "XBTUSD").with_api_key("key", "secret");

    let pending = tokio::spawn(async move { connect(&config).await.err() });

    eventually(|| !venue.commands.lock().is_empty()).await;
    venue.close();

    let err = pending.await.unwrap().expect("connect should fail");
    assert!(matches!(
        err,
        MirrorError::ConnectionLost(CloseReason::RemoteClosed)
    ));
}

// ============================================================================
// Streaming
// ============================================================================

#[tokio::test]
async fn test_streamed_events_update_views() {
    let venue = start_venue(true).await;
    let config = MirrorConfigFile::new(venue.endpoint(), "XBTUSD").with_api_key("key", "secret");
    let mirror = connect(&config).await.unwrap();

    // Fully filled order leaves the table
    venue.send(json!({"table": "order", "action": "update",
                      "data": [{"orderID": "o1", "leavesQty": 0}]}));
    eventually(|| mirror.open_orders("bot").unwrap().is_empty()).await;
    assert_eq!(mirror.store().read(|s| s.table("order").unwrap().len()), 2);

    // New trade and quote drive the ticker
    venue.send(json!({"table": "trade", "action": "insert",
                      "data": [{"symbol": "XBTUSD", "price": 102.2, "size": 3}]}));
    venue.send(json!({"table": "quote", "action": "insert",
                      "data": [{"symbol": "XBTUSD", "bidPrice": 102.0, "askPrice": 103.0}]}));
    eventually(|| {
        mirror
            .get_ticker()
            .map(|t| t.sell == dec!(103))
            .unwrap_or(false)
    })
    .await;
    let ticker = mirror.get_ticker().unwrap();
    assert_eq!(ticker.last, dec!(102));
    assert_eq!(ticker.mid, dec!(103));
    assert_eq!(mirror.recent_trades().unwrap().len(), 2);

    // A bad message is dropped without killing the stream
    venue.send(json!({"table": "order", "action": "delete", "data": [{"orderID": "nope"}]}));
    venue.send(json!({"table": "order", "action": "delete", "data": [{"orderID": "o3"}]}));
    eventually(|| mirror.store().read(|s| s.table("order").unwrap().len()) == 1).await;
    assert!(mirror.state().is_open());
}

#[tokio::test]
async fn test_remote_close_is_observable() {
    let venue = start_venue(true).await;
    let config = MirrorConfigFile::new(venue.endpoint(), "XBTUSD").with_api_key("key", "secret");
    let mirror = connect(&config).await.unwrap();

    venue.close();

    let reason = tokio::time::timeout(Duration::from_secs(5), mirror.closed())
        .await
        .unwrap();
    assert_eq!(reason, CloseReason::RemoteClosed);
    assert!(mirror.state().is_closed());

    // The last image stays readable after the connection dies
    assert!(mirror.funds().is_ok());
}

#[tokio::test]
async fn test_exit_closes_quietly() {
    let venue = start_venue(true).await;
    let config = MirrorConfigFile::new(venue.endpoint(), "XBTUSD").with_api_key("key", "secret");
    let mirror = connect(&config).await.unwrap();

    mirror.exit().await;

    let reason = tokio::time::timeout(Duration::from_secs(5), mirror.closed())
        .await
        .unwrap();
    assert_eq!(reason, CloseReason::Exited);
}
