//! Realtime Mirror
//!
//! Keeps an in-process replica of a venue's account and market tables
//! (instrument, order book, quotes, trades, margin, positions, open orders)
//! by folding the venue's `partial` / `insert` / `update` / `delete` stream
//! into local tables, so a strategy can read fresh snapshots without polling
//! the REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Venue                              │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │ WebSocket (signed handshake)
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │ Infrastructure                                            │
//! │  RealtimeWsClient ── reader task ──┐    writer task ◄──┐  │
//! └────────────────────────────────────┼───────────────────┼──┘
//!                                      ▼                   │
//! ┌────────────────────────────────────────────────────────┼─┐
//! │ Application                                            │  │
//! │  SharedTableStore  (event_applier, one write lock/msg) │  │
//! │        │                                               │  │
//! │        ├──► ReadinessGate (getAccount / getSymbol) ────┘  │
//! │        └──► query views (ticker, funds, depth, orders)    │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       RealtimeMirror
//! ```
//!
//! # Example
//!
//! ```no_run
//! use realtime_mirror::{MirrorConfigFile, RealtimeMirror};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MirrorConfigFile::new("https://testnet.bitmex.com/api/v1", "XBTUSD")
//!     .with_api_key("KEY", "SECRET");
//! let mirror = RealtimeMirror::connect(&config).await?;
//! println!("{:?}", mirror.get_ticker()?);
//! mirror.exit().await;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod mirror;

// Config layer
pub use config::{
    ConfigError, MirrorConfigFile, load_config, load_config_from_str, load_default_config,
};

// Domain layer
pub use domain::{
    Action, CloseReason, Command, CommandError, CommandSink, ConnectionState, InboundMessage,
    Row, TableStore,
};

// Application layer
pub use application::{
    ApplyError, ApplyOutcome, QueryError, ReadinessGate, SharedTableStore, Ticker,
};

// Infrastructure layer
pub use infrastructure::{
    ApiCredentials, CommandSender, Credentials, RealtimeWsClient, SubscriptionError, WsConnection,
    sign,
};

pub use error::MirrorError;
pub use mirror::RealtimeMirror;
