use tokio::sync::watch;

use crate::application::query::{self, QueryError, Ticker};
use crate::application::{ReadinessGate, SharedTableStore};
use crate::config::MirrorConfigFile;
use crate::domain::{CloseReason, ConnectionState, Row, wait_closed};
use crate::error::MirrorError;
use crate::infrastructure::{
    RealtimeWsClient, WsConnection, auth_headers, generate_nonce, realtime_url,
};

/// Live, continuously updated replica of the venue's account and market tables.
///
/// `connect` returns only once the account tables (margin, position, order)
/// and the symbol tables (instrument, trade, orderBook25) have been received,
/// so the read methods are usable immediately. Every read takes a consistent
/// view: a message is either fully applied or not visible at all.
pub struct RealtimeMirror {
    symbol: String,
    store: SharedTableStore,
    connection: WsConnection,
}

impl RealtimeMirror {
    /// Authenticate, subscribe and prime the mirror.
    pub async fn connect(config: &MirrorConfigFile) -> Result<Self, MirrorError> {
        tracing::debug!("Initializing WebSocket.");
        let credentials = config.credentials()?;

        let url = realtime_url(&config.endpoint, &config.realtime_path, &config.symbol)?;
        tracing::info!("Connecting to {}", url);
        let headers = auth_headers(&credentials, &config.realtime_path, generate_nonce());

        let store = SharedTableStore::new();
        let connection = RealtimeWsClient::new(url, headers, config.connect_timeout())
            .connect(store.clone())
            .await?;
        tracing::info!("Connected to WS.");

        let mut gate = ReadinessGate::new(connection.sender(), &store, connection.subscribe());
        let primed = match gate.prime_account().await {
            Ok(()) => gate.prime_symbol(&config.symbol).await,
            Err(e) => Err(e),
        };
        if let Err(e) = primed {
            connection.exit().await;
            return Err(e);
        }
        tracing::info!("Got all market data. Starting.");

        Ok(RealtimeMirror {
            symbol: config.symbol.clone(),
            store,
            connection,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Instrument row with a derived `tickLog`
    pub fn get_instrument(&self) -> Result<Row, QueryError> {
        self.store.read(query::instrument)
    }

    /// Ticker from the latest quote and trade, rounded to tick precision
    pub fn get_ticker(&self) -> Result<Ticker, QueryError> {
        self.store.read(query::ticker)
    }

    pub fn funds(&self) -> Result<Row, QueryError> {
        self.store.read(query::funds)
    }

    pub fn market_depth(&self) -> Result<Vec<Row>, QueryError> {
        self.store.read(query::market_depth)
    }

    /// Open orders whose client order id starts with `prefix`
    pub fn open_orders(&self, prefix: &str) -> Result<Vec<Row>, QueryError> {
        self.store.read(|store| query::open_orders(store, prefix))
    }

    pub fn recent_trades(&self) -> Result<Vec<Row>, QueryError> {
        self.store.read(query::recent_trades)
    }

    /// Underlying store, for views not covered above
    pub fn store(&self) -> &SharedTableStore {
        &self.store
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Resolves when the connection is dead, with the reason.
    pub async fn closed(&self) -> CloseReason {
        let mut state = self.connection.subscribe();
        wait_closed(&mut state).await
    }

    /// Stop reporting errors and close the socket. Best effort.
    pub async fn exit(&self) {
        self.connection.exit().await;
    }
}
