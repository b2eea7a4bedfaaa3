use tokio::sync::watch;

use crate::domain::tables::{INSTRUMENT, MARGIN, ORDER, ORDER_BOOK, POSITION, TRADE};
use crate::domain::{Command, CommandSink, ConnectionState, wait_closed};
use crate::error::MirrorError;

use super::shared_store::SharedTableStore;

/// Tables an account push must deliver
pub const ACCOUNT_TABLES: [&str; 3] = [MARGIN, POSITION, ORDER];

/// Tables a symbol push must deliver
pub const SYMBOL_TABLES: [&str; 3] = [INSTRUMENT, TRADE, ORDER_BOOK];

/// Blocks construction until the mirror holds the tables callers read first.
///
/// Each priming step sends one command and waits, without a timeout, until
/// the required tables exist. The only early exit is the connection closing.
pub struct ReadinessGate<'a, S: CommandSink> {
    sink: &'a S,
    store: &'a SharedTableStore,
    state: watch::Receiver<ConnectionState>,
}

impl<'a, S: CommandSink> ReadinessGate<'a, S> {
    pub fn new(
        sink: &'a S,
        store: &'a SharedTableStore,
        state: watch::Receiver<ConnectionState>,
    ) -> Self {
        ReadinessGate { sink, store, state }
    }

    /// Margin, positions and open orders
    pub async fn prime_account(&mut self) -> Result<(), MirrorError> {
        self.prime(Command::get_account(), &ACCOUNT_TABLES).await
    }

    /// Instrument, recent trades and order book for `symbol`
    pub async fn prime_symbol(&mut self, symbol: &str) -> Result<(), MirrorError> {
        self.prime(Command::get_symbol(symbol), &SYMBOL_TABLES).await
    }

    async fn prime(&mut self, command: Command, required: &[&str]) -> Result<(), MirrorError> {
        tracing::debug!("Priming {:?} with {}", required, command.op);
        self.sink.send_command(command).await?;

        tokio::select! {
            _ = self.store.wait_for_tables(required) => Ok(()),
            reason = wait_closed(&mut self.state) => Err(MirrorError::ConnectionLost(reason)),
        }
    }
}
