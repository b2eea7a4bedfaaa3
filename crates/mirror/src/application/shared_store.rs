use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::TableStore;

use super::event_applier::{self, ApplyError, ApplyOutcome};

/// Thread-safe handle to the table mirror.
///
/// Single writer (the connection's reader task), many readers. Each inbound
/// message is applied under one write lock, so readers never observe a
/// message half-applied. Table creation is published on a watch channel for
/// the readiness gate.
#[derive(Clone)]
pub struct SharedTableStore {
    inner: Arc<RwLock<TableStore>>,
    tables_tx: Arc<watch::Sender<BTreeSet<String>>>,
}

impl SharedTableStore {
    pub fn new() -> Self {
        let (tables_tx, _) = watch::channel(BTreeSet::new());
        SharedTableStore {
            inner: Arc::new(RwLock::new(TableStore::new())),
            tables_tx: Arc::new(tables_tx),
        }
    }

    /// Decode and apply one raw frame atomically.
    pub fn apply_text(&self, text: &str) -> Result<ApplyOutcome, ApplyError> {
        let message = serde_json::from_str(text)?;

        let mut store = self.inner.write();
        let outcome = event_applier::apply(&mut store, message);
        self.publish_tables(&store);
        outcome
    }

    /// Apply a frame and log the result. Errors are absorbed so the stream continues.
    pub fn handle_text(&self, text: &str) {
        tracing::debug!("{}", text);

        match self.apply_text(text) {
            Ok(ApplyOutcome::Applied {
                table,
                action,
                rows,
            }) => {
                tracing::debug!("{}: {} {} row(s)", table, action, rows);
            }
            Ok(ApplyOutcome::UpdateDropped { table, applied }) => {
                tracing::warn!(
                    "{}: update target not found after {} row(s), dropping rest of message",
                    table,
                    applied
                );
            }
            Ok(ApplyOutcome::Subscribed(topic)) => tracing::debug!("Subscribed to {}.", topic),
            Ok(ApplyOutcome::Info(info)) => tracing::info!("{}", info),
            Ok(ApplyOutcome::VenueError(error)) => tracing::error!("Venue error: {}", error),
            Ok(ApplyOutcome::Ignored) => {}
            Err(e) => tracing::error!("Failed to process message: {}", e),
        }
    }

    /// Run `f` against a consistent view of the store.
    pub fn read<R>(&self, f: impl FnOnce(&TableStore) -> R) -> R {
        f(&self.inner.read())
    }

    /// Owned copy of the whole store
    pub fn snapshot(&self) -> TableStore {
        self.inner.read().clone()
    }

    pub fn contains_all(&self, names: &[&str]) -> bool {
        self.inner.read().contains_all(names)
    }

    /// Wait until every table in `required` has been seen. No timeout.
    pub async fn wait_for_tables(&self, required: &[&str]) {
        let mut tables = self.tables_tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = tables
            .wait_for(|present| required.iter().all(|name| present.contains(*name)))
            .await;
    }

    fn publish_tables(&self, store: &TableStore) {
        self.tables_tx.send_if_modified(|known| {
            if known.len() == store.table_count() {
                return false;
            }
            for name in store.table_names() {
                known.insert(name.to_string());
            }
            true
        });
    }
}

impl Default for SharedTableStore {
    fn default() -> Self {
        Self::new()
    }
}
