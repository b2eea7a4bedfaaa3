//! Folds realtime table events into a [`TableStore`].
//!
//! Four actions arrive from the feed:
//! - `partial`: full table image, replaces rows and (re)declares the key set
//! - `insert`: rows appended as-is
//! - `update`: rows located by key set and merged in place
//! - `delete`: rows located by key set and removed
//!
//! Open orders are evicted as soon as an update drives `leavesQty` to zero.

use thiserror::Error;

use crate::domain::row::{self, Row};
use crate::domain::tables::{LEAVES_QTY, ORDER};
use crate::domain::{Action, InboundMessage, TableStore, UnknownAction};

/// Per-message failure. The offending message is dropped; the stream goes on.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("Failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Message is missing field '{0}'")]
    MissingField(&'static str),
    #[error("{table}: row is missing key field '{field}'")]
    MissingKeyField { table: String, field: String },
    #[error("{0}: no key set declared yet")]
    NoKeySet(String),
    #[error("{0}: row to delete not found")]
    RowNotFound(String),
}

impl From<UnknownAction> for ApplyError {
    fn from(err: UnknownAction) -> Self {
        ApplyError::UnknownAction(err.0)
    }
}

/// What a successfully processed message did
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// No action field: nothing to do
    Ignored,
    /// Welcome / informational banner
    Info(String),
    /// Subscription acknowledgement
    Subscribed(String),
    /// Error reported by the venue (not a transport failure)
    VenueError(String),
    Applied {
        table: String,
        action: Action,
        rows: usize,
    },
    /// An update row had no match (typically before the table's partial).
    /// `applied` rows before it stay applied; the rest of the message is skipped.
    UpdateDropped { table: String, applied: usize },
}

/// Decode one raw frame and apply it.
pub fn apply_text(store: &mut TableStore, text: &str) -> Result<ApplyOutcome, ApplyError> {
    let message: InboundMessage = serde_json::from_str(text)?;
    apply(store, message)
}

/// Apply one decoded message to the store.
pub fn apply(store: &mut TableStore, message: InboundMessage) -> Result<ApplyOutcome, ApplyError> {
    if let Some(topic) = message.subscribe {
        return Ok(ApplyOutcome::Subscribed(value_text(topic)));
    }

    let Some(action) = message.action else {
        if let Some(error) = message.error {
            return Ok(ApplyOutcome::VenueError(value_text(error)));
        }
        if let Some(info) = message.info {
            return Ok(ApplyOutcome::Info(value_text(info)));
        }
        return Ok(ApplyOutcome::Ignored);
    };

    let table = message.table.ok_or(ApplyError::MissingField("table"))?;
    store.ensure_table(&table);

    let action: Action = action.parse()?;
    let rows = message.data.ok_or(ApplyError::MissingField("data"))?;

    match action {
        Action::Partial => {
            let keys = message.keys.ok_or(ApplyError::MissingField("keys"))?;
            let count = rows.len();
            store.replace(&table, rows, keys);
            Ok(applied(table, action, count))
        }
        Action::Insert => {
            let count = rows.len();
            store.append(&table, rows);
            Ok(applied(table, action, count))
        }
        Action::Update => apply_update(store, table, rows),
        Action::Delete => apply_delete(store, table, rows),
    }
}

fn apply_update(
    store: &mut TableStore,
    table: String,
    rows: Vec<Row>,
) -> Result<ApplyOutcome, ApplyError> {
    let Some(keys) = store.keys(&table).map(<[String]>::to_vec) else {
        return Ok(ApplyOutcome::UpdateDropped { table, applied: 0 });
    };

    let mut count = 0;
    for update in rows {
        require_keys(&table, &keys, &update)?;

        // First unmatched row abandons the remainder of the message.
        let Some(index) = store.position(&table, &keys, &update) else {
            return Ok(ApplyOutcome::UpdateDropped {
                table,
                applied: count,
            });
        };

        let filled = match store.row_mut(&table, index) {
            Some(existing) => {
                row::merge(existing, update);
                table == ORDER && is_filled(existing)
            }
            None => false,
        };
        if filled {
            store.remove(&table, index);
        }
        count += 1;
    }

    Ok(applied(table, Action::Update, count))
}

fn apply_delete(
    store: &mut TableStore,
    table: String,
    rows: Vec<Row>,
) -> Result<ApplyOutcome, ApplyError> {
    let keys = store
        .keys(&table)
        .map(<[String]>::to_vec)
        .ok_or_else(|| ApplyError::NoKeySet(table.clone()))?;

    let count = rows.len();
    for target in rows {
        require_keys(&table, &keys, &target)?;
        let index = store
            .position(&table, &keys, &target)
            .ok_or_else(|| ApplyError::RowNotFound(table.clone()))?;
        store.remove(&table, index);
    }

    Ok(applied(table, Action::Delete, count))
}

fn applied(table: String, action: Action, rows: usize) -> ApplyOutcome {
    ApplyOutcome::Applied {
        table,
        action,
        rows,
    }
}

fn require_keys(table: &str, keys: &[String], row: &Row) -> Result<(), ApplyError> {
    match row::missing_key(keys, row) {
        Some(field) => Err(ApplyError::MissingKeyField {
            table: table.to_string(),
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}

/// An order with nothing left to fill is no longer open.
fn is_filled(order: &Row) -> bool {
    row::number(order, LEAVES_QTY).is_some_and(|qty| qty <= 0.0)
}

fn value_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
