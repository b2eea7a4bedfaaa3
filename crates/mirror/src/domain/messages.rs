use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::row::Row;

/// Table actions carried by realtime messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Full table image; also (re)declares the table's key set
    Partial,
    Insert,
    Update,
    Delete,
}

/// Action name the feed sent that is none of the four known ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "partial" => Ok(Action::Partial),
            "insert" => Ok(Action::Insert),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Partial => "partial",
            Action::Insert => "insert",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One inbound frame from the realtime feed.
///
/// Either housekeeping (`info`, `subscribe` ack, `error`) or a table event
/// (`table` + `action` + `data`, with `keys` on partials).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub info: Option<Value>,
    #[serde(default)]
    pub subscribe: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Row>>,
    #[serde(default)]
    pub keys: Option<Vec<String>>,
}

/// Outbound command: `{"op": <name>, "args": <argument-or-list>}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub op: String,
    pub args: Value,
}

impl Command {
    pub fn new(op: impl Into<String>, args: Value) -> Self {
        Command {
            op: op.into(),
            args,
        }
    }

    /// Request an account push (margin, positions, open orders)
    pub fn get_account() -> Self {
        Command::new("getAccount", json!([]))
    }

    /// Request a symbol push (instrument, order book, quotes, trades)
    pub fn get_symbol(symbol: &str) -> Self {
        Command::new("getSymbol", json!(symbol))
    }
}
