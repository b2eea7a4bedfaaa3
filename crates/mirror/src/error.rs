//! Error types for the mirror crate

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::config::ConfigError;
use crate::domain::{CloseReason, CommandError};
use crate::infrastructure::SubscriptionError;

/// Connection lifecycle errors. Each one means this mirror is unusable.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    #[error("Invalid header value: {0}")]
    Header(#[from] tungstenite::http::header::InvalidHeaderValue),

    #[error("Connection error: {0}")]
    Connection(#[from] tungstenite::Error),

    #[error("Couldn't connect to WS within {0:?}")]
    ConnectTimeout(Duration),

    #[error("Connection lost: {0}")]
    ConnectionLost(CloseReason),

    #[error("Command failed: {0}")]
    Command(#[from] CommandError),
}
