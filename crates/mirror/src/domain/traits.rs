use async_trait::async_trait;
use thiserror::Error;

use super::messages::Command;

/// Failure to hand a command to the transport
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Command channel closed")]
    ChannelClosed,
}

/// Outbound side of the realtime connection.
///
/// The readiness gate depends on this abstraction rather than on the
/// WebSocket client, so priming can be driven by any transport.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn send_command(&self, command: Command) -> Result<(), CommandError>;
}
