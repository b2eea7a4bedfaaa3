use std::fmt;

use tokio::sync::watch;

/// Why a connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The owner called `exit`
    Exited,
    /// The venue closed the socket
    RemoteClosed,
    /// The transport failed
    TransportError(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Exited => f.write_str("exited"),
            CloseReason::RemoteClosed => f.write_str("closed by remote"),
            CloseReason::TransportError(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// Lifecycle of the single realtime connection. There is no reconnect:
/// `Closed` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed(CloseReason),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed(_))
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        match self {
            ConnectionState::Closed(reason) => Some(reason.clone()),
            _ => None,
        }
    }
}

/// Wait until the connection reaches `Closed` and return the reason.
pub async fn wait_closed(state: &mut watch::Receiver<ConnectionState>) -> CloseReason {
    match state.wait_for(ConnectionState::is_closed).await {
        Ok(current) => current.close_reason().unwrap_or(CloseReason::RemoteClosed),
        // Publisher gone without a final state: the reader task died.
        Err(_) => CloseReason::RemoteClosed,
    }
}
