use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use url::Url;

use crate::application::SharedTableStore;
use crate::domain::{CloseReason, Command, CommandError, CommandSink, ConnectionState};
use crate::error::MirrorError;

/// Frames queued for the writer task
#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// WebSocket client for the realtime feed.
///
/// Opens one authenticated connection. Inbound frames are applied to the
/// table store on a background task in arrival order; there is no reconnect.
pub struct RealtimeWsClient {
    url: Url,
    headers: Vec<(&'static str, String)>,
    connect_timeout: Duration,
}

impl RealtimeWsClient {
    pub fn new(url: Url, headers: Vec<(&'static str, String)>, connect_timeout: Duration) -> Self {
        RealtimeWsClient {
            url,
            headers,
            connect_timeout,
        }
    }

    /// Connect, then start the reader and writer tasks.
    ///
    /// Fails with `ConnectTimeout` if the handshake does not finish within
    /// the configured timeout.
    pub async fn connect(self, store: SharedTableStore) -> Result<WsConnection, MirrorError> {
        let mut request = self.url.as_str().into_client_request()?;
        for (name, value) in &self.headers {
            request
                .headers_mut()
                .insert(*name, HeaderValue::from_str(value)?);
        }

        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        let (ws_stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| MirrorError::ConnectTimeout(self.connect_timeout))??;
        tracing::debug!("Websocket opened");
        state_tx.send_replace(ConnectionState::Open);

        let (mut write, mut read) = ws_stream.split();
        let state_tx = Arc::new(state_tx);
        let exited = Arc::new(AtomicBool::new(false));

        // Channel for sending frames to the WebSocket
        let (out_tx, mut out_rx) = mpsc::channel::<Outbound>(32);

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let message = match frame {
                    Outbound::Text(json) => Message::Text(json.into()),
                    Outbound::Close => Message::Close(None),
                };
                if let Err(e) = write.send(message).await {
                    tracing::debug!("WebSocket send failed: {}", e);
                    break;
                }
            }
        });

        let reader_state = Arc::clone(&state_tx);
        let reader_exited = Arc::clone(&exited);
        tokio::spawn(async move {
            let reason = loop {
                match read.next().await {
                    Some(Ok(Message::Text(text))) => store.handle_text(text.as_str()),
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!("Close frame: {:?}", frame);
                        break CloseReason::RemoteClosed;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        tracing::trace!("Received ping: {:?}", data);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break CloseReason::TransportError(e.to_string()),
                    None => break CloseReason::RemoteClosed,
                }
            };

            let reason = if reader_exited.load(Ordering::SeqCst) {
                CloseReason::Exited
            } else {
                reason
            };
            match &reason {
                CloseReason::Exited => tracing::debug!("Websocket closed after exit"),
                CloseReason::RemoteClosed => tracing::info!("Websocket closed"),
                CloseReason::TransportError(e) => tracing::error!("Error : {}", e),
            }
            reader_state.send_replace(ConnectionState::Closed(reason));
        });

        Ok(WsConnection {
            sender: CommandSender { tx: out_tx },
            state_tx,
            state_rx,
            exited,
        })
    }
}

/// Handle for sending commands over the connection
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<Outbound>,
}

impl CommandSender {
    async fn close(&self) -> Result<(), CommandError> {
        self.tx
            .send(Outbound::Close)
            .await
            .map_err(|_| CommandError::ChannelClosed)
    }
}

#[async_trait]
impl CommandSink for CommandSender {
    async fn send_command(&self, command: Command) -> Result<(), CommandError> {
        let json = serde_json::to_string(&command)?;
        self.tx
            .send(Outbound::Text(json))
            .await
            .map_err(|_| CommandError::ChannelClosed)
    }
}

/// A live connection: command sender plus observable lifecycle state
pub struct WsConnection {
    sender: CommandSender,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    exited: Arc<AtomicBool>,
}

impl WsConnection {
    pub fn sender(&self) -> &CommandSender {
        &self.sender
    }

    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// A receiver that follows every state change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Best effort: suppress further error reports and send a close frame.
    /// Does not wait for the reader task to finish.
    pub async fn exit(&self) {
        self.exited.store(true, Ordering::SeqCst);
        self.state_tx.send_if_modified(|state| {
            if state.is_closed() {
                return false;
            }
            *state = ConnectionState::Closing;
            true
        });
        if let Err(e) = self.sender.close().await {
            tracing::debug!("Close frame not sent: {}", e);
        }
    }
}
