//! Infrastructure Layer - adapters to the venue
//!
//! - Signer: HMAC-SHA256 request signatures
//! - Credentials: API key or login, secrets redacted
//! - Subscription: realtime URL and handshake headers
//! - RealtimeWsClient: the WebSocket connection itself

pub mod credentials;
pub mod signer;
pub mod subscription;
pub mod ws_client;

pub use credentials::{ApiCredentials, Credentials};
pub use signer::{generate_nonce, sign};
pub use subscription::{SubscriptionError, auth_headers, realtime_url, subscription_topics};
pub use ws_client::{CommandSender, RealtimeWsClient, WsConnection};
