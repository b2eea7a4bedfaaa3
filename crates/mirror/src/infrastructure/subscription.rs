use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use super::credentials::Credentials;
use super::signer::sign;
use crate::domain::tables::{EXECUTION, MARGIN, ORDER, POSITION, QUOTE, TRADE};

/// Topics scoped to the subscribed symbol
pub const SYMBOL_TOPICS: [&str; 5] = [ORDER, EXECUTION, POSITION, QUOTE, TRADE];

/// Account-wide topics
pub const ACCOUNT_TOPICS: [&str; 1] = [MARGIN];

#[derive(Error, Debug)]
pub enum SubscriptionError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("Unsupported endpoint scheme: {0}")]
    UnsupportedScheme(String),
}

/// `order:XBTUSD,...,trade:XBTUSD,margin`
pub fn subscription_topics(symbol: &str) -> Vec<String> {
    SYMBOL_TOPICS
        .iter()
        .map(|topic| format!("{}:{}", topic, symbol))
        .chain(ACCOUNT_TOPICS.iter().map(|topic| topic.to_string()))
        .collect()
}

/// Derive the realtime URL from the REST endpoint.
///
/// `https://host/api/v1` becomes `wss://host/realtime?subscribe=...`.
pub fn realtime_url(endpoint: &str, path: &str, symbol: &str) -> Result<Url, SubscriptionError> {
    let mut url = Url::parse(endpoint)?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(SubscriptionError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| SubscriptionError::UnsupportedScheme(scheme.to_string()))?;

    url.set_path(path);
    url.set_query(Some(&format!(
        "subscribe={}",
        subscription_topics(symbol).join(",")
    )));
    url.set_fragment(None);
    Ok(url)
}

/// Handshake headers for the chosen auth mode.
///
/// API keys sign `GET <path>` with an empty body; logins are sent as-is.
pub fn auth_headers(
    credentials: &Credentials,
    path: &str,
    nonce: i64,
) -> Vec<(&'static str, String)> {
    match credentials {
        Credentials::ApiKey(api) => vec![
            ("api-nonce", nonce.to_string()),
            (
                "api-signature",
                sign(api.expose_secret(), "GET", path, nonce, ""),
            ),
            ("api-key", api.api_key().to_string()),
        ],
        Credentials::Login { email, password } => vec![
            ("email", email.clone()),
            ("password", password.expose_secret().to_string()),
        ],
    }
}
