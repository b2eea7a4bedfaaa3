//! HMAC-SHA256 request signing for the venue's API.
//!
//! signature = HEX(HMAC_SHA256(secret, verb + path + nonce + body))
//!
//! `path` is the request URL with scheme and host removed (query kept).
//! `body` must be the exact bytes sent; re-serializing after signing breaks
//! the signature.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const PLACEHOLDER_ORIGIN: &str = "http://localhost";

/// Nonce for one signed request: wall clock in milliseconds.
///
/// The venue rejects nonces that go backwards for the same key; this is not
/// checked locally.
pub fn generate_nonce() -> i64 {
    Utc::now().timestamp_millis()
}

/// Sign a request and return the lowercase hex signature.
///
/// `verb` must already be uppercase. `url` may be absolute or a bare path.
pub fn sign(secret: &str, verb: &str, url: &str, nonce: i64, body: &str) -> String {
    let message = format!("{}{}{}{}", verb, signing_path(url), nonce, body);

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Path plus query of `url`, without scheme, host or fragment.
///
/// Relative inputs resolve against a placeholder origin. Unparsable input is
/// signed as given.
fn signing_path(url: &str) -> String {
    let Ok(parsed) = Url::parse(PLACEHOLDER_ORIGIN).and_then(|base| base.join(url)) else {
        return url.to_string();
    };
    match parsed.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", parsed.path(), query),
        _ => parsed.path().to_string(),
    }
}
