//! Connection credentials.
//!
//! Secrets are wrapped in `SecretString` so they never show up in `Debug`
//! output or logs.

use secrecy::{ExposeSecret, SecretString};

/// API key pair used to sign the connection request
pub struct ApiCredentials {
    api_key: String,
    api_secret: SecretString,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret: SecretString::from(api_secret),
        }
    }

    /// The API key (public, safe to log)
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Only for signing. Never log the return value.
    pub fn expose_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// How the connection authenticates
pub enum Credentials {
    /// Signed nonce headers
    ApiKey(ApiCredentials),
    /// Plaintext email/password headers
    Login { email: String, password: SecretString },
}

impl Credentials {
    pub fn api_key(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Credentials::ApiKey(ApiCredentials::new(api_key.into(), api_secret.into()))
    }

    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Login {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(api) => f.debug_tuple("ApiKey").field(api).finish(),
            Credentials::Login { email, .. } => f
                .debug_struct("Login")
                .field("email", email)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}
