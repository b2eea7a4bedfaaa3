use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for one mirror connection
#[derive(Clone, Serialize, Deserialize)]
pub struct MirrorConfigFile {
    /// REST API base URL; the realtime URL is derived from it
    pub endpoint: String,
    /// Symbol every per-symbol subscription is scoped to
    pub symbol: String,
    /// API key (signed auth)
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signing the handshake
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Login email (plaintext auth)
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Bound on the WebSocket handshake
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Path of the realtime endpoint, also the signed path
    #[serde(default = "default_realtime_path")]
    pub realtime_path: String,
}

impl MirrorConfigFile {
    pub fn new(endpoint: impl Into<String>, symbol: impl Into<String>) -> Self {
        MirrorConfigFile {
            endpoint: endpoint.into(),
            symbol: symbol.into(),
            api_key: None,
            api_secret: None,
            login: None,
            password: None,
            connect_timeout_secs: default_connect_timeout(),
            realtime_path: default_realtime_path(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self.api_secret = Some(api_secret.into());
        self
    }

    pub fn with_login(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = timeout.as_secs();
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl std::fmt::Debug for MirrorConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorConfigFile")
            .field("endpoint", &self.endpoint)
            .field("symbol", &self.symbol)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("realtime_path", &self.realtime_path)
            .finish()
    }
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_realtime_path() -> String {
    "/realtime".to_string()
}
