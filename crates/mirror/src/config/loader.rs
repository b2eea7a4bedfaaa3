use std::path::Path;
use thiserror::Error;

use super::types::MirrorConfigFile;
use crate::infrastructure::Credentials;

pub const ENV_API_KEY: &str = "MIRROR_API_KEY";
pub const ENV_API_SECRET: &str = "MIRROR_API_SECRET";
pub const ENV_LOGIN: &str = "MIRROR_LOGIN";
pub const ENV_PASSWORD: &str = "MIRROR_PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Please set an API key and secret, or a login and password")]
    MissingCredentials,
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),
}

/// Load mirror configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MirrorConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<MirrorConfigFile, ConfigError> {
    let config: MirrorConfigFile = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration (testnet, no credentials)
pub fn load_default_config() -> Result<MirrorConfigFile, ConfigError> {
    let default_config = include_str!("mirror_config.json");
    load_config_from_str(default_config)
}

impl MirrorConfigFile {
    /// Pick the auth mode. An API key pair wins over a login pair.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        if let (Some(key), Some(secret)) = (present(&self.api_key), present(&self.api_secret)) {
            return Ok(Credentials::api_key(key, secret));
        }
        if let (Some(login), Some(password)) = (present(&self.login), present(&self.password)) {
            return Ok(Credentials::login(login, password));
        }
        Err(ConfigError::MissingCredentials)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingSetting("endpoint"));
        }
        if self.symbol.is_empty() {
            return Err(ConfigError::MissingSetting("symbol"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::MissingSetting("connect_timeout_secs"));
        }
        self.credentials().map(|_| ())
    }

    /// Fill credentials from `MIRROR_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Fill credentials from `lookup`; values it returns replace the file's.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let fields = [
            (ENV_API_KEY, &mut self.api_key),
            (ENV_API_SECRET, &mut self.api_secret),
            (ENV_LOGIN, &mut self.login),
            (ENV_PASSWORD, &mut self.password),
        ];
        for (name, field) in fields {
            if let Some(value) = lookup(name) {
                *field = Some(value);
            }
        }
        self
    }
}

/// A setting counts as present only when non-empty.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
