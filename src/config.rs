use crate::common::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONFIG_PATH, DEFAULT_PORT, DEFAULT_REDUCTION_PROFILE, ENV_BASE_URL, ENV_PASSWORD,
    ENV_PORT, ENV_USERNAME,
};
use crate::common::error::{MovebankError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Username/password pair passed through to Movebank as HTTP basic auth.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MovebankCredentials {
    pub username: String,
    pub password: String,
}

impl MovebankCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty()
    }
}

impl fmt::Debug for MovebankCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovebankCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MovebankConfig {
    pub base_url: String,
    pub credentials: MovebankCredentials,
    /// Unset means the transport default (no timeout).
    pub request_timeout_secs: Option<u64>,
    pub reduction_profile: String,
}

impl Default for MovebankConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: MovebankCredentials::default(),
            request_timeout_secs: None,
            reduction_profile: DEFAULT_REDUCTION_PROFILE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub movebank: MovebankConfig,
    pub server: ServerConfig,
}

/// Optional `config.toml` overlay. Credentials are never read from it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    movebank: FileMovebankConfig,
    #[serde(default)]
    server: FileServerConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileMovebankConfig {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    reduction_profile: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileServerConfig {
    port: Option<u16>,
}

impl Config {
    /// Load `.env`, then `config.toml` if present, then the process environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let path = Path::new(DEFAULT_CONFIG_PATH);
        let file = if path.exists() { Some(path) } else { None };
        Self::load_from(file, |key| std::env::var(key).ok())
    }

    /// Build from an optional TOML file and an environment lookup.
    pub fn load_from<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    MovebankError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
                })?;
                toml::from_str(&content)?
            }
            None => FileConfig::default(),
        };

        let mut config = Config::default();
        if let Some(url) = file.movebank.base_url {
            config.movebank.base_url = url;
        }
        if let Some(profile) = file.movebank.reduction_profile {
            config.movebank.reduction_profile = profile;
        }
        config.movebank.request_timeout_secs = file.movebank.request_timeout_secs;
        if let Some(port) = file.server.port {
            config.server.port = port;
        }

        if let Some(url) = env(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            config.movebank.base_url = url;
        }
        if let Some(port) = env(ENV_PORT) {
            config.server.port = port
                .parse()
                .map_err(|e| MovebankError::Config(format!("Invalid {ENV_PORT} '{port}': {e}")))?;
        }
        config.movebank.credentials = MovebankCredentials::new(
            env(ENV_USERNAME).unwrap_or_default(),
            env(ENV_PASSWORD).unwrap_or_default(),
        );
        if config.movebank.credentials.is_empty() {
            warn!("{} is not set; requests will be sent with empty credentials", ENV_USERNAME);
        }

        if !config.movebank.base_url.starts_with("http://") && !config.movebank.base_url.starts_with("https://") {
            return Err(MovebankError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                config.movebank.base_url
            )));
        }

        Ok(config)
    }
}
