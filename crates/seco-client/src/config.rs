//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/seco/config.toml` by default. Missing keys fall back to the
//! defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the seco client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Catalog server settings.
    pub server: ServerSettings,

    /// Retry policy for transport faults.
    pub retry: RetrySettings,
}

/// Catalog server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server host name or address.
    pub host: String,

    /// Server TCP port.
    pub port: u16,

    /// Identifier echoed into every request header.
    pub client_id: String,

    /// Connection timeout in seconds.
    pub connect_timeout: u64,

    /// Seconds to wait for the first response bytes, or for the rest of an
    /// unterminated line.
    pub response_timeout: u64,

    /// Milliseconds of silence after a complete line that end a response.
    pub idle_timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8003,
            client_id: "client".to_string(),
            connect_timeout: 5,
            response_timeout: 30,
            idle_timeout_ms: 250,
        }
    }
}

/// Retry policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per call, including the first.
    pub max_attempts: u32,

    /// Fixed delay between attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 2000,
        }
    }
}

impl RetrySettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl ServerSettings {
    /// `host:port` address to connect to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ClientError::config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make every call fail.
    pub fn validate(&self) -> ClientResult<()> {
        if self.server.host.is_empty() {
            return Err(ClientError::config("server.host must not be empty"));
        }
        if self.server.client_id.contains(['?', '\n']) {
            return Err(ClientError::config(
                "server.client_id must not contain '?' or newlines",
            ));
        }
        if self.server.idle_timeout_ms == 0 {
            return Err(ClientError::config("server.idle_timeout_ms must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ClientError::config("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }

    /// Applies command-line or environment overrides.
    #[must_use]
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        client_id: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(client_id) = client_id {
            self.server.client_id = client_id;
        }
        self
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("seco")
            .join("config.toml")
    }
}
