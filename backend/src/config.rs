//! HTTP server settings.
//!
//! Values come from the optional `[server]` table of `repository.toml` and are
//! then overridden by the environment:
//!
//! - `HOST`: bind address (default: `0.0.0.0`)
//! - `PORT`: bind port (default: `8080`)
//! - `RUST_LOG`: log filter (default: `info`)

use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Settings from the environment alone.
    pub fn from_env() -> Result<Self, RepositoryError> {
        Self::default().with_env_overrides()
    }

    /// Apply `HOST`, `PORT` and `RUST_LOG` on top of these settings.
    pub fn with_env_overrides(mut self) -> Result<Self, RepositoryError> {
        if let Ok(host) = std::env::var("HOST") {
            if !host.trim().is_empty() {
                self.host = host;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            self.port = port.trim().parse().map_err(|_| {
                RepositoryError::configuration(format!("PORT must be a port number, got '{}'", port))
            })?;
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                self.log_filter = filter;
            }
        }
        Ok(self)
    }

    /// `host:port`, ready for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
