//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/uploads`
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            uploads_dir: default_uploads_dir(),
        }
    }
}

/// Token key configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric token key: either exactly 32 raw bytes or 64 hex characters
    #[serde(default)]
    pub token_key: String,

    /// Identifier written into every token footer
    #[serde(default = "default_key_id")]
    pub key_id: String,
}

fn default_key_id() -> String {
    "v2-local-1".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_key: String::new(),
            key_id: default_key_id(),
        }
    }
}

/// Storage backend. Without a URL the service keeps everything in memory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// libpq-style connection string, e.g. `host=localhost user=postgres dbname=booking`
    #[serde(default)]
    pub url: Option<String>,
}

impl Config {
    /// Whether a PostgreSQL backend is configured
    pub fn uses_postgres(&self) -> bool {
        self.database
            .url
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }
}
