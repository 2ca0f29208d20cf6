//! Server configuration from environment variables.
//!
//! Required values are validated eagerly at startup — a missing
//! warehouse path aborts before any listener is bound or any network
//! call is attempted.

use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address, e.g. "127.0.0.1:8090".
    pub bind_address: String,

    /// Path to the warehouse SQLite database. Required.
    pub warehouse_db_path: String,

    /// Optional JSON file of static flag values.
    pub flags_file: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1:8090".into()),
            warehouse_db_path: env::var("WAREHOUSE_DB_PATH")
                .map_err(|_| ConfigError::Missing("WAREHOUSE_DB_PATH"))?,
            flags_file: env::var("FLAGS_FILE").ok(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
