//! Configuration module for the rotor backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Maximum number of pooled SQLite connections
    pub db_max_connections: u32,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("ROTOR_DB_PATH")
            .unwrap_or_else(|_| "./data/rotor.sqlite".to_string())
            .into();

        let db_max_connections = env::var("ROTOR_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let bind_addr = env::var("ROTOR_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid ROTOR_BIND_ADDR format");

        let log_level = env::var("ROTOR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            db_max_connections,
            bind_addr,
            log_level,
        }
    }
}
