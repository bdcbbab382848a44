//! Configuration module for the campus CMS backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default per-file upload limit (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding admin writes (unset = dev mode)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Directory uploaded files are written to
    pub upload_dir: PathBuf,
    /// URL prefix under which uploaded files are served
    pub public_url: String,
    /// Maximum accepted size of a single uploaded file
    pub max_upload_bytes: usize,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("CAMPUS_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("CAMPUS_DB_PATH")
            .unwrap_or_else(|_| "./data/campus.sqlite".to_string())
            .into();

        let index_path = env::var("CAMPUS_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let upload_dir = env::var("CAMPUS_UPLOAD_DIR")
            .unwrap_or_else(|_| "./data/uploads".to_string())
            .into();

        let public_url = env::var("CAMPUS_PUBLIC_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "/uploads".to_string());

        let max_upload_bytes = match env::var("CAMPUS_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "CAMPUS_MAX_UPLOAD_BYTES",
                value: raw,
            })?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let raw_addr = env::var("CAMPUS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::Invalid {
            var: "CAMPUS_BIND_ADDR",
            value: raw_addr.clone(),
        })?;

        let log_level = env::var("CAMPUS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = match env::var("CAMPUS_LOG_JSON") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                var: "CAMPUS_LOG_JSON",
                value: raw,
            })?,
            Err(_) => false,
        };

        Ok(Self {
            api_psk,
            db_path,
            index_path,
            upload_dir,
            public_url,
            max_upload_bytes,
            bind_addr,
            log_level,
            log_json,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
