//! # Domain Errors
//!
//! Typed failures raised at the seams of the domain (transport and configuration).
//! Everything above these seams works with `anyhow::Result`.

use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the chat platform.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bot token is not set (TELEGRAM_BOT_TOKEN or `telegram.token` in config)")]
    MissingToken,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid value for `{field}`: {message}")]
    Invalid { field: String, message: String },
}
