//! # Configuration
//!
//! Manages the loading of the bot's configuration: an optional `config.yaml`
//! overlaid with environment variables (a `.env` file is honoured by `main`).
//! The bot token is the only required value.

use serde::Deserialize;
use std::path::Path;

use crate::domain::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

pub const ENV_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHANNEL_1: &str = "CHANNEL_ID_1";
pub const ENV_CHANNEL_2: &str = "CHANNEL_ID_2";
pub const ENV_ADMIN: &str = "ADMIN_USER_ID";
pub const ENV_DATABASE: &str = "DATABASE_PATH";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Long-poll window for `getUpdates`, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            poll_timeout: default_poll_timeout(),
        }
    }
}

/// The two channels a user must join before using the bot.
#[derive(Debug, Deserialize, Clone)]
pub struct ChannelsConfig {
    #[serde(default = "default_primary_channel")]
    pub primary: String,
    #[serde(default = "default_secondary_channel")]
    pub secondary: String,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_channel(),
            secondary: default_secondary_channel(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default = "default_admin_id")]
    pub admin_id: i64,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            admin_id: default_admin_id(),
            database_path: default_database_path(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_timeout() -> u64 {
    30
}
fn default_primary_channel() -> String {
    "@vmodel_msk".to_string()
}
fn default_secondary_channel() -> String {
    "@x5courer".to_string()
}
fn default_admin_id() -> i64 {
    400730644
}
fn default_database_path() -> String {
    "bot_database.db".to_string()
}
fn default_data_dir() -> String {
    "data".to_string()
}

impl AppConfig {
    /// Loads the config file (if present), applies environment overrides and
    /// checks that a token is available.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses `path`, falling back to defaults when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlays values from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(ENV_TOKEN) {
            self.telegram.token = token.trim().to_string();
        }
        if let Some(channel) = non_empty(ENV_CHANNEL_1) {
            self.channels.primary = channel.trim().to_string();
        }
        if let Some(channel) = non_empty(ENV_CHANNEL_2) {
            self.channels.secondary = channel.trim().to_string();
        }
        if let Some(admin) = non_empty(ENV_ADMIN) {
            self.system.admin_id = admin.trim().parse().map_err(|_| ConfigError::Invalid {
                field: ENV_ADMIN.to_string(),
                message: format!("`{admin}` is not a numeric user id"),
            })?;
        }
        if let Some(db) = non_empty(ENV_DATABASE) {
            self.system.database_path = db.trim().to_string();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }
}
