//! Application configuration.
//!
//! Settings come from a TOML file, then environment variables override them.
//! A `.env` file in the working directory is loaded first, so its values act
//! like real environment variables.
//!
//! ```toml
//! api_base_url = "https://orders.example.com/api"
//! token = "..."
//! locale = "en"
//! countdown_secs = 30
//! ```

use crate::service::{normalize_base_url, Session};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const ENV_API_URL: &str = "PACK_API_URL";
pub const ENV_TOKEN: &str = "PACK_TOKEN";
pub const ENV_LOCALE: &str = "PACK_LOCALE";
pub const ENV_COUNTDOWN_SECS: &str = "PACK_COUNTDOWN_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Missing setting: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub token: String,
    pub locale: String,
    pub countdown_secs: u64,
    pub request_timeout_secs: u64,
    pub actor_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            token: String::new(),
            locale: "en".to_string(),
            countdown_secs: 30,
            request_timeout_secs: 30,
            actor_buffer: 32,
        }
    }
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.token = token;
        }
        if let Some(locale) = get(ENV_LOCALE) {
            self.locale = locale;
        }
        if let Some(secs) = get(ENV_COUNTDOWN_SECS) {
            self.countdown_secs = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_COUNTDOWN_SECS,
                value: secs,
            })?;
        }
        Ok(())
    }

    /// Check required settings and normalise the base URL.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Missing("api_base_url"));
        }
        if self.actor_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "actor_buffer",
                value: "0".to_string(),
            });
        }
        self.api_base_url = normalize_base_url(&self.api_base_url);
        Ok(self)
    }

    pub fn session(&self) -> Session {
        Session::new(self.token.clone(), self.locale.clone())
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load configuration from `path` (optional) and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Ok(env_file) = dotenvy::dotenv() {
        debug!(path = %env_file.display(), "Loaded .env");
    }

    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            AppConfig::from_toml(&text)?
        }
        None => AppConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()
}
