use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::prediction::{DEFAULT_PREDICTION_URL, PREDICTION_TIMEOUT_SECS};

/// Application-level constants
pub const APP_NAME: &str = "WellnessAssistant";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reported by the health endpoint.
pub const SERVICE_NAME: &str = "wellness-assistant-backend";

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DATABASE_FILE: &str = "wellness.db";

/// Get the application data directory
/// ~/WellnessAssistant/ when a home directory is known, else the working directory.
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => PathBuf::from(APP_NAME),
    }
}

/// Default SQLite file location.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "wellness_lib=info,tower_http=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub prediction_url: String,
    pub prediction_timeout_secs: u64,
    pub frontend_url: String,
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            prediction_url: DEFAULT_PREDICTION_URL.to_string(),
            prediction_timeout_secs: PREDICTION_TIMEOUT_SECS,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            database_path: default_database_path(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = get("PORT") {
            config.port = raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    name: "PORT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(url) = get("PREDICTION_API_URL") {
            config.prediction_url = url;
        }
        if let Some(url) = get("FRONTEND_URL") {
            config.frontend_url = url;
        }
        if let Some(path) = get("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        Ok(config)
    }
}
