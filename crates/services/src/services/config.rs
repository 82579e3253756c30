//! Service configuration: a JSON file with every field defaulted, plus env overrides.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;

pub const CONFIG_PATH_ENV: &str = "QRORDER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

fn check_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Offset of the restaurant's local time; drives "today", "this month" and receipt dates.
    pub utc_offset_minutes: i32,
    /// Pending orders older than this are cancelled by the sweeper. 0 disables the sweeper.
    pub pending_order_timeout_minutes: i64,
    pub sweep_interval_secs: u64,
    pub receipt_width: usize,
    pub receipt_footer: String,
    pub default_payment_method: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite://qrorder.db".to_string(),
            utc_offset_minutes: 7 * 60, // WIB
            pending_order_timeout_minutes: 120,
            sweep_interval_secs: 60,
            receipt_width: 40,
            receipt_footer: "Thank you! See you again.".to_string(),
            default_payment_method: "cash".to_string(),
        }
    }
}

impl Config {
    pub fn local_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Rejects values the clock and sweeper arithmetic cannot handle.
    pub fn validate(self) -> Result<Self, ConfigError> {
        check_range("utc_offset_minutes", i64::from(self.utc_offset_minutes), -12 * 60, 14 * 60)?;
        check_range(
            "pending_order_timeout_minutes",
            self.pending_order_timeout_minutes,
            0,
            30 * 24 * 60,
        )?;
        check_range(
            "sweep_interval_secs",
            i64::try_from(self.sweep_interval_secs).unwrap_or(i64::MAX),
            1,
            24 * 3600,
        )?;
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Applies `HOST`, `PORT` and `DATABASE_URL` from `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value: port })?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        Ok(self)
    }
}

pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads the config at `path`. A missing file yields the defaults.
pub fn load_config_from_file(path: &Path) -> Result<Config, ConfigError> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let config = serde_json::from_str::<Config>(&raw)?.validate()?;
            info!(path = %path.display(), "Loaded config");
            Ok(config)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Config file not found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Config file plus process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from_file(&config_path())?
        .with_overrides(|name| std::env::var(name).ok())?
        .validate()
}
