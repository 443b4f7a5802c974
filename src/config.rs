//! Service configuration.
//!
//! Values come from defaults, optionally overlaid by a TOML file named in
//! `LEDGER_CONFIG`, then by individual `LEDGER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTTP listen address
    pub listen_addr: String,

    /// Deadline for a single unit of work (milliseconds)
    pub request_timeout_ms: u64,

    /// How long in-flight requests may drain on shutdown (milliseconds)
    pub shutdown_grace_ms: u64,

    pub log: LogConfig,

    /// CSV of `account_id,initial_balance` loaded at start-up
    pub seed_accounts_path: Option<PathBuf>,

    /// Where to write a balance snapshot on shutdown
    pub snapshot_path: Option<PathBuf>,

    /// Transfer history, loaded at start-up if the file exists and
    /// rewritten on shutdown
    pub transfer_log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            request_timeout_ms: 5_000,
            shutdown_grace_ms: 30_000,
            log: LogConfig::default(),
            seed_accounts_path: None,
            snapshot_path: None,
            transfer_log_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("LEDGER_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LEDGER_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(value) = lookup("LEDGER_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_number("LEDGER_REQUEST_TIMEOUT_MS", value)?;
        }
        if let Some(value) = lookup("LEDGER_SHUTDOWN_GRACE_MS") {
            self.shutdown_grace_ms = parse_number("LEDGER_SHUTDOWN_GRACE_MS", value)?;
        }
        if let Some(level) = lookup("LEDGER_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(value) = lookup("LEDGER_LOG_JSON") {
            self.log.json = match value.as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "LEDGER_LOG_JSON",
                        value,
                    })
                }
            };
        }
        if let Some(path) = lookup("LEDGER_SEED_ACCOUNTS") {
            self.seed_accounts_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("LEDGER_SNAPSHOT_PATH") {
            self.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("LEDGER_TRANSFER_LOG") {
            self.transfer_log_path = Some(PathBuf::from(path));
        }
        Ok(self)
    }
}

fn parse_number(key: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}
