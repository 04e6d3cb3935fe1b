//! # Backoffice Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (--db)                       (highest priority)        │
//! │                                                                         │
//! │  2. Environment Variables                                               │
//! │     SHOPDESK_DB_PATH=/srv/shopdesk.db                                   │
//! │     SHOPDESK_TOP_LIMIT=10                                               │
//! │                                                                         │
//! │  3. TOML Config File (--config or the platform config dir)              │
//! │     ~/.config/shopdesk/shopdesk.toml (Linux)                            │
//! │                                                                         │
//! │  4. Default Values                            (lowest priority)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/shopdesk/shopdesk.db"
//! max_connections = 5
//!
//! [log]
//! filter = "info,shopdesk=debug,sqlx=warn"
//!
//! [dashboard]
//! top_limit = 5
//! currency_symbol = "R$ "
//! seed_demo_data = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Where the store lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "shopdesk", "shopdesk")
        .map(|dirs| dirs.data_dir().join("shopdesk.db"))
        .unwrap_or_else(|| PathBuf::from("./shopdesk.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `tracing-subscriber` filter used when `RUST_LOG` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,shopdesk=debug,sqlx=warn".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            filter: default_log_filter(),
        }
    }
}

/// Presentation defaults for dashboard-style commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Default `--limit` for top lists and recent sales.
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Load demo data on startup when the store is empty.
    #[serde(default)]
    pub seed_demo_data: bool,
}

fn default_top_limit() -> usize {
    shopdesk_core::DEFAULT_TOP_LIMIT
}

fn default_currency_symbol() -> String {
    "R$ ".to_string()
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            top_limit: default_top_limit(),
            currency_symbol: default_currency_symbol(),
            seed_demo_data: false,
        }
    }
}

// =============================================================================
// Backoffice Config
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackofficeConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub log: LogSettings,

    #[serde(default)]
    pub dashboard: DashboardSettings,
}

impl BackofficeConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. `SHOPDESK_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_toml(&std::fs::read_to_string(&path)?)?;
            } else if explicit {
                return Err(ConfigError::Invalid(format!(
                    "config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `SHOPDESK_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(path) = lookup("SHOPDESK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(value) = lookup("SHOPDESK_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse("SHOPDESK_DB_MAX_CONNECTIONS", &value)?;
        }

        if let Some(filter) = lookup("SHOPDESK_LOG") {
            self.log.filter = filter;
        }

        if let Some(value) = lookup("SHOPDESK_TOP_LIMIT") {
            self.dashboard.top_limit = parse("SHOPDESK_TOP_LIMIT", &value)?;
        }

        if let Some(symbol) = lookup("SHOPDESK_CURRENCY") {
            self.dashboard.currency_symbol = symbol;
        }

        if let Some(value) = lookup("SHOPDESK_SEED_DEMO") {
            self.dashboard.seed_demo_data = match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SHOPDESK_SEED_DEMO".to_string(),
                        value,
                    })
                }
            };
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.dashboard.top_limit == 0 {
            return Err(ConfigError::Invalid(
                "dashboard.top_limit must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopdesk", "shopdesk")
            .map(|dirs| dirs.config_dir().join("shopdesk.toml"))
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
