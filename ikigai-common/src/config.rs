//! Bootstrap configuration
//!
//! Two-tier configuration:
//! 1. **TOML bootstrap**: database path, bind address, port, logging,
//!    webhook secret, cache capacity (read once at startup)
//! 2. **Database runtime**: tunable values in the `settings` table
//!    (see [`crate::db::settings`])
//!
//! Priority for each bootstrap value:
//! 1. Command-line argument (clap, with `IKIGAI_*` env fallbacks)
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing config file is not an error: a warning is logged and the
//! compiled defaults apply.

use crate::db::settings::RuntimeSettings;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name under the platform config/data dirs
pub const APP_DIR_NAME: &str = "ikigai-compass";

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "IKIGAI_CONFIG";

pub const DEFAULT_PORT: u16 = 5740;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Contents of `config.toml`
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to SQLite database file
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub webhook: WebhookConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Overrides for the `auth_window_ms` database setting
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub window_ms: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// HMAC secret shared with the payment provider
    pub secret: Option<String>,
    /// Overrides the `webhook_tolerance_secs` database setting
    pub tolerance_secs: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: Option<usize>,
}

/// Values supplied on the command line or through `IKIGAI_*` variables
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub webhook_secret: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub database_path: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    /// `None` disables the payment webhook
    pub webhook_secret: Option<String>,
    pub webhook_tolerance_secs: Option<i64>,
    pub auth_window_ms: Option<i64>,
    pub cache_capacity: usize,
}

impl BootstrapConfig {
    /// Merge CLI overrides, the TOML file and compiled defaults
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Result<Self> {
        let database_path = match cli.database_path.or(toml.database_path) {
            Some(path) => path,
            None => default_database_path()?,
        };

        let webhook_secret = cli
            .webhook_secret
            .or(toml.webhook.secret)
            .filter(|s| !s.trim().is_empty());

        let cache_capacity = match toml.cache.capacity {
            Some(0) => {
                warn!("cache.capacity = 0 is invalid, using {}", DEFAULT_CACHE_CAPACITY);
                DEFAULT_CACHE_CAPACITY
            }
            Some(n) => n,
            None => DEFAULT_CACHE_CAPACITY,
        };

        Ok(Self {
            database_path,
            bind_address: cli
                .bind_address
                .or(toml.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: cli.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            log_level: cli.log_level.unwrap_or(toml.logging.level),
            webhook_secret,
            webhook_tolerance_secs: toml.webhook.tolerance_secs.filter(|v| *v > 0),
            auth_window_ms: toml.auth.window_ms.filter(|v| *v > 0),
            cache_capacity,
        })
    }

    /// Apply TOML overrides on top of the database runtime settings
    pub fn apply_overrides(&self, mut settings: RuntimeSettings) -> RuntimeSettings {
        if let Some(window) = self.auth_window_ms {
            settings.auth_window_ms = window;
        }
        if let Some(tolerance) = self.webhook_tolerance_secs {
            settings.webhook_tolerance_secs = tolerance;
        }
        settings
    }
}

/// Locate the config file
///
/// `--config` wins, then `IKIGAI_CONFIG`, then
/// `<config dir>/ikigai-compass/config.toml`.
pub fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Load the TOML file, falling back to defaults when it does not exist
///
/// A file that exists but fails to parse is a configuration error.
pub fn load_toml(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// `<data local dir>/ikigai-compass/ikigai.db`
pub fn default_database_path() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME).join("ikigai.db"))
        .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
}
