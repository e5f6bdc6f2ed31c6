//! Runtime settings stored in the `settings` table
//!
//! Bootstrap values (paths, ports, secrets for outside providers) live in
//! the TOML config. Values an operator may tune without a redeploy live here.

use sqlx::SqlitePool;
use tracing::warn;

use crate::Result;

/// Allowed age of an internal API request timestamp
pub const DEFAULT_AUTH_WINDOW_MS: i64 = 30_000;

/// Allowed clock difference on webhook signatures
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = crate::signature::DEFAULT_TOLERANCE_SECS;

/// Settings read from the database at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub auth_window_ms: i64,
    pub webhook_tolerance_secs: i64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            auth_window_ms: DEFAULT_AUTH_WINDOW_MS,
            webhook_tolerance_secs: DEFAULT_WEBHOOK_TOLERANCE_SECS,
        }
    }
}

impl RuntimeSettings {
    /// Load settings, falling back to defaults for missing or invalid values
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        Ok(Self {
            auth_window_ms: get_i64_setting(pool, "auth_window_ms", DEFAULT_AUTH_WINDOW_MS)
                .await?,
            webhook_tolerance_secs: get_i64_setting(
                pool,
                "webhook_tolerance_secs",
                DEFAULT_WEBHOOK_TOLERANCE_SECS,
            )
            .await?,
        })
    }
}

/// Read a positive integer setting
async fn get_i64_setting(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    let Some(raw) = value.flatten() else {
        return Ok(default);
    };

    match raw.trim().parse::<i64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => {
            warn!("Invalid value '{}' for setting '{}', using default {}", raw, key, default);
            Ok(default)
        }
    }
}
