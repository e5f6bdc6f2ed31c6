//! Tracing setup
//!
//! The subscriber is installed before configuration is read, filtered by
//! `RUST_LOG` or the default level. Once the config file has been resolved
//! its level is applied through a reload handle. `RUST_LOG` always wins.

use ikigai_common::config::DEFAULT_LOG_LEVEL;
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter for a plain level name, applied to this crate and `tower_http`
pub fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{},tower_http={}", level, level))
}

/// Handle for changing the log level after startup
pub struct LogLevel<S> {
    handle: reload::Handle<EnvFilter, S>,
    from_env: bool,
}

impl<S: Subscriber + 'static> LogLevel<S> {
    /// Apply the configured level
    ///
    /// Returns `Ok(false)` without changing anything when `RUST_LOG` is set.
    pub fn apply(&self, level: &str) -> Result<bool, reload::Error> {
        if self.from_env {
            return Ok(false);
        }
        self.handle.reload(filter_for(level))?;
        Ok(true)
    }
}

/// Reloadable filter layer seeded from `RUST_LOG` or [`DEFAULT_LOG_LEVEL`]
pub fn reloadable_filter<S: Subscriber>() -> (reload::Layer<EnvFilter, S>, LogLevel<S>) {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (layer, handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| filter_for(DEFAULT_LOG_LEVEL)));
    (layer, LogLevel { handle, from_env })
}

/// Install the global subscriber
pub fn init() -> LogLevel<Registry> {
    let (filter, level) = reloadable_filter();
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    level
}
