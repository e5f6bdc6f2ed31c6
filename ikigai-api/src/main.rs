//! ikigai-api - Ikigai Compass premium access service
//!
//! Resolves premium report access for quiz sessions and applies tier
//! purchases delivered by the payment provider's webhook.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ikigai_common::api::auth::load_shared_secret;
use ikigai_common::config::{
    config_file_path, load_toml, BootstrapConfig, CliOverrides, TomlConfig,
};
use ikigai_common::db::{init_database, RuntimeSettings};
use ikigai_api::{build_router, logging, AppState};
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for ikigai-api
#[derive(Parser, Debug)]
#[command(name = "ikigai-api")]
#[command(about = "Premium access service for Ikigai Compass")]
#[command(version)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = "IKIGAI_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "IKIGAI_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "IKIGAI_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, env = "IKIGAI_BIND")]
    bind: Option<String>,

    /// HMAC secret for payment webhooks
    #[arg(long, env = "IKIGAI_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "IKIGAI_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing first so config loading can log
    let log_level = logging::init();

    // Build identification before any config or database work
    info!(
        "Starting Ikigai Compass premium API (ikigai-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config_path = config_file_path(args.config.as_deref());
    let toml_config = match &config_path {
        Some(path) => load_toml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            warn!("No config directory available, using defaults");
            TomlConfig::default()
        }
    };

    let config = BootstrapConfig::resolve(
        CliOverrides {
            database_path: args.database,
            bind_address: args.bind,
            port: args.port,
            webhook_secret: args.webhook_secret,
            log_level: args.log_level,
        },
        toml_config,
    )
    .context("Failed to resolve configuration")?;

    if log_level
        .apply(&config.log_level)
        .context("Failed to apply log level")?
    {
        info!("Log level: {}", config.log_level);
    } else {
        info!("Log level taken from RUST_LOG");
    }

    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    info!("✓ Database ready");

    let shared_secret = load_shared_secret(&pool)
        .await
        .context("Failed to load API shared secret")?;
    if shared_secret == 0 {
        info!("API authentication disabled (shared_secret = 0)");
    } else {
        info!("✓ Loaded shared secret for API authentication");
    }

    let settings = config.apply_overrides(
        RuntimeSettings::load(&pool)
            .await
            .context("Failed to load runtime settings")?,
    );
    info!(
        "Auth window {}ms, webhook tolerance {}s, cache capacity {}",
        settings.auth_window_ms, settings.webhook_tolerance_secs, config.cache_capacity
    );

    if config.webhook_secret.is_none() {
        warn!("No webhook secret configured; payment webhook will answer 503");
    }

    let state = AppState::new(pool.clone(), shared_secret)
        .with_settings(settings)
        .with_webhook_secret(config.webhook_secret.clone())
        .with_cache_capacity(config.cache_capacity);
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("ikigai-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
