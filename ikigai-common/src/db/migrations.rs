//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in the `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field have already run them
//! 2. **Always add new migrations** - one function per change, bump `CURRENT_SCHEMA_VERSION`
//! 3. **Keep them idempotent** - a migration may run against partially migrated data

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::offers::LEGACY_PREMIUM_REPORT;

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: Normalize stored premium tiers
///
/// Sessions bought before the tiered catalog store `premium-report`. That
/// purchase delivered the full report, so it becomes `blueprint`. Empty
/// strings mean nothing was bought. Any other unknown value is left as is
/// and reported by the resolver.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Normalize legacy premium tiers");

    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='test_sessions'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        info!("  test_sessions table doesn't exist yet - skipping migration");
        return Ok(());
    }

    let cleared = sqlx::query(
        "UPDATE test_sessions SET premium_tier = NULL, updated_at = CURRENT_TIMESTAMP
         WHERE premium_tier IS NOT NULL AND TRIM(premium_tier) = ''",
    )
    .execute(pool)
    .await?
    .rows_affected();

    let normalized = sqlx::query(
        "UPDATE test_sessions SET premium_tier = 'blueprint', updated_at = CURRENT_TIMESTAMP
         WHERE premium_tier = ?",
    )
    .bind(LEGACY_PREMIUM_REPORT)
    .execute(pool)
    .await?
    .rows_affected();

    let unrecognized: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM test_sessions
         WHERE premium_tier IS NOT NULL
           AND premium_tier NOT IN ('roadmap', 'personality', 'blueprint')",
    )
    .fetch_one(pool)
    .await?;

    info!(
        "  ✓ Normalized {} legacy '{}' tiers to blueprint, cleared {} empty tiers",
        normalized, LEGACY_PREMIUM_REPORT, cleared
    );
    if unrecognized > 0 {
        warn!(
            "  {} sessions store an unrecognized premium tier; left unchanged",
            unrecognized
        );
    }
    Ok(())
}
