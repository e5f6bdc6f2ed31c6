//! seed-sessions - populate a database with completed test sessions
//!
//! Local development helper. Tiers cycle through none, roadmap,
//! personality and blueprint so every access level can be exercised.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ikigai_common::config::default_database_path;
use ikigai_common::db::{init_database, insert_session};
use ikigai_common::{PremiumTier, TestResults, TestSession};
use tracing::info;
use uuid::Uuid;

const PRIMARY_TYPES: [&str; 4] = ["Visionary", "Builder", "Guide", "Explorer"];

#[derive(Parser, Debug)]
#[command(name = "seed-sessions")]
#[command(about = "Create completed Ikigai Compass test sessions for local testing")]
struct Args {
    /// SQLite database file (created if missing)
    #[arg(short, long, env = "IKIGAI_DATABASE")]
    database: Option<PathBuf>,

    /// Number of sessions to create
    #[arg(short, long, default_value_t = 8)]
    count: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let db_path = match args.database {
        Some(path) => path,
        None => default_database_path().context("No database path given")?,
    };

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Seeding {} sessions into {}", args.count, db_path.display());

    let tiers: Vec<Option<PremiumTier>> = std::iter::once(None)
        .chain(PremiumTier::ALL.into_iter().map(Some))
        .collect();

    for i in 0..args.count {
        let tier = tiers[i % tiers.len()];
        let mut session = TestSession::new(Uuid::new_v4());
        session.is_completed = true;
        session.premium_tier = tier.map(|t| t.as_str().to_string());
        session.results = Some(TestResults {
            primary_type: PRIMARY_TYPES[i % PRIMARY_TYPES.len()].to_string(),
        });

        insert_session(&pool, &session)
            .await
            .with_context(|| format!("Failed to insert session {}", session.id))?;

        println!(
            "{}\t{}",
            session.id,
            tier.map(PremiumTier::as_str).unwrap_or("none")
        );
    }

    pool.close().await;
    Ok(())
}
