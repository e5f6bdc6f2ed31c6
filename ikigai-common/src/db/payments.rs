//! Tier assignment from payment events
//!
//! One transaction per delivery:
//! 1. Insert the ledger row (`INSERT OR IGNORE ... SELECT` from the session,
//!    so a missing session inserts nothing). Being a write, this statement
//!    takes SQLite's write lock before anything is read.
//! 2. Nothing inserted means a duplicate delivery or an unknown session.
//! 3. Otherwise upgrade the session only if the stored tier ranks lower.
//!
//! The rank comparison lives in the UPDATE's WHERE clause, so a concurrent
//! delivery can never overwrite a higher tier with a lower one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::tier::PremiumTier;
use crate::{Error, Result};

/// SQL expression ranking the stored `premium_tier` column.
///
/// Must agree with [`PremiumTier::rank`]. Unknown names rank 0.
pub const TIER_RANK_SQL: &str = "CASE premium_tier \
     WHEN 'roadmap' THEN 1 \
     WHEN 'personality' THEN 2 \
     WHEN 'blueprint' THEN 3 \
     ELSE 0 END";

/// A verified payment event ready to be applied
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub event_id: String,
    pub session_id: Uuid,
    pub offer_id: String,
    pub tier: PremiumTier,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// What applying a payment event did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AssignmentOutcome {
    /// Session tier raised
    Upgraded {
        previous: Option<String>,
        tier: PremiumTier,
    },
    /// Session already held this tier or a higher one
    Unchanged { current: Option<String> },
    /// This event id was applied before
    Duplicate { current: Option<String> },
}

impl AssignmentOutcome {
    /// Stored tier after the event was applied
    pub fn current_tier(&self) -> Option<&str> {
        match self {
            AssignmentOutcome::Upgraded { tier, .. } => Some(tier.as_str()),
            AssignmentOutcome::Unchanged { current } | AssignmentOutcome::Duplicate { current } => {
                current.as_deref()
            }
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            AssignmentOutcome::Upgraded { .. } => "upgraded",
            AssignmentOutcome::Unchanged { .. } => "unchanged",
            AssignmentOutcome::Duplicate { .. } => "duplicate",
        }
    }
}

/// Apply a payment event to its session
///
/// # Errors
///
/// [`Error::NotFound`] if the session does not exist. The transaction is
/// rolled back, so a retry after the session is created still applies.
pub async fn assign_tier(pool: &SqlitePool, record: &PaymentRecord) -> Result<AssignmentOutcome> {
    let session_id = record.session_id.to_string();
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO payment_events
             (event_id, session_id, offer_id, granted_tier, outcome, amount_cents, currency, received_at)
         SELECT ?, id, ?, ?, 'unchanged', ?, ?, ? FROM test_sessions WHERE id = ?",
    )
    .bind(&record.event_id)
    .bind(&record.offer_id)
    .bind(record.tier.as_str())
    .bind(record.amount_cents)
    .bind(record.currency.as_deref())
    .bind(record.received_at)
    .bind(&session_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let current: Option<Option<String>> =
        sqlx::query_scalar("SELECT premium_tier FROM test_sessions WHERE id = ?")
            .bind(&session_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(current) = current else {
        tx.rollback().await?;
        return Err(Error::NotFound(format!("session {}", record.session_id)));
    };

    if inserted == 0 {
        tx.rollback().await?;
        info!(
            "Payment event {} already applied to session {}",
            record.event_id, record.session_id
        );
        return Ok(AssignmentOutcome::Duplicate { current });
    }

    let upgraded = sqlx::query(&format!(
        "UPDATE test_sessions SET premium_tier = ?, updated_at = ?
         WHERE id = ? AND ({}) < ?",
        TIER_RANK_SQL
    ))
    .bind(record.tier.as_str())
    .bind(record.received_at)
    .bind(&session_id)
    .bind(record.tier.rank())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let outcome = if upgraded > 0 {
        sqlx::query("UPDATE payment_events SET outcome = 'upgraded' WHERE event_id = ?")
            .bind(&record.event_id)
            .execute(&mut *tx)
            .await?;

        AssignmentOutcome::Upgraded {
            previous: current,
            tier: record.tier,
        }
    } else {
        AssignmentOutcome::Unchanged { current }
    };

    tx.commit().await?;
    Ok(outcome)
}
