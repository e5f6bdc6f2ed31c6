//! Test session queries

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::session::{TestResults, TestSession};
use crate::{Error, Result};

type SessionRow = (
    String,
    bool,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn from_row(row: SessionRow) -> Result<TestSession> {
    let (id, is_completed, premium_tier, primary_type, created_at, updated_at) = row;
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Integrity(format!("session id '{}' is not a UUID: {}", id, e)))?;

    Ok(TestSession {
        id,
        is_completed,
        premium_tier,
        results: primary_type.map(|primary_type| TestResults { primary_type }),
        created_at,
        updated_at,
    })
}

/// Load a session by id
pub async fn load_session(pool: &SqlitePool, id: Uuid) -> Result<Option<TestSession>> {
    let row: Option<SessionRow> = sqlx::query_as(
        "SELECT id, is_completed, premium_tier, primary_type, created_at, updated_at
         FROM test_sessions WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(from_row).transpose()
}

/// Insert a session record
///
/// Used by the quiz flow and by tooling; the premium services never create sessions.
pub async fn insert_session(pool: &SqlitePool, session: &TestSession) -> Result<()> {
    sqlx::query(
        "INSERT INTO test_sessions (id, is_completed, premium_tier, primary_type, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(session.id.to_string())
    .bind(session.is_completed)
    .bind(session.premium_tier.as_deref())
    .bind(session.primary_type())
    .bind(session.created_at)
    .bind(session.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a session completed and store its results in one statement
pub async fn complete_session(pool: &SqlitePool, id: Uuid, results: &TestResults) -> Result<()> {
    let updated = sqlx::query(
        "UPDATE test_sessions SET is_completed = 1, primary_type = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&results.primary_type)
    .bind(Utc::now())
    .bind(id.to_string())
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::NotFound(format!("session {}", id)));
    }
    Ok(())
}
