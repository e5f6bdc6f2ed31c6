//! Aggregate counts for the admin statistics endpoint

use serde::Serialize;
use sqlx::SqlitePool;

use crate::Result;

/// Sessions per stored tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub none: i64,
    pub roadmap: i64,
    pub personality: i64,
    pub blueprint: i64,
    /// Stored values that are not a known tier (should stay zero after migration)
    pub unrecognized: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub tiers: TierCounts,
    pub payment_events: i64,
    pub upgrades: i64,
}

/// Compute statistics in two aggregate queries
pub async fn load_stats(pool: &SqlitePool) -> Result<SessionStats> {
    let (total, completed, none, roadmap, personality, blueprint): (i64, i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(is_completed), 0),
                COALESCE(SUM(CASE WHEN premium_tier IS NULL THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN premium_tier = 'roadmap' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN premium_tier = 'personality' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN premium_tier = 'blueprint' THEN 1 ELSE 0 END), 0)
            FROM test_sessions
            "#,
        )
        .fetch_one(pool)
        .await?;

    let (payment_events, upgrades): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN outcome = 'upgraded' THEN 1 ELSE 0 END), 0)
        FROM payment_events
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(SessionStats {
        total_sessions: total,
        completed_sessions: completed,
        tiers: TierCounts {
            none,
            roadmap,
            personality,
            blueprint,
            unrecognized: total - none - roadmap - personality - blueprint,
        },
        payment_events,
        upgrades,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_database;
    use crate::db::sessions::insert_session;
    use crate::session::TestSession;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("ikigai.db")).await.unwrap();

        assert_eq!(load_stats(&pool).await.unwrap(), SessionStats::default());
    }

    #[tokio::test]
    async fn test_counts_by_tier() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("ikigai.db")).await.unwrap();

        for (tier, completed) in [
            (None, false),
            (Some("roadmap"), true),
            (Some("blueprint"), true),
            (Some("blueprint"), true),
            (Some("mystery"), true),
        ] {
            let mut session = TestSession::new(Uuid::new_v4());
            session.premium_tier = tier.map(str::to_string);
            session.is_completed = completed;
            insert_session(&pool, &session).await.unwrap();
        }

        let stats = load_stats(&pool).await.unwrap();
        assert_eq!(stats.total_sessions, 5);
        assert_eq!(stats.completed_sessions, 4);
        assert_eq!(stats.tiers.none, 1);
        assert_eq!(stats.tiers.roadmap, 1);
        assert_eq!(stats.tiers.personality, 0);
        assert_eq!(stats.tiers.blueprint, 2);
        assert_eq!(stats.tiers.unrecognized, 1);
    }
}
