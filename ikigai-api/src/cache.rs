//! In-process cache of resolved premium results
//!
//! Keyed by `(session id, tier)`: the session row is always read, so a tier
//! change simply misses. Entries for a session are also dropped explicitly
//! after a webhook upgrade.

use std::collections::HashMap;
use std::sync::Arc;

use ikigai_common::{PremiumResults, PremiumTier};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

type CacheKey = (Uuid, PremiumTier);

pub struct ResultsCache {
    capacity: usize,
    entries: RwLock<HashMap<CacheKey, Arc<PremiumResults>>>,
}

impl ResultsCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, session_id: Uuid, tier: PremiumTier) -> Option<Arc<PremiumResults>> {
        self.entries.read().await.get(&(session_id, tier)).cloned()
    }

    /// Store results and hand back the shared copy
    ///
    /// Results without a tier are returned uncached. A full cache is cleared
    /// before the insert.
    pub async fn insert(&self, results: PremiumResults) -> Arc<PremiumResults> {
        let results = Arc::new(results);
        let Some(tier) = results.premium_tier else {
            return results;
        };

        let mut entries = self.entries.write().await;
        let key = (results.session_id, tier);
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            debug!("Results cache full ({} entries), clearing", entries.len());
            entries.clear();
        }
        entries.insert(key, Arc::clone(&results));
        results
    }

    /// Drop every entry for a session; returns how many were removed
    pub async fn invalidate(&self, session_id: Uuid) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(id, _), _| *id != session_id);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ikigai_common::{resolve_premium_results, TestResults, TestSession};

    fn results_for(tier: Option<&str>) -> PremiumResults {
        let mut session = TestSession::new(Uuid::new_v4());
        session.is_completed = true;
        session.premium_tier = tier.map(str::to_string);
        session.results = Some(TestResults {
            primary_type: "Explorer".to_string(),
        });
        resolve_premium_results(&session).unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let cache = ResultsCache::new(8);
        let results = results_for(Some("personality"));
        let id = results.session_id;

        cache.insert(results).await;

        assert!(cache.get(id, PremiumTier::Personality).await.is_some());
        assert!(cache.get(id, PremiumTier::Blueprint).await.is_none());
    }

    #[tokio::test]
    async fn test_untiered_results_not_cached() {
        let cache = ResultsCache::new(8);
        let shared = cache.insert(results_for(None)).await;

        assert_eq!(shared.feature_access.unlocked_count(), 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_drops_all_tiers_for_session() {
        let cache = ResultsCache::new(8);
        let roadmap = results_for(Some("roadmap"));
        let id = roadmap.session_id;
        let mut blueprint = results_for(Some("blueprint"));
        blueprint.session_id = id;

        cache.insert(roadmap).await;
        cache.insert(blueprint).await;
        cache.insert(results_for(Some("roadmap"))).await;

        assert_eq!(cache.invalidate(id).await, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_full_cache_is_cleared() {
        let cache = ResultsCache::new(2);
        cache.insert(results_for(Some("roadmap"))).await;
        cache.insert(results_for(Some("roadmap"))).await;
        assert_eq!(cache.len().await, 2);

        let third = results_for(Some("blueprint"));
        let id = third.session_id;
        cache.insert(third).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.get(id, PremiumTier::Blueprint).await.is_some());
    }
}
