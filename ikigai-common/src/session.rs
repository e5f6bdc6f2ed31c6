//! Test session record
//!
//! The quiz flow owns these rows; the premium services only read completion
//! state and results, and write the purchased tier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Computed quiz results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    /// Personality classification computed by the quiz scorer
    pub primary_type: String,
}

/// One user's quiz attempt and its purchase state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSession {
    pub id: Uuid,
    pub is_completed: bool,
    /// Raw stored tier name. Kept unparsed so the resolver decides what
    /// an unrecognized value means.
    pub premium_tier: Option<String>,
    pub results: Option<TestResults>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestSession {
    /// New, unfinished session with no purchase
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            is_completed: false,
            premium_tier: None,
            results: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn primary_type(&self) -> Option<&str> {
        self.results.as_ref().map(|r| r.primary_type.as_str())
    }
}
