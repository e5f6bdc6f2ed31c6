//! Tier access resolver
//!
//! Pure functions from a session's stored tier and completion state to a
//! feature access table and the filtered detailed analysis. No I/O and no
//! logging here; callers decide how to report errors.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::DetailedAnalysis;
use crate::features::FeatureAccess;
use crate::session::TestSession;
use crate::tier::{PremiumTier, UnknownTier};

/// Reasons the resolver refuses to produce a feature table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Quiz not finished; no feature is granted whatever was purchased
    #[error("test session is not completed")]
    Incomplete,

    /// Stored tier is not a known tier. Legacy names are normalized when
    /// the tier is assigned, so reaching this is a configuration fault.
    #[error(transparent)]
    UnrecognizedTier(#[from] UnknownTier),

    /// Completed session with unlocked features but no computed results
    #[error("completed session {0} has no results")]
    MissingResults(Uuid),
}

/// Resolve the feature access table for a stored tier
///
/// # Errors
///
/// - [`AccessError::Incomplete`] when `is_completed` is false, regardless of tier
/// - [`AccessError::UnrecognizedTier`] when `premium_tier` is not an exact tier name
pub fn resolve_access(
    premium_tier: Option<&str>,
    is_completed: bool,
) -> Result<FeatureAccess, AccessError> {
    if !is_completed {
        return Err(AccessError::Incomplete);
    }

    let tier = parse_tier(premium_tier)?;
    Ok(FeatureAccess::for_tier(tier))
}

fn parse_tier(premium_tier: Option<&str>) -> Result<Option<PremiumTier>, AccessError> {
    premium_tier
        .map(str::parse::<PremiumTier>)
        .transpose()
        .map_err(AccessError::from)
}

/// Premium results payload returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumResults {
    pub session_id: Uuid,
    pub premium_tier: Option<PremiumTier>,
    pub feature_access: FeatureAccess,
    pub detailed_analysis: DetailedAnalysis,
}

/// Resolve access for a session and build its detailed analysis
pub fn resolve_premium_results(session: &TestSession) -> Result<PremiumResults, AccessError> {
    let feature_access = resolve_access(session.premium_tier.as_deref(), session.is_completed)?;
    let premium_tier = parse_tier(session.premium_tier.as_deref())?;

    let detailed_analysis = if feature_access.unlocked_count() == 0 {
        DetailedAnalysis::empty()
    } else {
        let primary_type = session
            .primary_type()
            .ok_or(AccessError::MissingResults(session.id))?;
        DetailedAnalysis::build(&feature_access, primary_type)
    };

    Ok(PremiumResults {
        session_id: session.id,
        premium_tier,
        feature_access,
        detailed_analysis,
    })
}
