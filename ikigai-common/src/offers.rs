//! Payment offer to premium tier mapping
//!
//! This is the only place tier names are normalized. Everything written to
//! a session's `premium_tier` column comes out of [`tier_for_offer`].

use thiserror::Error;

use crate::tier::PremiumTier;

/// Offer id sold before the tiered catalog existed; it delivered the full report
pub const LEGACY_PREMIUM_REPORT: &str = "premium-report";

/// Static offer table: offer id, granted tier, legacy flag
const OFFER_TABLE: &[(&str, PremiumTier, bool)] = &[
    ("roadmap", PremiumTier::Roadmap, false),
    ("personality", PremiumTier::Personality, false),
    ("blueprint", PremiumTier::Blueprint, false),
    (LEGACY_PREMIUM_REPORT, PremiumTier::Blueprint, true),
];

/// How an offer id was mapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferSource {
    /// Listed in the current catalog
    Catalog,
    /// Listed as a legacy offer
    Legacy,
    /// Not listed; normalized to the top tier
    Unrecognized,
}

/// Tier granted by a payment offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierGrant {
    pub tier: PremiumTier,
    pub source: OfferSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfferError {
    #[error("payment event has an empty offer id")]
    Empty,
}

/// Map an offer id to the tier it grants
///
/// Matching ignores surrounding whitespace and ASCII case. Unlisted offers
/// normalize to [`PremiumTier::Blueprint`].
pub fn tier_for_offer(offer_id: &str) -> Result<TierGrant, OfferError> {
    let normalized = offer_id.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(OfferError::Empty);
    }

    let grant = OFFER_TABLE
        .iter()
        .find(|(id, _, _)| *id == normalized)
        .map(|(_, tier, legacy)| TierGrant {
            tier: *tier,
            source: if *legacy {
                OfferSource::Legacy
            } else {
                OfferSource::Catalog
            },
        })
        .unwrap_or(TierGrant {
            tier: PremiumTier::Blueprint,
            source: OfferSource::Unrecognized,
        });

    Ok(grant)
}
