//! Premium tiers
//!
//! Tiers are totally ordered: `Roadmap < Personality < Blueprint`. The
//! derived `Ord` follows declaration order and matches [`PremiumTier::rank`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A purchased premium level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumTier {
    Roadmap,
    Personality,
    Blueprint,
}

impl PremiumTier {
    /// All tiers, lowest first
    pub const ALL: [PremiumTier; 3] = [
        PremiumTier::Roadmap,
        PremiumTier::Personality,
        PremiumTier::Blueprint,
    ];

    /// Wire/storage name of the tier
    pub fn as_str(self) -> &'static str {
        match self {
            PremiumTier::Roadmap => "roadmap",
            PremiumTier::Personality => "personality",
            PremiumTier::Blueprint => "blueprint",
        }
    }

    /// Numeric rank used for conditional upgrades in SQL.
    ///
    /// No tier ranks 0, so every real tier is strictly greater.
    pub fn rank(self) -> i64 {
        match self {
            PremiumTier::Roadmap => 1,
            PremiumTier::Personality => 2,
            PremiumTier::Blueprint => 3,
        }
    }

    /// Rank of an optional tier (absent tier ranks 0)
    pub fn rank_of(tier: Option<PremiumTier>) -> i64 {
        tier.map(PremiumTier::rank).unwrap_or(0)
    }
}

impl fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or supplied tier name is not one of the known tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTier(pub String);

impl fmt::Display for UnknownTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized premium tier '{}'", self.0)
    }
}

impl std::error::Error for UnknownTier {}

impl FromStr for PremiumTier {
    type Err = UnknownTier;

    /// Strict parse: exact lowercase names only, no legacy aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roadmap" => Ok(PremiumTier::Roadmap),
            "personality" => Ok(PremiumTier::Personality),
            "blueprint" => Ok(PremiumTier::Blueprint),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}
