//! Report features and the tier ladder
//!
//! Each tier definition lists only the features it adds on top of the rung
//! below it. A tier's unlocked set is the union of its own rung and every
//! lower rung, so a higher tier can never lose a feature a lower tier has.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::tier::PremiumTier;

/// One named unit of premium report content
///
/// Declaration order is the canonical order used for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    CareerRoadmap,
    CareerMatches,
    SkillGaps,
    PersonalityProfile,
    CognitiveStyle,
    WorkStyleAnalysis,
    CommunicationGuide,
    StressManagement,
    TransformationPlan,
    DailyHabits,
    ConfidenceBuilding,
    InterviewPrep,
    NetworkingStrategy,
    AiMentor,
    MarketInsights,
    DevelopmentAreas,
}

/// Number of known features
pub const FEATURE_COUNT: usize = 16;

impl Feature {
    /// Every feature in canonical order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::CareerRoadmap,
        Feature::CareerMatches,
        Feature::SkillGaps,
        Feature::PersonalityProfile,
        Feature::CognitiveStyle,
        Feature::WorkStyleAnalysis,
        Feature::CommunicationGuide,
        Feature::StressManagement,
        Feature::TransformationPlan,
        Feature::DailyHabits,
        Feature::ConfidenceBuilding,
        Feature::InterviewPrep,
        Feature::NetworkingStrategy,
        Feature::AiMentor,
        Feature::MarketInsights,
        Feature::DevelopmentAreas,
    ];

    /// Wire name (camelCase)
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::CareerRoadmap => "careerRoadmap",
            Feature::CareerMatches => "careerMatches",
            Feature::SkillGaps => "skillGaps",
            Feature::PersonalityProfile => "personalityProfile",
            Feature::CognitiveStyle => "cognitiveStyle",
            Feature::WorkStyleAnalysis => "workStyleAnalysis",
            Feature::CommunicationGuide => "communicationGuide",
            Feature::StressManagement => "stressManagement",
            Feature::TransformationPlan => "transformationPlan",
            Feature::DailyHabits => "dailyHabits",
            Feature::ConfidenceBuilding => "confidenceBuilding",
            Feature::InterviewPrep => "interviewPrep",
            Feature::NetworkingStrategy => "networkingStrategy",
            Feature::AiMentor => "aiMentor",
            Feature::MarketInsights => "marketInsights",
            Feature::DevelopmentAreas => "developmentAreas",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================================
// Tier Ladder
// ========================================

/// One rung of the tier ladder
#[derive(Debug)]
pub struct TierDefinition {
    pub tier: PremiumTier,
    /// Features this tier adds over the previous rung
    pub adds: &'static [Feature],
}

/// Tier definitions, lowest first
pub const TIER_LADDER: [TierDefinition; 3] = [
    TierDefinition {
        tier: PremiumTier::Roadmap,
        adds: &[
            Feature::CareerRoadmap,
            Feature::CareerMatches,
            Feature::SkillGaps,
        ],
    },
    TierDefinition {
        tier: PremiumTier::Personality,
        adds: &[
            Feature::PersonalityProfile,
            Feature::CognitiveStyle,
            Feature::WorkStyleAnalysis,
            Feature::CommunicationGuide,
            Feature::StressManagement,
        ],
    },
    TierDefinition {
        tier: PremiumTier::Blueprint,
        adds: &[
            Feature::TransformationPlan,
            Feature::DailyHabits,
            Feature::ConfidenceBuilding,
            Feature::InterviewPrep,
            Feature::NetworkingStrategy,
            Feature::AiMentor,
            Feature::MarketInsights,
            Feature::DevelopmentAreas,
        ],
    },
];

// ========================================
// Feature Access Table
// ========================================

/// Complete feature access table: every known feature is explicitly on or off
///
/// Computed per request, never persisted. Serializes as a JSON object with
/// all 16 feature names in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureAccess {
    flags: [bool; FEATURE_COUNT],
}

impl FeatureAccess {
    /// Table with every feature locked
    pub fn none() -> Self {
        Self {
            flags: [false; FEATURE_COUNT],
        }
    }

    /// Table for an optional tier, walking the ladder up to and including it
    pub fn for_tier(tier: Option<PremiumTier>) -> Self {
        let mut access = Self::none();
        let Some(tier) = tier else {
            return access;
        };

        for rung in TIER_LADDER.iter().take_while(|rung| rung.tier <= tier) {
            for feature in rung.adds {
                access.flags[feature.index()] = true;
            }
        }
        access
    }

    pub fn is_unlocked(&self, feature: Feature) -> bool {
        self.flags[feature.index()]
    }

    /// Unlocked features in canonical order
    pub fn unlocked(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL
            .into_iter()
            .filter(move |feature| self.is_unlocked(*feature))
    }

    pub fn unlocked_count(&self) -> usize {
        self.flags.iter().filter(|flag| **flag).count()
    }

    /// True when every feature unlocked here is also unlocked in `other`
    pub fn is_subset_of(&self, other: &FeatureAccess) -> bool {
        self.unlocked().all(|feature| other.is_unlocked(feature))
    }
}

impl Serialize for FeatureAccess {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for feature in Feature::ALL {
            map.serialize_entry(feature.as_str(), &self.is_unlocked(feature))?;
        }
        map.end()
    }
}
