//! Detailed analysis content for unlocked features
//!
//! One section per unlocked feature, personalized with the session's
//! primary type. Locked features produce no section at all.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::features::{Feature, FeatureAccess};

/// Report content for one feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSection {
    pub title: String,
    pub summary: String,
    pub highlights: Vec<String>,
}

/// Sections keyed by feature name, in canonical feature order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DetailedAnalysis {
    sections: BTreeMap<Feature, AnalysisSection>,
}

impl DetailedAnalysis {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build sections for exactly the unlocked features
    pub fn build(access: &FeatureAccess, primary_type: &str) -> Self {
        let sections = access
            .unlocked()
            .map(|feature| (feature, section_for(feature, primary_type)))
            .collect();
        Self { sections }
    }

    pub fn get(&self, feature: Feature) -> Option<&AnalysisSection> {
        self.sections.get(&feature)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.sections.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

const TYPE_PLACEHOLDER: &str = "{type}";

struct CatalogEntry {
    title: &'static str,
    summary: &'static str,
    highlights: &'static [&'static str],
}

fn section_for(feature: Feature, primary_type: &str) -> AnalysisSection {
    let entry = catalog_entry(feature);
    AnalysisSection {
        title: entry.title.to_string(),
        summary: entry.summary.replace(TYPE_PLACEHOLDER, primary_type),
        highlights: entry.highlights.iter().map(|h| h.to_string()).collect(),
    }
}

fn catalog_entry(feature: Feature) -> CatalogEntry {
    match feature {
        Feature::CareerRoadmap => CatalogEntry {
            title: "Career Roadmap",
            summary: "A staged path from where a {type} stands today to work that pays, matters and energizes.",
            highlights: &[
                "First 90 days: explore and validate",
                "Months 4-12: build proof of skill",
                "Year 2: commit and specialize",
            ],
        },
        Feature::CareerMatches => CatalogEntry {
            title: "Career Matches",
            summary: "Roles where the strengths of a {type} overlap with what the market rewards.",
            highlights: &[
                "Ranked by fit with your answers",
                "Each match lists the strengths it draws on",
            ],
        },
        Feature::SkillGaps => CatalogEntry {
            title: "Skill Gaps",
            summary: "The skills standing between a {type} and the top career matches.",
            highlights: &[
                "Gaps ordered by impact",
                "Suggested learning format for each gap",
            ],
        },
        Feature::PersonalityProfile => CatalogEntry {
            title: "Personality Profile",
            summary: "How the {type} profile shows up in motivation, values and decisions.",
            highlights: &["Core motivators", "Values in tension", "Blind spots"],
        },
        Feature::CognitiveStyle => CatalogEntry {
            title: "Cognitive Style",
            summary: "How a {type} takes in information and reaches conclusions.",
            highlights: &[
                "Preferred problem-solving mode",
                "Conditions for deep focus",
            ],
        },
        Feature::WorkStyleAnalysis => CatalogEntry {
            title: "Work Style Analysis",
            summary: "The environments, rhythms and team shapes where a {type} does best.",
            highlights: &[
                "Ideal team size",
                "Autonomy versus structure",
                "Pace and deadlines",
            ],
        },
        Feature::CommunicationGuide => CatalogEntry {
            title: "Communication Guide",
            summary: "How a {type} comes across and how to adapt for different audiences.",
            highlights: &["Default communication style", "Adjustments for conflict"],
        },
        Feature::StressManagement => CatalogEntry {
            title: "Stress Management",
            summary: "The early warning signs of overload for a {type} and what restores balance.",
            highlights: &["Common stress triggers", "Recovery practices that fit"],
        },
        Feature::TransformationPlan => CatalogEntry {
            title: "Transformation Plan",
            summary: "A 12-month plan that turns the {type} profile into concrete change.",
            highlights: &[
                "Quarterly milestones",
                "Checkpoints for adjusting course",
            ],
        },
        Feature::DailyHabits => CatalogEntry {
            title: "Daily Habits",
            summary: "Small daily practices chosen for how a {type} builds momentum.",
            highlights: &["Morning anchor habit", "Weekly reflection prompt"],
        },
        Feature::ConfidenceBuilding => CatalogEntry {
            title: "Confidence Building",
            summary: "Exercises that help a {type} act on strengths before feeling ready.",
            highlights: &["Evidence journal", "Graduated stretch goals"],
        },
        Feature::InterviewPrep => CatalogEntry {
            title: "Interview Preparation",
            summary: "Stories and answers that let a {type} show strengths convincingly.",
            highlights: &[
                "Strength stories to prepare",
                "Questions to ask the interviewer",
            ],
        },
        Feature::NetworkingStrategy => CatalogEntry {
            title: "Networking Strategy",
            summary: "A way of building professional relationships that suits a {type}.",
            highlights: &["Where to find your people", "Follow-up cadence"],
        },
        Feature::AiMentor => CatalogEntry {
            title: "AI Mentor",
            summary: "Guided prompts tuned to the {type} profile for ongoing coaching.",
            highlights: &["Weekly check-in prompts", "Decision review prompts"],
        },
        Feature::MarketInsights => CatalogEntry {
            title: "Market Insights",
            summary: "Demand trends for the fields that suit a {type}.",
            highlights: &["Growing fields", "Skills with rising demand"],
        },
        Feature::DevelopmentAreas => CatalogEntry {
            title: "Development Areas",
            summary: "Where a {type} has the most room to grow, and how to start.",
            highlights: &["Top three growth areas", "First step for each"],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::PremiumTier;

    #[test]
    fn test_no_tier_builds_empty_analysis() {
        let analysis = DetailedAnalysis::build(&FeatureAccess::none(), "Visionary");
        assert!(analysis.is_empty());
        assert_eq!(serde_json::to_string(&analysis).unwrap(), "{}");
    }

    #[test]
    fn test_one_section_per_unlocked_feature() {
        for tier in PremiumTier::ALL {
            let access = FeatureAccess::for_tier(Some(tier));
            let analysis = DetailedAnalysis::build(&access, "Visionary");

            assert_eq!(analysis.len(), access.unlocked_count());
            for feature in Feature::ALL {
                assert_eq!(analysis.get(feature).is_some(), access.is_unlocked(feature));
            }
        }
    }

    #[test]
    fn test_sections_are_personalized() {
        let access = FeatureAccess::for_tier(Some(PremiumTier::Roadmap));
        let analysis = DetailedAnalysis::build(&access, "Visionary");

        let section = analysis.get(Feature::CareerRoadmap).unwrap();
        assert!(section.summary.contains("Visionary"));
        assert!(!section.summary.contains(TYPE_PLACEHOLDER));
        assert!(!section.highlights.is_empty());
    }

    #[test]
    fn test_every_catalog_entry_is_complete() {
        for feature in Feature::ALL {
            let entry = catalog_entry(feature);
            assert!(!entry.title.is_empty());
            assert!(entry.summary.contains(TYPE_PLACEHOLDER), "{} summary not templated", feature);
            assert!(!entry.highlights.is_empty());
        }
    }

    #[test]
    fn test_serializes_keyed_by_feature_name() {
        let access = FeatureAccess::for_tier(Some(PremiumTier::Roadmap));
        let analysis = DetailedAnalysis::build(&access, "Visionary");
        let json = serde_json::to_value(&analysis).unwrap();

        assert_eq!(json.as_object().unwrap().len(), 3);
        assert_eq!(json["careerMatches"]["title"], "Career Matches");
        assert!(json.get("personalityProfile").is_none());
    }
}
