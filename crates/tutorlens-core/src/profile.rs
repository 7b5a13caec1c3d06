//! Behavioral learner profiles.
//!
//! Profiles come from an ordered rule cascade. Rules overlap, so the order of
//! [`PROFILE_RULES`] decides the outcome and must not be rearranged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Five mutually exclusive behavioral archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LearnerProfile {
    #[serde(rename = "Fast but Careless 🐇")]
    FastCareless,
    #[serde(rename = "Slow and Careful 🐢")]
    SlowCareful,
    #[serde(rename = "Confused Learner 🤔")]
    ConfusedLearner,
    #[serde(rename = "Focused Performer 🎯")]
    FocusedPerformer,
    #[serde(rename = "General Learner")]
    General,
}

impl LearnerProfile {
    pub const ALL: [LearnerProfile; 5] = [
        LearnerProfile::FastCareless,
        LearnerProfile::SlowCareful,
        LearnerProfile::ConfusedLearner,
        LearnerProfile::FocusedPerformer,
        LearnerProfile::General,
    ];

    /// Label without the marker.
    pub fn name(self) -> &'static str {
        match self {
            LearnerProfile::FastCareless => "Fast but Careless",
            LearnerProfile::SlowCareful => "Slow and Careful",
            LearnerProfile::ConfusedLearner => "Confused Learner",
            LearnerProfile::FocusedPerformer => "Focused Performer",
            LearnerProfile::General => "General Learner",
        }
    }

    /// Full label as shown to users and persisted in the log.
    pub fn label(self) -> &'static str {
        match self {
            LearnerProfile::FastCareless => "Fast but Careless 🐇",
            LearnerProfile::SlowCareful => "Slow and Careful 🐢",
            LearnerProfile::ConfusedLearner => "Confused Learner 🤔",
            LearnerProfile::FocusedPerformer => "Focused Performer 🎯",
            LearnerProfile::General => "General Learner",
        }
    }
}

impl fmt::Display for LearnerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LearnerProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| {
                trimmed == p.label()
                    || trimmed.eq_ignore_ascii_case(p.name())
                    || trimmed.starts_with(p.name())
            })
            .ok_or_else(|| format!("unknown learner profile: {s}"))
    }
}

pub type Rule = fn(&FeatureVector) -> bool;

/// Evaluated top to bottom; the first matching rule wins.
///
/// Every comparison is strict, so a value sitting exactly on a bound
/// (e.g. `duration == 1800`) never satisfies that condition.
pub const PROFILE_RULES: [(LearnerProfile, Rule); 4] = [
    (LearnerProfile::FastCareless, is_fast_careless),
    (LearnerProfile::SlowCareful, is_slow_careful),
    (LearnerProfile::ConfusedLearner, is_confused),
    (LearnerProfile::FocusedPerformer, is_focused),
];

fn is_fast_careless(f: &FeatureVector) -> bool {
    f.duration < 1800.0 && f.attempt_count < 3.0 && f.concentrating < 0.5 && f.frustrated > 0.3
}

fn is_slow_careful(f: &FeatureVector) -> bool {
    f.duration > 1800.0 && f.hint_count < 5.0 && f.concentrating > 0.6 && f.efficiency_indicator > 0.6
}

fn is_confused(f: &FeatureVector) -> bool {
    f.hint_count > 6.0 && f.confused > 0.3 && f.bottom_hint > 5.0 && f.confidence_balance < 0.4
}

fn is_focused(f: &FeatureVector) -> bool {
    f.concentrating > 0.6
        && f.confidence_balance > 0.6
        && f.hint_dependency < 0.3
        && f.efficiency_indicator > 0.6
}

/// Classify a feature vector into a learner profile.
pub fn classify_profile(features: &FeatureVector) -> LearnerProfile {
    PROFILE_RULES
        .iter()
        .find(|(_, matches)| matches(features))
        .map(|(profile, _)| *profile)
        .unwrap_or(LearnerProfile::General)
}
