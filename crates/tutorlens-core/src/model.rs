//! Prediction events, the unit of the prediction log.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::features::FeatureVector;
use crate::profile::LearnerProfile;

/// Timestamp layout used in the log and in tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted, immutable record of a scoring interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEvent {
    pub student_id: String,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub features: FeatureVector,
    pub predicted_score: f64,
    pub category: Category,
    pub learner_profile: LearnerProfile,
}

impl PredictionEvent {
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Everything about an event except the moment it is recorded.
///
/// The log store assigns the timestamp when it records a draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDraft {
    pub student_id: String,
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub features: FeatureVector,
    pub predicted_score: f64,
    pub category: Category,
    pub learner_profile: LearnerProfile,
}

impl EventDraft {
    /// Fix the draft at `at`, truncated to whole seconds to match the log format.
    pub fn stamp(self, at: NaiveDateTime) -> PredictionEvent {
        let timestamp = at.with_nanosecond(0).unwrap_or(at);
        PredictionEvent {
            student_id: self.student_id,
            timestamp,
            grade: self.grade,
            subject: self.subject,
            features: self.features,
            predicted_score: self.predicted_score,
            category: self.category,
            learner_profile: self.learner_profile,
        }
    }
}

/// Sort events newest first. Equal timestamps keep their relative order.
pub fn sort_newest_first(events: &mut [PredictionEvent]) {
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
