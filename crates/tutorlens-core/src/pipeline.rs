//! The prediction pipeline.
//!
//! One call takes a student's telemetry through the scorer, both classifiers
//! and the recommendation lookups. Persisting the result is left to the
//! caller, which records [`Prediction::draft`] in the prediction log.

use serde::Serialize;

use crate::category::{categorize, Category, CategoryInfo};
use crate::difficulty::{map_difficulty, Difficulty};
use crate::error::PredictError;
use crate::features::{FeatureVector, FeatureWarning};
use crate::model::EventDraft;
use crate::profile::{classify_profile, LearnerProfile};
use crate::recommend::Recommendation;
use crate::scorer::Scorer;

/// What the caller knows about one student interaction.
#[derive(Debug, Clone)]
pub struct PredictionInput {
    pub student_id: String,
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub features: FeatureVector,
}

/// The outcome of scoring one interaction.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub student_id: String,
    pub grade: Option<String>,
    pub subject: Option<String>,
    pub features: FeatureVector,
    pub score: f64,
    pub category: Category,
    pub profile: LearnerProfile,
    pub recommendation: Recommendation,
    pub difficulty: Difficulty,
    /// Data-quality findings collected on the way.
    pub warnings: Vec<FeatureWarning>,
}

impl Prediction {
    pub fn category_info(&self) -> CategoryInfo {
        self.category.info()
    }

    /// The event to persist for this prediction.
    pub fn draft(&self) -> EventDraft {
        EventDraft {
            student_id: self.student_id.clone(),
            grade: self.grade.clone(),
            subject: self.subject.clone(),
            features: self.features,
            predicted_score: self.score,
            category: self.category,
            learner_profile: self.profile,
        }
    }
}

/// Runs predictions against a loaded scorer.
pub struct Predictor {
    scorer: Box<dyn Scorer>,
}

impl Predictor {
    pub fn new(scorer: Box<dyn Scorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// Score one interaction.
    ///
    /// A blank student id is rejected before the scorer is touched.
    pub fn predict(&self, input: PredictionInput) -> Result<Prediction, PredictError> {
        let student_id = input.student_id.trim();
        if student_id.is_empty() {
            return Err(PredictError::EmptyStudentId);
        }

        let mut warnings = input.features.validate();
        let (row, schema_warnings) = input.features.reconcile(self.scorer.expected_features());
        warnings.extend(schema_warnings);
        for w in &warnings {
            tracing::warn!(student_id, "{w}");
        }

        let score = self.scorer.predict(&row)?;
        let category = categorize(score).category;
        let profile = classify_profile(&input.features);
        let recommendation = Recommendation::for_outcome(category, profile);
        let difficulty = map_difficulty(score, category.name());

        tracing::debug!(
            student_id,
            score,
            category = %category,
            profile = %profile,
            "prediction complete"
        );

        Ok(Prediction {
            student_id: student_id.to_string(),
            grade: non_blank(input.grade),
            subject: non_blank(input.subject),
            features: input.features,
            score,
            category,
            profile,
            recommendation,
            difficulty,
            warnings,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
