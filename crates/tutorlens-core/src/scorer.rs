//! The scoring model boundary.
//!
//! The correctness model is trained offline and treated as a black box. The
//! pipeline only needs the column names the model was trained on and a way to
//! turn one named row into a score.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScorerError;
use crate::features::{FeatureRow, FEATURE_NAMES};

/// A trained model that maps one feature row to a correctness score.
pub trait Scorer: Send + Sync {
    /// Column names the model was trained on, in any order.
    fn expected_features(&self) -> &[String];

    /// Score a single row whose columns match [`Scorer::expected_features`].
    fn predict(&self, row: &FeatureRow) -> Result<f64, ScorerError>;
}

/// Output transform applied to the linear combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Link {
    #[default]
    Identity,
    Logistic,
}

/// On-disk description of a linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub link: Link,
}

impl LinearModel {
    /// A hand-tuned model over the full schema, written by `tutorlens init`
    /// so a fresh install can score before a trained artifact exists.
    pub fn starter() -> Self {
        let weights: [f64; 15] = [
            -0.01, -0.01, -0.02, -0.00002, 0.00001, -0.15, -0.15, 0.2, -0.1, 0.05, -0.1, 0.0, 0.1,
            0.01, 0.1,
        ];
        Self {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            coefficients: weights.to_vec(),
            intercept: 0.70,
            link: Link::Identity,
        }
    }
}

/// A [`Scorer`] backed by a [`LinearModel`].
#[derive(Debug, Clone)]
pub struct LinearScorer {
    model: LinearModel,
}

impl LinearScorer {
    pub fn new(model: LinearModel) -> Result<Self, ScorerError> {
        if model.feature_names.is_empty() {
            return Err(ScorerError::InvalidArtifact(
                "model declares no features".into(),
            ));
        }
        if model.feature_names.len() != model.coefficients.len() {
            return Err(ScorerError::InvalidArtifact(format!(
                "{} feature names but {} coefficients",
                model.feature_names.len(),
                model.coefficients.len()
            )));
        }
        if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ScorerError::InvalidArtifact(
                "coefficients must be finite".into(),
            ));
        }
        Ok(Self { model })
    }

    /// Load a JSON model artifact.
    pub fn load(path: &Path) -> Result<Self, ScorerError> {
        if !path.exists() {
            return Err(ScorerError::ArtifactMissing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ScorerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: LinearModel = serde_json::from_str(&content)
            .map_err(|e| ScorerError::InvalidArtifact(format!("{}: {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            features = model.feature_names.len(),
            "loaded linear model"
        );
        Self::new(model)
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }
}

impl Scorer for LinearScorer {
    fn expected_features(&self) -> &[String] {
        &self.model.feature_names
    }

    fn predict(&self, row: &FeatureRow) -> Result<f64, ScorerError> {
        let linear = self
            .model
            .feature_names
            .iter()
            .zip(&self.model.coefficients)
            .map(|(name, coef)| coef * row.get(name).unwrap_or_default())
            .sum::<f64>()
            + self.model.intercept;

        let score = match self.model.link {
            Link::Identity => linear,
            Link::Logistic => 1.0 / (1.0 + (-linear).exp()),
        };
        if !score.is_finite() {
            return Err(ScorerError::NonFinite(score));
        }
        Ok(score)
    }
}

/// A scorer that always returns the same score. Useful for tests and demos.
#[derive(Debug, Clone)]
pub struct FixedScorer {
    score: f64,
    expected: Vec<String>,
}

impl FixedScorer {
    /// Expects the full canonical schema.
    pub fn new(score: f64) -> Self {
        Self {
            score,
            expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Expects an arbitrary set of columns.
    pub fn with_expected(score: f64, expected: Vec<String>) -> Self {
        Self { score, expected }
    }
}

impl Scorer for FixedScorer {
    fn expected_features(&self) -> &[String] {
        &self.expected
    }

    fn predict(&self, _row: &FeatureRow) -> Result<f64, ScorerError> {
        if !self.score.is_finite() {
            return Err(ScorerError::NonFinite(self.score));
        }
        Ok(self.score)
    }
}
