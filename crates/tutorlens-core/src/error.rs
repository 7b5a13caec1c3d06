//! Error types for scoring and prediction.
//!
//! Classification and recommendation never fail; only the scorer boundary and
//! input validation produce errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the external scoring model.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// The model artifact does not exist. Nothing can be scored without it.
    #[error("model artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// The artifact exists but could not be read.
    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact was read but does not describe a usable model.
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// The model produced NaN or an infinity.
    #[error("scorer returned a non-finite score ({0})")]
    NonFinite(f64),
}

/// Failures of a single prediction request.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Rejected before any computation; nothing is logged.
    #[error("student id must not be empty")]
    EmptyStudentId,

    #[error(transparent)]
    Scorer(#[from] ScorerError),
}
