//! tutorlens-core — learner classification, recommendation rules and the
//! prediction pipeline.
//!
//! This crate holds the deterministic decision logic. The scoring model and
//! the quiz text generator sit behind traits so the rules can be exercised
//! without either.

pub mod category;
pub mod difficulty;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod profile;
pub mod recommend;
pub mod scorer;
pub mod traits;

pub use category::{categorize, Category, CategoryInfo};
pub use difficulty::{map_difficulty, Difficulty};
pub use error::{PredictError, ScorerError};
pub use features::{FeatureVector, FeatureWarning, RawTelemetry, FEATURE_NAMES};
pub use model::{EventDraft, PredictionEvent, TIMESTAMP_FORMAT};
pub use pipeline::{Prediction, PredictionInput, Predictor};
pub use profile::{classify_profile, LearnerProfile};
pub use recommend::{combined_recommendation, feedback_for, material_for, Recommendation};
pub use scorer::{FixedScorer, LinearModel, LinearScorer, Scorer};
pub use traits::{
    GenerateRequest, GenerateResponse, QuizBackend, QuizRequest, DEFAULT_SYSTEM_PROMPT,
};
