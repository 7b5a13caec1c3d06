//! tutorlens-providers — configuration and quiz-generation backends.
//!
//! Implements the `QuizBackend` trait for Gemini and OpenAI-compatible APIs,
//! and wraps a backend in a [`QuizGenerator`] that falls back across an
//! ordered list of models.

pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod mock;
pub mod openai;

pub use config::{
    create_backend, load_config, load_config_from, resolve_api_key, CredentialSource,
    QuizConfig, QuizProviderKind, QuizSettings, TutorlensConfig,
};
pub use error::{ProviderError, QuizError};
pub use generator::QuizGenerator;
pub use mock::MockBackend;
