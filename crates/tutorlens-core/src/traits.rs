//! Trait definitions for text-generation backends used to build quizzes.
//!
//! Implemented by the `tutorlens-providers` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;

// ---------------------------------------------------------------------------
// Quiz backend trait
// ---------------------------------------------------------------------------

/// A generative-language service that turns a prompt into free-form text.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate text for a prompt with a specific model.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// Request to generate text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-1.5-flash").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// Quiz request
// ---------------------------------------------------------------------------

/// Default system prompt for quiz generation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a patient school teacher who writes short, age-appropriate practice quizzes. Respond only with the quiz.";

/// What a quiz should cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub grade: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub question_count: u32,
}

impl QuizRequest {
    /// Render the prompt sent to the backend.
    pub fn prompt(&self) -> String {
        format!(
            "Create a {difficulty} level multiple-choice quiz for a {grade} student on {subject}.\n\
             Write exactly {count} questions. For each question give four options labelled A-D, \
             then the correct answer on its own line as `Answer: <letter>`.\n\
             Keep the language simple and suitable for {grade}.",
            difficulty = self.difficulty,
            grade = self.grade,
            subject = self.subject,
            count = self.question_count,
        )
    }
}
