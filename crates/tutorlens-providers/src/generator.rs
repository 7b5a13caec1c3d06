//! Quiz generation with ordered model fallback.

use tutorlens_core::traits::{GenerateRequest, QuizBackend, QuizRequest, DEFAULT_SYSTEM_PROMPT};

use crate::config::{create_backend, QuizSettings};
use crate::error::QuizError;

/// Produces practice quizzes through a [`QuizBackend`].
///
/// Built without a backend when no credential was found; every call then
/// fails with [`QuizError::NoCredential`].
pub struct QuizGenerator {
    backend: Option<Box<dyn QuizBackend>>,
    models: Vec<String>,
    temperature: f64,
    max_tokens: u32,
}

impl QuizGenerator {
    pub fn new(backend: Box<dyn QuizBackend>, settings: &QuizSettings) -> Self {
        Self {
            backend: Some(backend),
            models: settings.models.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    /// Build the configured backend, or a disabled generator when no key is set.
    pub fn from_settings(settings: &QuizSettings) -> anyhow::Result<Self> {
        let backend = match &settings.api_key {
            Some(key) => Some(create_backend(
                settings.provider,
                key,
                settings.base_url.clone(),
            )?),
            None => None,
        };
        Ok(Self {
            backend,
            models: settings.models.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Generate quiz text, trying each configured model in order.
    ///
    /// The first model that returns non-blank text wins. Failures and blank
    /// replies are collected and returned together if no model succeeds.
    pub async fn generate(&self, request: &QuizRequest) -> Result<String, QuizError> {
        let backend = self.backend.as_ref().ok_or(QuizError::NoCredential)?;
        if self.models.is_empty() {
            return Err(QuizError::NoModels);
        }

        let prompt = request.prompt();
        let mut failures = Vec::new();
        for model in &self.models {
            let generate = GenerateRequest {
                model: model.clone(),
                prompt: prompt.clone(),
                system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };

            match backend.generate(&generate).await {
                Ok(response) if !response.content.trim().is_empty() => {
                    tracing::info!(
                        backend = backend.name(),
                        model = %model,
                        latency_ms = response.latency_ms,
                        "quiz generated"
                    );
                    return Ok(response.content);
                }
                Ok(_) => {
                    tracing::warn!(model = %model, "model returned no text, trying next");
                    failures.push((model.clone(), "empty response".to_string()));
                }
                Err(e) => {
                    tracing::warn!(model = %model, "model failed, trying next: {e:#}");
                    failures.push((model.clone(), format!("{e:#}")));
                }
            }
        }

        Err(QuizError::AllModelsFailed(failures))
    }
}
