//! Configuration loading, credential resolution and backend factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tutorlens_core::traits::QuizBackend;

use crate::gemini::GeminiBackend;
use crate::openai::OpenAiBackend;

/// Which generative-language API the quiz generator talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizProviderKind {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl QuizProviderKind {
    /// Credential names for this provider, highest priority first.
    ///
    /// The first name is also the key looked up in the secrets file.
    pub fn credential_vars(self) -> &'static [&'static str] {
        match self {
            QuizProviderKind::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            QuizProviderKind::OpenAi => &["OPENAI_API_KEY"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QuizProviderKind::Gemini => "gemini",
            QuizProviderKind::OpenAi => "openai",
        }
    }
}

/// The `[quiz]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub provider: QuizProviderKind,
    /// Model identifiers, tried in order.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_question_count")]
    pub question_count: u32,
    /// Deployment secret store, checked before the environment.
    #[serde(default = "default_secrets_path")]
    pub secrets_path: PathBuf,
}

fn default_models() -> Vec<String> {
    vec![
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-pro".to_string(),
        "gemini-pro".to_string(),
    ]
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_question_count() -> u32 {
    5
}
fn default_secrets_path() -> PathBuf {
    PathBuf::from(".tutorlens/secrets.toml")
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            provider: QuizProviderKind::default(),
            models: default_models(),
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            question_count: default_question_count(),
            secrets_path: default_secrets_path(),
        }
    }
}

/// Top-level tutorlens configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorlensConfig {
    /// Prediction log CSV.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    /// Scorer artifact (JSON linear model).
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default)]
    pub quiz: QuizConfig,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("prediction_log.csv")
}
fn default_model_path() -> PathBuf {
    PathBuf::from("student_model.json")
}

impl Default for TutorlensConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            model_path: default_model_path(),
            quiz: QuizConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(resolve_env_vars(s)),
        None => path.to_path_buf(),
    }
}

impl TutorlensConfig {
    fn resolve(mut self) -> Self {
        self.log_path = resolve_path(&self.log_path);
        self.model_path = resolve_path(&self.model_path);
        self.quiz.secrets_path = resolve_path(&self.quiz.secrets_path);
        self.quiz.base_url = self
            .quiz
            .base_url
            .as_deref()
            .map(resolve_env_vars)
            .filter(|u| !u.is_empty());
        self.quiz.models = self
            .quiz
            .models
            .iter()
            .map(|m| resolve_env_vars(m).trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        self
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tutorlens.toml` in the current directory
/// 2. `~/.config/tutorlens/config.toml`
///
/// Falls back to defaults when neither exists.
pub fn load_config() -> Result<TutorlensConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TutorlensConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tutorlens.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<TutorlensConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => TutorlensConfig::default(),
    };

    Ok(config.resolve())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tutorlens"))
}

/// Where the quiz credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    SecretStore(PathBuf),
    Env(&'static str),
}

/// Find the API key for `provider`.
///
/// Priority: the provider's primary variable in the secrets file, then each
/// credential variable in the environment. Blank values count as absent. A
/// secrets file that cannot be parsed is skipped with a warning.
pub fn resolve_api_key(
    provider: QuizProviderKind,
    secrets_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Option<(String, CredentialSource)> {
    let vars = provider.credential_vars();

    if let Some(key) = read_secret(secrets_path, vars[0]) {
        return Some((key, CredentialSource::SecretStore(secrets_path.to_path_buf())));
    }

    vars.iter().find_map(|var| {
        env(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| (v, CredentialSource::Env(var)))
    })
}

fn read_secret(path: &Path, name: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let table = match toml::from_str::<toml::Table>(&content) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring unreadable secrets file: {e}");
            return None;
        }
    };
    table
        .get(name)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Quiz settings resolved once at startup.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone)]
pub struct QuizSettings {
    pub provider: QuizProviderKind,
    /// `None` disables quiz generation.
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub models: Vec<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub question_count: u32,
}

impl std::fmt::Debug for QuizSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSettings")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("question_count", &self.question_count)
            .finish()
    }
}

impl QuizSettings {
    /// Resolve settings against the process environment.
    pub fn from_config(config: &QuizConfig) -> Self {
        Self::from_config_with_env(config, |name| std::env::var(name).ok())
    }

    pub fn from_config_with_env(config: &QuizConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = match resolve_api_key(config.provider, &config.secrets_path, env) {
            Some((key, source)) => {
                tracing::debug!(?source, "quiz credential found");
                Some(key)
            }
            None => {
                tracing::info!(
                    provider = config.provider.name(),
                    "no quiz API key configured, quiz generation disabled"
                );
                None
            }
        };

        Self {
            provider: config.provider,
            api_key,
            base_url: config.base_url.clone(),
            models: config.models.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            question_count: config.question_count,
        }
    }
}

/// Create a backend for `provider`.
pub fn create_backend(
    provider: QuizProviderKind,
    api_key: &str,
    base_url: Option<String>,
) -> Result<Box<dyn QuizBackend>> {
    match provider {
        QuizProviderKind::Gemini => Ok(Box::new(GeminiBackend::new(api_key, base_url)?)),
        QuizProviderKind::OpenAi => Ok(Box::new(OpenAiBackend::new(api_key, base_url)?)),
    }
}
