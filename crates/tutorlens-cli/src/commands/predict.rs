//! The `tutorlens predict` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use tutorlens_core::{
    FeatureVector, LinearScorer, Prediction, PredictionInput, Predictor, QuizRequest,
    RawTelemetry, ScorerError,
};
use tutorlens_providers::{load_config_from, QuizGenerator, QuizSettings};
use tutorlens_store::PredictionLog;

use super::store_error;
use crate::{FeatureArgs, OutputFormat};

#[derive(Serialize)]
struct PredictOutput<'a> {
    #[serde(flatten)]
    prediction: &'a Prediction,
    recorded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    quiz: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quiz_error: Option<String>,
}

impl FeatureArgs {
    fn to_features(&self) -> FeatureVector {
        if self.derive {
            return RawTelemetry {
                hint_count: self.hint_count,
                bottom_hint: self.bottom_hint,
                attempt_count: self.attempt_count,
                ms_first_response: self.ms_first_response,
                duration: self.duration,
                frustrated: self.frustrated,
                confused: self.confused,
                concentrating: self.concentrating,
                bored: self.bored,
                action_count: self.action_count,
            }
            .derive();
        }
        FeatureVector {
            hint_count: self.hint_count,
            bottom_hint: self.bottom_hint,
            attempt_count: self.attempt_count,
            ms_first_response: self.ms_first_response,
            duration: self.duration,
            frustrated: self.frustrated,
            confused: self.confused,
            concentrating: self.concentrating,
            bored: self.bored,
            action_count: self.action_count,
            hint_dependency: self.hint_dependency,
            response_speed: self.response_speed,
            confidence_balance: self.confidence_balance,
            engagement_ratio: self.engagement_ratio,
            efficiency_indicator: self.efficiency_indicator,
        }
    }
}

pub async fn execute(
    student: String,
    grade: Option<String>,
    subject: Option<String>,
    features: FeatureArgs,
    with_quiz: bool,
    format: OutputFormat,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    let scorer = LinearScorer::load(&config.model_path).map_err(|e| {
        let missing = matches!(e, ScorerError::ArtifactMissing(_));
        let err = anyhow::Error::new(e);
        if missing {
            err.context("no scoring model found; run `tutorlens init` to create a starter model")
        } else {
            err.context("failed to load scoring model")
        }
    })?;
    let predictor = Predictor::new(Box::new(scorer));

    let prediction = predictor.predict(PredictionInput {
        student_id: student,
        grade,
        subject,
        features: features.to_features(),
    })?;

    let log = PredictionLog::new(&config.log_path);
    let event = log.record(prediction.draft()).map_err(store_error)?;

    let (quiz, quiz_error) = if with_quiz {
        match generate_quiz(&prediction, &config.quiz).await {
            Ok(text) => (Some(text), None),
            Err(e) => (None, Some(format!("{e:#}"))),
        }
    } else {
        (None, None)
    };

    match format {
        OutputFormat::Json => {
            let output = PredictOutput {
                prediction: &prediction,
                recorded_at: event.timestamp_string(),
                quiz,
                quiz_error,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            print_prediction(&prediction);
            if let Some(text) = quiz {
                println!("\nPractice quiz ({}):\n{text}", prediction.difficulty);
            }
            if let Some(err) = quiz_error {
                eprintln!("Quiz unavailable: {err}");
            }
            println!("\nRecorded at {} in {}", event.timestamp_string(), log.path().display());
        }
    }

    Ok(())
}

async fn generate_quiz(
    prediction: &Prediction,
    quiz_config: &tutorlens_providers::QuizConfig,
) -> Result<String> {
    let settings = QuizSettings::from_config(quiz_config);
    tracing::debug!(?settings, "quiz settings resolved");
    let generator = QuizGenerator::from_settings(&settings)?;
    let request = QuizRequest {
        grade: prediction
            .grade
            .clone()
            .unwrap_or_else(|| "general".to_string()),
        subject: prediction
            .subject
            .clone()
            .unwrap_or_else(|| "general knowledge".to_string()),
        difficulty: prediction.difficulty,
        question_count: settings.question_count,
    };
    generator
        .generate(&request)
        .await
        .context("quiz generation failed")
}

fn print_prediction(p: &Prediction) {
    let info = p.category_info();

    println!("Student:     {}", p.student_id);
    println!("Score:       {:.3}", p.score);
    println!("Category:    {} {} ({})", info.marker, info.name, info.description);
    println!("Profile:     {}", p.profile.label());
    println!("Difficulty:  {}", p.difficulty);
    println!();
    println!("Feedback:    {}", p.recommendation.feedback);
    println!("Material:    {}", p.recommendation.material);
    println!("Recommended: {}", p.recommendation.combined);

    if !p.warnings.is_empty() {
        println!("\nData quality:");
        for w in &p.warnings {
            println!("  - {w}");
        }
    }
}
