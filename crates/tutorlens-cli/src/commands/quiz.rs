//! The `tutorlens quiz` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use tutorlens_core::{categorize, map_difficulty, Difficulty, QuizRequest};
use tutorlens_providers::{load_config_from, QuizGenerator, QuizSettings};

pub async fn execute(
    grade: String,
    subject: String,
    difficulty: Option<Difficulty>,
    score: Option<f64>,
    count: Option<u32>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let difficulty = match (difficulty, score) {
        (Some(d), _) => d,
        (None, Some(score)) => {
            anyhow::ensure!(score.is_finite(), "score must be a finite number");
            map_difficulty(score, categorize(score).name)
        }
        (None, None) => anyhow::bail!("either --difficulty or --score is required"),
    };

    let settings = QuizSettings::from_config(&config.quiz);
    tracing::debug!(?settings, "quiz settings resolved");
    let request = QuizRequest {
        grade,
        subject,
        difficulty,
        question_count: count.unwrap_or(settings.question_count),
    };
    anyhow::ensure!(request.question_count > 0, "question count must be at least 1");

    let generator = QuizGenerator::from_settings(&settings)?;
    let text = generator
        .generate(&request)
        .await
        .context("quiz generation failed")?;

    println!(
        "{} quiz for {} ({}):\n",
        request.difficulty, request.subject, request.grade
    );
    println!("{text}");
    Ok(())
}
