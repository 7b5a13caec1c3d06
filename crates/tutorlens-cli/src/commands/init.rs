//! The `tutorlens init` command.

use std::path::Path;

use anyhow::{Context, Result};

use tutorlens_core::LinearModel;

pub fn execute() -> Result<()> {
    if Path::new("tutorlens.toml").exists() {
        println!("tutorlens.toml already exists, skipping.");
    } else {
        std::fs::write("tutorlens.toml", SAMPLE_CONFIG)?;
        println!("Created tutorlens.toml");
    }

    let model_path = Path::new("student_model.json");
    if model_path.exists() {
        println!("student_model.json already exists, skipping.");
    } else {
        let model = serde_json::to_string_pretty(&LinearModel::starter())
            .context("failed to serialize starter model")?;
        std::fs::write(model_path, model)?;
        println!("Created student_model.json (starter model)");
    }

    println!("\nNext steps:");
    println!("  1. Replace student_model.json with a trained model if you have one");
    println!("  2. Set GEMINI_API_KEY to enable quiz generation");
    println!("  3. Run: tutorlens predict --student s-001 --subject Math");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tutorlens configuration

log_path = "prediction_log.csv"
model_path = "student_model.json"

[quiz]
provider = "gemini"
models = ["gemini-1.5-flash", "gemini-1.5-pro", "gemini-pro"]
temperature = 0.7
max_tokens = 2048
question_count = 5
# Checked before the GEMINI_API_KEY and GOOGLE_API_KEY environment variables.
secrets_path = ".tutorlens/secrets.toml"
"#;
