//! The `tutorlens history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use tutorlens_core::model::sort_newest_first;
use tutorlens_providers::load_config_from;
use tutorlens_store::{query, PredictionLog};

use super::{store_error, warn_skipped};
use crate::OutputFormat;

pub fn execute(student: String, format: OutputFormat, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let log = PredictionLog::new(&config.log_path);

    let snapshot = log.read().map_err(store_error)?;
    warn_skipped(snapshot.skipped.len());

    let student = student.trim();
    let mut history = query::history_for(&snapshot.events, student);
    sort_newest_first(&mut history);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No predictions recorded for '{student}'.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Timestamp",
        "Score",
        "Category",
        "Profile",
        "Subject",
        "Grade",
    ]);
    for event in &history {
        table.add_row(vec![
            Cell::new(event.timestamp_string()),
            Cell::new(format!("{:.3}", event.predicted_score)),
            Cell::new(format!("{} {}", event.category.marker(), event.category)),
            Cell::new(event.learner_profile.label()),
            Cell::new(event.subject.as_deref().unwrap_or("-")),
            Cell::new(event.grade.as_deref().unwrap_or("-")),
        ]);
    }
    println!("History for {student} ({} predictions)", history.len());
    println!("{table}");

    let series = query::score_series(&snapshot.events, student);
    if let (Some((_, first)), Some((_, last))) = (series.first(), series.last()) {
        if series.len() > 1 {
            println!(
                "Score progression: {first:.3} -> {last:.3} ({:+.3})",
                last - first
            );
        }
    }

    Ok(())
}
