//! The `tutorlens dashboard` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use tutorlens_core::{Category, LearnerProfile, PredictionEvent};
use tutorlens_providers::load_config_from;
use tutorlens_store::{query, ClassroomSummary, EventFilter, PredictionLog};

use super::{store_error, warn_skipped};
use crate::OutputFormat;

#[derive(Serialize)]
struct DashboardOutput {
    summary: ClassroomSummary,
    filter: FilterEcho,
    students: Vec<PredictionEvent>,
    skipped_rows: usize,
}

#[derive(Serialize)]
struct FilterEcho {
    category: Option<Category>,
    profile: Option<LearnerProfile>,
    subject: Option<String>,
}

pub fn execute(
    category: Option<Category>,
    profile: Option<LearnerProfile>,
    subject: Option<String>,
    format: OutputFormat,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let log = PredictionLog::new(&config.log_path);

    let snapshot = log.read().map_err(store_error)?;

    let filter = EventFilter {
        category,
        profile,
        subject: subject.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    };
    let summary = query::classroom_summary(&snapshot.events);
    let students = query::filter_latest(&snapshot.events, &filter);

    if format == OutputFormat::Json {
        let output = DashboardOutput {
            summary,
            filter: FilterEcho {
                category: filter.category,
                profile: filter.profile,
                subject: filter.subject,
            },
            students,
            skipped_rows: snapshot.skipped.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    warn_skipped(snapshot.skipped.len());

    if summary.students == 0 {
        println!("No predictions recorded yet. Run `tutorlens predict` to add one.");
        return Ok(());
    }

    print_summary(&summary);

    if students.is_empty() {
        println!("\nNo students match the selected filters.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Student",
        "Last seen",
        "Score",
        "Category",
        "Profile",
        "Subject",
    ]);
    for event in &students {
        table.add_row(vec![
            Cell::new(&event.student_id),
            Cell::new(event.timestamp_string()),
            Cell::new(format!("{:.3}", event.predicted_score)),
            Cell::new(format!("{} {}", event.category.marker(), event.category)),
            Cell::new(event.learner_profile.label()),
            Cell::new(event.subject.as_deref().unwrap_or("-")),
        ]);
    }
    println!("\n{table}");

    Ok(())
}

fn print_summary(summary: &ClassroomSummary) {
    println!("Students: {}", summary.students);
    if let Some(mean) = summary.mean_score {
        println!("Mean score: {mean:.3}");
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Students"]);
    for category in Category::ALL {
        let count = summary.by_category.get(&category).copied().unwrap_or(0);
        table.add_row(vec![
            Cell::new(format!("{} {}", category.marker(), category)),
            Cell::new(count),
        ]);
    }
    println!("{table}");

    let mut table = Table::new();
    table.set_header(vec!["Profile", "Students"]);
    for profile in LearnerProfile::ALL {
        let count = summary.by_profile.get(&profile).copied().unwrap_or(0);
        table.add_row(vec![Cell::new(profile.label()), Cell::new(count)]);
    }
    println!("{table}");

    if !summary.subjects.is_empty() {
        println!("Subjects: {}", summary.subjects.join(", "));
    }
}
