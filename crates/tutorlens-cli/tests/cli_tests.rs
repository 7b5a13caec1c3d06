//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command running inside `dir` with no ambient config or credentials.
fn tutorlens(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("tutorlens").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("GOOGLE_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn initialised() -> TempDir {
    let dir = TempDir::new().unwrap();
    tutorlens(&dir).arg("init").assert().success();
    dir
}

fn log_lines(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("prediction_log.csv"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    tutorlens(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("learner profiling"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    tutorlens(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tutorlens"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    tutorlens(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created tutorlens.toml"))
        .stdout(predicate::str::contains("Created student_model.json"));

    assert!(dir.path().join("tutorlens.toml").exists());
    let model: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("student_model.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(model["feature_names"].as_array().unwrap().len(), 15);
}

#[test]
fn init_skips_existing() {
    let dir = initialised();

    tutorlens(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn predict_without_model_fails() {
    let dir = TempDir::new().unwrap();

    tutorlens(&dir)
        .args(["predict", "--student", "amy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("tutorlens init"));

    assert!(!dir.path().join("prediction_log.csv").exists());
}

#[test]
fn predict_with_defaults_records_one_row() {
    let dir = initialised();

    tutorlens(&dir)
        .args(["predict", "--student", "amy", "--subject", "Math"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score:       0.694"))
        .stdout(predicate::str::contains(" Average (Solid understanding"))
        .stdout(predicate::str::contains("Below Average").not())
        .stdout(predicate::str::contains("Profile:     General Learner"))
        .stdout(predicate::str::contains("Difficulty:  medium"));

    let lines = log_lines(&dir);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("student_id,timestamp,grade,subject,hint_count"));
    assert!(lines[1].starts_with("amy,"));
}

#[test]
fn predict_fast_careless_profile() {
    let dir = initialised();

    tutorlens(&dir)
        .args([
            "predict",
            "--student",
            "ben",
            "--attempt-count",
            "2",
            "--concentrating",
            "0.4",
            "--frustrated",
            "0.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fast but Careless"));
}

#[test]
fn predict_json_output() {
    let dir = initialised();

    let output = tutorlens(&dir)
        .args([
            "predict",
            "--student",
            "cal",
            "--grade",
            "Grade 4",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["student_id"], "cal");
    assert_eq!(value["category"], "Average");
    assert_eq!(value["difficulty"], "medium");
    assert_eq!(value["grade"], "Grade 4");
    assert!(value["subject"].is_null());
    assert!(value["recorded_at"].as_str().unwrap().len() == 19);
}

#[test]
fn blank_student_is_rejected_and_not_logged() {
    let dir = initialised();

    tutorlens(&dir)
        .args(["predict", "--student", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("student id must not be empty"));

    assert!(!dir.path().join("prediction_log.csv").exists());
}

#[test]
fn history_lists_student_predictions() {
    let dir = initialised();

    for hints in ["1", "9"] {
        tutorlens(&dir)
            .args(["predict", "--student", "amy", "--hint-count", hints])
            .assert()
            .success();
    }
    tutorlens(&dir)
        .args(["predict", "--student", "other"])
        .assert()
        .success();

    tutorlens(&dir)
        .args(["history", "--student", "amy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("History for amy (2 predictions)"));

    tutorlens(&dir)
        .args(["history", "--student", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No predictions recorded for 'nobody'"));
}

#[test]
fn dashboard_filters_latest_snapshot() {
    let dir = initialised();

    tutorlens(&dir)
        .args(["predict", "--student", "amy", "--subject", "Math"])
        .assert()
        .success();
    tutorlens(&dir)
        .args([
            "predict",
            "--student",
            "ben",
            "--subject",
            "Math",
            "--attempt-count",
            "2",
            "--concentrating",
            "0.4",
            "--frustrated",
            "0.5",
        ])
        .assert()
        .success();

    let output = tutorlens(&dir)
        .args([
            "dashboard",
            "--profile",
            "Fast but Careless",
            "--subject",
            "Math",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["students"], 2);
    let students = value["students"].as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["student_id"], "ben");

    tutorlens(&dir)
        .args(["dashboard", "--subject", "History"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No students match"));
}

#[test]
fn dashboard_on_empty_log() {
    let dir = initialised();

    tutorlens(&dir)
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("No predictions recorded yet"));
}

#[test]
fn corrupt_log_suggests_reset() {
    let dir = initialised();
    std::fs::write(
        dir.path().join("prediction_log.csv"),
        "name,when\nx,y\n",
    )
    .unwrap();

    tutorlens(&dir)
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(predicate::str::contains("tutorlens reset --yes"));

    // the broken file is left alone
    assert_eq!(log_lines(&dir), ["name,when", "x,y"]);
}

#[test]
fn predict_on_whitespace_only_log() {
    let dir = initialised();
    std::fs::write(dir.path().join("prediction_log.csv"), "\n").unwrap();

    tutorlens(&dir)
        .args(["predict", "--student", "amy"])
        .assert()
        .success();

    let lines = log_lines(&dir);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("student_id,timestamp"));
}

#[test]
fn reset_requires_confirmation() {
    let dir = initialised();
    tutorlens(&dir)
        .args(["predict", "--student", "amy"])
        .assert()
        .success();

    tutorlens(&dir)
        .arg("reset")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert_eq!(log_lines(&dir).len(), 2);

    tutorlens(&dir)
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Prediction log reset"));
    assert_eq!(log_lines(&dir).len(), 1);
}

#[test]
fn quiz_without_credential_fails() {
    let dir = initialised();

    tutorlens(&dir)
        .args([
            "quiz",
            "--grade",
            "Grade 5",
            "--subject",
            "Fractions",
            "--difficulty",
            "easy",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API key configured"));
}

#[test]
fn predict_survives_missing_quiz_credential() {
    let dir = initialised();

    tutorlens(&dir)
        .args(["predict", "--student", "amy", "--quiz"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Quiz unavailable"));

    assert_eq!(log_lines(&dir).len(), 2);
}

#[test]
fn quiz_needs_difficulty_or_score() {
    let dir = initialised();

    tutorlens(&dir)
        .args(["quiz", "--grade", "Grade 5", "--subject", "Fractions"])
        .assert()
        .failure();
}
