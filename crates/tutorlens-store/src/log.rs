//! The append-only CSV prediction log.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::instrument;

use tutorlens_core::{EventDraft, PredictionEvent};

use crate::error::{RowError, StoreError};
use crate::query::{self, ClassroomSummary, EventFilter};
use crate::schema::{encode, ColumnIndex, COLUMNS};

/// A data row that was left out of a read.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the file.
    pub line: u64,
    pub error: RowError,
}

/// Everything readable from the log at one point in time.
#[derive(Debug, Clone, Default)]
pub struct LogSnapshot {
    /// Parsed events in file order.
    pub events: Vec<PredictionEvent>,
    pub skipped: Vec<SkippedRow>,
}

/// Handle to a prediction log file.
///
/// The log is the only writer of prediction events. Rows are only ever
/// appended; the single destructive operation is [`PredictionLog::reset`].
#[derive(Debug, Clone)]
pub struct PredictionLog {
    path: PathBuf,
}

impl PredictionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    /// True when the file is missing or holds nothing but whitespace.
    fn is_blank(&self) -> Result<bool, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(self.io_err(e)),
        };
        for byte in BufReader::new(file).bytes() {
            if !byte.map_err(|e| self.io_err(e))?.is_ascii_whitespace() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn write_header(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let file = File::create(&self.path).map_err(|e| self.io_err(e))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(COLUMNS)
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|source| StoreError::Csv {
                path: self.path.clone(),
                source,
            })
    }

    fn open_reader(&self) -> Result<csv::Reader<File>, StoreError> {
        ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|source| StoreError::Csv {
                path: self.path.clone(),
                source,
            })
    }

    fn read_header(&self) -> Result<ColumnIndex, StoreError> {
        let mut reader = self.open_reader()?;
        let header = reader
            .headers()
            .map_err(|e| self.corrupt(format!("unreadable header: {e}")))?;
        ColumnIndex::from_header(header)
            .map_err(|missing| self.corrupt(format!("missing columns: {}", missing.join(", "))))
    }

    /// Make sure the file exists and starts with the expected header.
    ///
    /// A missing or empty file gets the header. An existing file must already
    /// use the write layout, otherwise appended rows would land under the
    /// wrong columns.
    pub fn ensure_initialized(&self) -> Result<(), StoreError> {
        if self.is_blank()? {
            tracing::info!(path = %self.path.display(), "initialising prediction log");
            return self.write_header();
        }
        let index = self.read_header()?;
        if !index.is_canonical() {
            return Err(self.corrupt("header does not match the prediction log layout"));
        }
        Ok(())
    }

    /// Append one event as a single full-width row.
    #[instrument(skip(self, event), fields(student_id = %event.student_id))]
    pub fn append(&self, event: &PredictionEvent) -> Result<(), StoreError> {
        self.ensure_initialized()?;

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        if !ends_with_newline(&mut file).map_err(|e| self.io_err(e))? {
            file.write_all(b"\n").map_err(|e| self.io_err(e))?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(encode(event))
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|source| StoreError::Csv {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(score = event.predicted_score, "appended prediction");
        Ok(())
    }

    /// Stamp a draft with the current local time and append it.
    pub fn record(&self, draft: EventDraft) -> Result<PredictionEvent, StoreError> {
        let event = draft.stamp(Local::now().naive_local());
        self.append(&event)?;
        Ok(event)
    }

    /// Read every parseable event.
    ///
    /// Bad rows are skipped and reported in the snapshot. The log only counts
    /// as corrupt when its header is unusable or when it holds data rows and
    /// none of them parse.
    pub fn read(&self) -> Result<LogSnapshot, StoreError> {
        if self.is_blank()? {
            return Ok(LogSnapshot::default());
        }

        let index = self.read_header()?;
        let mut reader = self.open_reader()?;

        let mut snapshot = LogSnapshot::default();
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    let line = record.position().map_or(0, |p| p.line());
                    if record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }
                    match index.decode(&record) {
                        Ok(event) => snapshot.events.push(event),
                        Err(error) => snapshot.skipped.push(SkippedRow { line, error }),
                    }
                }
                Err(e) => {
                    if e.is_io_error() {
                        return Err(self.corrupt(format!("read failed: {e}")));
                    }
                    snapshot.skipped.push(SkippedRow {
                        line: e.position().map_or(0, |p| p.line()),
                        error: RowError::Malformed(e.to_string()),
                    });
                }
            }
        }

        for skipped in &snapshot.skipped {
            tracing::warn!(
                path = %self.path.display(),
                line = skipped.line,
                "skipping log row: {}",
                skipped.error
            );
        }

        if snapshot.events.is_empty() && !snapshot.skipped.is_empty() {
            return Err(self.corrupt(format!(
                "none of {} data rows could be read",
                snapshot.skipped.len()
            )));
        }
        Ok(snapshot)
    }

    /// Delete the log and start again with only the header.
    ///
    /// Destroys every recorded prediction. Callers must get explicit user
    /// confirmation first.
    pub fn reset(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_err(e)),
        }
        tracing::warn!(path = %self.path.display(), "prediction log reset");
        self.write_header()
    }

    /// All events for one student, in log order.
    pub fn history_for(&self, student_id: &str) -> Result<Vec<PredictionEvent>, StoreError> {
        Ok(query::history_for(&self.read()?.events, student_id))
    }

    /// Score progression for one student, oldest first.
    pub fn score_series(&self, student_id: &str) -> Result<Vec<(NaiveDateTime, f64)>, StoreError> {
        Ok(query::score_series(&self.read()?.events, student_id))
    }

    /// The most recent event of every student.
    pub fn latest_per_student(&self) -> Result<BTreeMap<String, PredictionEvent>, StoreError> {
        Ok(query::latest_per_student(&self.read()?.events))
    }

    /// Latest-per-student events matching `filter`, newest first.
    pub fn filter(&self, filter: &EventFilter) -> Result<Vec<PredictionEvent>, StoreError> {
        Ok(query::filter_latest(&self.read()?.events, filter))
    }

    pub fn classroom_summary(&self) -> Result<ClassroomSummary, StoreError> {
        Ok(query::classroom_summary(&self.read()?.events))
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tutorlens_core::{Category, FeatureVector, LearnerProfile};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap()
    }

    fn event(id: &str, minute: u32, score: f64) -> PredictionEvent {
        PredictionEvent {
            student_id: id.into(),
            timestamp: at(minute),
            grade: Some("Grade 9".into()),
            subject: Some("Physics".into()),
            features: FeatureVector {
                hint_count: minute as f64,
                ..FeatureVector::default_input()
            },
            predicted_score: score,
            category: tutorlens_core::categorize(score).category,
            learner_profile: LearnerProfile::FocusedPerformer,
        }
    }

    fn temp_log() -> (tempfile::TempDir, PredictionLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = PredictionLog::new(dir.path().join("prediction_log.csv"));
        (dir, log)
    }

    fn data_lines(log: &PredictionLog) -> Vec<String> {
        std::fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .skip(1)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn first_append_writes_header() {
        let (_dir, log) = temp_log();
        log.append(&event("s1", 1, 0.5)).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, COLUMNS.join(","));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn empty_file_is_initialised() {
        let (_dir, log) = temp_log();
        std::fs::write(log.path(), "").unwrap();
        log.append(&event("s1", 1, 0.5)).unwrap();
        assert_eq!(log.read().unwrap().events.len(), 1);
    }

    #[test]
    fn whitespace_only_file_is_initialised() {
        let (_dir, log) = temp_log();
        std::fs::write(log.path(), "\n  \r\n").unwrap();
        assert!(log.read().unwrap().events.is_empty());

        log.append(&event("s1", 1, 0.5)).unwrap();
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().next().unwrap(), COLUMNS.join(","));
        assert_eq!(log.read().unwrap().events, vec![event("s1", 1, 0.5)]);
    }

    #[test]
    fn round_trip_many_events() {
        let (_dir, log) = temp_log();
        let written: Vec<PredictionEvent> =
            (0..5).map(|i| event("s1", i, 0.1 + i as f64 * 0.17)).collect();
        for e in &written {
            log.append(e).unwrap();
        }
        log.append(&event("other", 9, 0.3)).unwrap();

        let history = log.history_for("s1").unwrap();
        assert_eq!(history, written);
    }

    #[test]
    fn latest_of_three() {
        let (_dir, log) = temp_log();
        log.append(&event("s1", 1, 0.2)).unwrap();
        log.append(&event("s1", 2, 0.4)).unwrap();
        log.append(&event("s1", 3, 0.9)).unwrap();

        let latest = log.latest_per_student().unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest["s1"], event("s1", 3, 0.9));
    }

    #[test]
    fn missing_subject_keeps_column_count() {
        let (_dir, log) = temp_log();
        let mut e = event("s1", 1, 0.5);
        e.subject = None;
        e.grade = None;
        log.append(&e).unwrap();
        log.append(&event("s2", 2, 0.7)).unwrap();

        for line in data_lines(&log) {
            let record = ReaderBuilder::new()
                .has_headers(false)
                .from_reader(line.as_bytes())
                .records()
                .next()
                .unwrap()
                .unwrap();
            assert_eq!(record.len(), COLUMNS.len(), "short row: {line}");
        }
        assert_eq!(log.history_for("s1").unwrap()[0].subject, None);
    }

    #[test]
    fn record_stamps_current_time() {
        let (_dir, log) = temp_log();
        let draft = EventDraft {
            student_id: "s1".into(),
            grade: None,
            subject: None,
            features: FeatureVector::default_input(),
            predicted_score: 0.66,
            category: Category::Average,
            learner_profile: LearnerProfile::General,
        };
        let before = Local::now().naive_local() - chrono::Duration::seconds(1);
        let event = log.record(draft).unwrap();
        assert!(event.timestamp >= before);
        assert_eq!(log.history_for("s1").unwrap(), vec![event]);
    }

    #[test]
    fn bad_rows_are_skipped() {
        let (_dir, log) = temp_log();
        log.append(&event("s1", 1, 0.5)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            writeln!(file, "s1,not-a-time,,,{}", vec!["1"; 18].join(",")).unwrap();
            writeln!(file, "s1,2024-02-01 09:05:00,only,three").unwrap();
        }
        log.append(&event("s1", 7, 0.8)).unwrap();

        let snapshot = log.read().unwrap();
        assert_eq!(snapshot.events.len(), 2);
        assert_eq!(snapshot.skipped.len(), 2);
        assert_eq!(snapshot.skipped[0].line, 3);
        assert!(matches!(snapshot.skipped[0].error, RowError::Timestamp(_)));
        assert!(matches!(
            snapshot.skipped[1].error,
            RowError::FieldCount { .. }
        ));
    }

    #[test]
    fn non_finite_rows_are_skipped() {
        let (_dir, log) = temp_log();
        log.append(&event("s1", 1, 0.5)).unwrap();
        log.append(&event("s2", 2, 0.7)).unwrap();
        let mut nan_score = encode(&event("s3", 3, 0.1));
        nan_score[19] = "NaN".into();
        let mut inf_feature = encode(&event("s4", 4, 0.2));
        inf_feature[4] = "inf".into();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            writeln!(file, "{}", nan_score.join(",")).unwrap();
            writeln!(file, "{}", inf_feature.join(",")).unwrap();
        }

        let snapshot = log.read().unwrap();
        assert_eq!(snapshot.events.len(), 2);
        assert_eq!(snapshot.skipped.len(), 2);
        assert_eq!(snapshot.skipped[0].line, 4);
        assert!(matches!(
            snapshot.skipped[0].error,
            RowError::Number { column: "predicted_score", .. }
        ));
        assert!(matches!(
            snapshot.skipped[1].error,
            RowError::Number { column: "hint_count", .. }
        ));

        let mean = log.classroom_summary().unwrap().mean_score.unwrap();
        assert!((mean - 0.6).abs() < 1e-9);
    }

    #[test]
    fn unterminated_last_line_is_not_glued() {
        let (_dir, log) = temp_log();
        log.append(&event("s1", 1, 0.5)).unwrap();
        let content = std::fs::read_to_string(log.path()).unwrap();
        std::fs::write(log.path(), content.trim_end()).unwrap();

        log.append(&event("s2", 2, 0.6)).unwrap();
        assert_eq!(log.read().unwrap().events.len(), 2);
    }

    #[test]
    fn missing_column_is_corrupt() {
        let (_dir, log) = temp_log();
        std::fs::write(log.path(), "student_id,timestamp,score\ns1,2024-01-01 00:00:00,0.5\n")
            .unwrap();

        let err = log.read().unwrap_err();
        assert!(err.is_corrupt());
        assert!(err.to_string().contains("missing columns"));

        // appends refuse to pile onto a foreign layout
        assert!(log.append(&event("s1", 1, 0.5)).unwrap_err().is_corrupt());
    }

    #[test]
    fn all_rows_bad_is_corrupt() {
        let (_dir, log) = temp_log();
        log.ensure_initialized().unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            writeln!(file, "garbage").unwrap();
            writeln!(file, "more,garbage").unwrap();
        }
        assert!(log.read().unwrap_err().is_corrupt());
    }

    #[test]
    fn reset_leaves_only_header() {
        let (_dir, log) = temp_log();
        log.append(&event("s1", 1, 0.5)).unwrap();
        std::fs::write(log.path(), "broken").unwrap();

        log.reset().unwrap();
        let snapshot = log.read().unwrap();
        assert!(snapshot.events.is_empty());
        assert!(snapshot.skipped.is_empty());
        assert_eq!(
            std::fs::read_to_string(log.path()).unwrap().trim_end(),
            COLUMNS.join(",")
        );
    }

    #[test]
    fn missing_file_reads_empty() {
        let (_dir, log) = temp_log();
        assert!(log.read().unwrap().events.is_empty());
        assert!(log.latest_per_student().unwrap().is_empty());
        assert!(!log.path().exists());
    }

    #[test]
    fn filter_and_summary_go_through_the_file() {
        let (_dir, log) = temp_log();
        log.append(&event("amy", 1, 0.2)).unwrap();
        log.append(&event("amy", 5, 0.95)).unwrap();
        log.append(&event("ben", 3, 0.25)).unwrap();

        let poor = log
            .filter(&EventFilter {
                category: Some(Category::Poor),
                subject: Some("Physics".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(poor.len(), 1);
        assert_eq!(poor[0].student_id, "ben");

        let summary = log.classroom_summary().unwrap();
        assert_eq!(summary.students, 2);

        let series = log.score_series("amy").unwrap();
        assert_eq!(series.len(), 2);
        assert!(series[0].0 < series[1].0);
    }
}
