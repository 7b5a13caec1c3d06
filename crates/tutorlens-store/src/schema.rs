//! The fixed column layout of the prediction log and row conversion.

use chrono::NaiveDateTime;
use csv::StringRecord;

use tutorlens_core::{
    Category, FeatureVector, LearnerProfile, PredictionEvent, FEATURE_NAMES, TIMESTAMP_FORMAT,
};

use crate::error::RowError;

/// Every column, in write order.
pub const COLUMNS: [&str; 22] = [
    "student_id",
    "timestamp",
    "grade",
    "subject",
    "hint_count",
    "bottom_hint",
    "attempt_count",
    "ms_first_response",
    "duration",
    "Average_confidence(FRUSTRATED)",
    "Average_confidence(CONFUSED)",
    "Average_confidence(CONCENTRATING)",
    "Average_confidence(BORED)",
    "action_count",
    "hint_dependency",
    "response_speed",
    "confidence_balance",
    "engagement_ratio",
    "efficiency_indicator",
    "predicted_score",
    "category",
    "learner_profile",
];

/// Timestamp layouts accepted when reading, strictest first.
const TIMESTAMP_INPUT_FORMATS: [&str; 3] = [
    TIMESTAMP_FORMAT,
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Render an event as one full-width row. Absent categorical values are
/// written as empty fields so the row never comes up short.
pub fn encode(event: &PredictionEvent) -> Vec<String> {
    let mut row = Vec::with_capacity(COLUMNS.len());
    row.push(event.student_id.clone());
    row.push(event.timestamp_string());
    row.push(event.grade.clone().unwrap_or_default());
    row.push(event.subject.clone().unwrap_or_default());
    row.extend(event.features.iter().map(|(_, v)| v.to_string()));
    row.push(event.predicted_score.to_string());
    row.push(event.category.name().to_string());
    row.push(event.learner_profile.label().to_string());
    row
}

/// Position of every required column in a header.
///
/// Lookup is by name, so a log whose columns were reordered by another tool
/// still reads correctly.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: [usize; 22],
    width: usize,
}

impl ColumnIndex {
    /// Map a header row. Returns the names of any missing columns.
    pub fn from_header(header: &StringRecord) -> Result<Self, Vec<&'static str>> {
        let names: Vec<&str> = header
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}'))
            .collect();

        let mut positions = [0usize; 22];
        let mut missing = Vec::new();
        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            match names.iter().position(|n| *n == column) {
                Some(i) => *slot = i,
                None => missing.push(column),
            }
        }

        if missing.is_empty() {
            Ok(Self {
                positions,
                width: names.len(),
            })
        } else {
            Err(missing)
        }
    }

    /// Whether the header is exactly the write layout.
    pub fn is_canonical(&self) -> bool {
        self.width == COLUMNS.len() && self.positions.iter().enumerate().all(|(i, p)| i == *p)
    }

    fn field<'r>(&self, record: &'r StringRecord, column: usize) -> &'r str {
        record.get(self.positions[column]).unwrap_or_default().trim()
    }

    /// Parse one data row.
    pub fn decode(&self, record: &StringRecord) -> Result<PredictionEvent, RowError> {
        if record.len() != self.width {
            return Err(RowError::FieldCount {
                expected: self.width,
                found: record.len(),
            });
        }

        let student_id = self.field(record, 0);
        if student_id.is_empty() {
            return Err(RowError::EmptyStudentId);
        }

        let raw_ts = self.field(record, 1);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| RowError::Timestamp(raw_ts.into()))?;

        let mut features = FeatureVector::default();
        for (offset, name) in FEATURE_NAMES.iter().enumerate() {
            let value = self.number(record, 4 + offset)?;
            features.set(name, value);
        }

        let predicted_score = self.number(record, 19)?;

        let raw_category = self.field(record, 20);
        let category: Category = raw_category
            .parse()
            .map_err(|_| RowError::Category(raw_category.into()))?;

        let raw_profile = self.field(record, 21);
        let learner_profile: LearnerProfile = raw_profile
            .parse()
            .map_err(|_| RowError::Profile(raw_profile.into()))?;

        Ok(PredictionEvent {
            student_id: student_id.to_string(),
            timestamp,
            grade: optional(self.field(record, 2)),
            subject: optional(self.field(record, 3)),
            features,
            predicted_score,
            category,
            learner_profile,
        })
    }

    fn number(&self, record: &StringRecord, column: usize) -> Result<f64, RowError> {
        let raw = self.field(record, column);
        // NaN and infinities parse but would poison aggregates.
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RowError::Number {
                column: COLUMNS[column],
                value: raw.to_string(),
            })
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
