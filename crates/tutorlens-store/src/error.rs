//! Prediction log error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the prediction log.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The log cannot be trusted as a whole. Callers should offer a reset.
    #[error("prediction log {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader or writer failed.
    #[error("CSV error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl StoreError {
    /// Returns `true` if only a reset can make the log usable again.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

/// Why a single row was skipped while reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("empty student id")]
    EmptyStudentId,

    #[error("unparseable timestamp '{0}'")]
    Timestamp(String),

    #[error("column '{column}' is not a finite number: '{value}'")]
    Number { column: &'static str, value: String },

    #[error("unknown category '{0}'")]
    Category(String),

    #[error("unknown learner profile '{0}'")]
    Profile(String),

    #[error("unreadable row: {0}")]
    Malformed(String),
}
