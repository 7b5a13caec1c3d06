//! Persistent prediction history for tutorlens.
//!
//! Every prediction is appended as one row of a CSV file with a fixed
//! 22-column layout. Reads are tolerant of damaged rows; queries work on the
//! latest prediction per student.

pub mod error;
pub mod log;
pub mod query;
pub mod schema;

pub use error::{RowError, StoreError};
pub use log::{LogSnapshot, PredictionLog, SkippedRow};
pub use query::{ClassroomSummary, EventFilter};
pub use schema::COLUMNS;
