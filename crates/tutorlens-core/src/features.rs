//! The canonical feature vector consumed by the scorer.
//!
//! Fifteen named numeric fields describe one student's behavioral telemetry for
//! one prediction. Field names are the scorer's column names, so every lookup
//! and reconciliation happens by name rather than by position.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Column names in canonical (persisted) order.
pub const FEATURE_NAMES: [&str; 15] = [
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
];

/// Behavioral telemetry for one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub hint_count: f64,
    pub bottom_hint: f64,
    pub attempt_count: f64,
    pub ms_first_response: f64,
    pub duration: f64,
    #[serde(rename = "Average_confidence(FRUSTRATED)")]
    pub frustrated: f64,
    #[serde(rename = "Average_confidence(CONFUSED)")]
    pub confused: f64,
    #[serde(rename = "Average_confidence(CONCENTRATING)")]
    pub concentrating: f64,
    #[serde(rename = "Average_confidence(BORED)")]
    pub bored: f64,
    pub action_count: f64,
    pub hint_dependency: f64,
    pub response_speed: f64,
    pub confidence_balance: f64,
    pub engagement_ratio: f64,
    pub efficiency_indicator: f64,
}

impl FeatureVector {
    /// Values a tutor starts from when entering telemetry by hand.
    pub fn default_input() -> Self {
        Self {
            hint_count: 5.0,
            bottom_hint: 5.0,
            attempt_count: 3.0,
            ms_first_response: 800.0,
            duration: 1000.0,
            frustrated: 0.2,
            confused: 0.2,
            concentrating: 0.6,
            bored: 0.1,
            action_count: 0.5,
            hint_dependency: 0.2,
            response_speed: 900.0,
            confidence_balance: 0.5,
            engagement_ratio: 0.5,
            efficiency_indicator: 0.5,
        }
    }

    /// Look up a field by its column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "hint_count" => self.hint_count,
            "bottom_hint" => self.bottom_hint,
            "attempt_count" => self.attempt_count,
            "ms_first_response" => self.ms_first_response,
            "duration" => self.duration,
            "Average_confidence(FRUSTRATED)" => self.frustrated,
            "Average_confidence(CONFUSED)" => self.confused,
            "Average_confidence(CONCENTRATING)" => self.concentrating,
            "Average_confidence(BORED)" => self.bored,
            "action_count" => self.action_count,
            "hint_dependency" => self.hint_dependency,
            "response_speed" => self.response_speed,
            "confidence_balance" => self.confidence_balance,
            "engagement_ratio" => self.engagement_ratio,
            "efficiency_indicator" => self.efficiency_indicator,
            _ => return None,
        };
        Some(value)
    }

    /// Set a field by its column name. Returns `false` for unknown names.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "hint_count" => &mut self.hint_count,
            "bottom_hint" => &mut self.bottom_hint,
            "attempt_count" => &mut self.attempt_count,
            "ms_first_response" => &mut self.ms_first_response,
            "duration" => &mut self.duration,
            "Average_confidence(FRUSTRATED)" => &mut self.frustrated,
            "Average_confidence(CONFUSED)" => &mut self.confused,
            "Average_confidence(CONCENTRATING)" => &mut self.concentrating,
            "Average_confidence(BORED)" => &mut self.bored,
            "action_count" => &mut self.action_count,
            "hint_dependency" => &mut self.hint_dependency,
            "response_speed" => &mut self.response_speed,
            "confidence_balance" => &mut self.confidence_balance,
            "engagement_ratio" => &mut self.engagement_ratio,
            "efficiency_indicator" => &mut self.efficiency_indicator,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Iterate `(name, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES
            .iter()
            .map(move |name| (*name, self.get(name).unwrap_or_default()))
    }

    /// Build a vector from named values.
    ///
    /// Every canonical field absent from `values` is filled with 0.0 and
    /// reported; names outside the schema are reported and ignored.
    pub fn from_named<I, S>(values: I) -> (Self, Vec<FeatureWarning>)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut vector = Self::default();
        let mut seen = Vec::with_capacity(FEATURE_NAMES.len());
        let mut warnings = Vec::new();

        for (name, value) in values {
            let name = name.as_ref();
            if vector.set(name, value) {
                seen.push(name.to_string());
            } else {
                warnings.push(FeatureWarning::Unknown {
                    name: name.to_string(),
                });
            }
        }

        for name in FEATURE_NAMES {
            if !seen.iter().any(|s| s == name) {
                warnings.push(FeatureWarning::Missing {
                    name: name.to_string(),
                });
            }
        }

        (vector, warnings)
    }

    /// Build the single-row input for a scorer that expects `expected` columns.
    ///
    /// Columns the vector cannot supply are filled with 0.0. Vector fields the
    /// scorer does not expect are reported, never dropped silently.
    pub fn reconcile(&self, expected: &[String]) -> (FeatureRow, Vec<FeatureWarning>) {
        let mut warnings = Vec::new();
        let columns = expected
            .iter()
            .map(|name| {
                let value = self.get(name).unwrap_or_else(|| {
                    warnings.push(FeatureWarning::Missing { name: name.clone() });
                    0.0
                });
                (name.clone(), value)
            })
            .collect();

        for name in FEATURE_NAMES {
            if !expected.iter().any(|e| e == name) {
                warnings.push(FeatureWarning::NotUsedByScorer {
                    name: name.to_string(),
                });
            }
        }

        (FeatureRow { columns }, warnings)
    }

    /// Range checks. Problems are reported, values are left untouched.
    pub fn validate(&self) -> Vec<FeatureWarning> {
        let mut warnings = Vec::new();
        for (name, value) in self.iter() {
            if !value.is_finite() {
                warnings.push(FeatureWarning::NonFinite {
                    name: name.to_string(),
                    value,
                });
                continue;
            }
            match name {
                // derived balances legitimately leave [0, 1]
                "confidence_balance" | "engagement_ratio" => {}
                "hint_count" | "bottom_hint" | "attempt_count" | "action_count"
                | "ms_first_response" | "duration" | "response_speed" => {
                    if value < 0.0 {
                        warnings.push(FeatureWarning::OutOfRange {
                            name: name.to_string(),
                            value,
                            expected: "a non-negative value",
                        });
                    }
                }
                _ => {
                    if !(0.0..=1.0).contains(&value) {
                        warnings.push(FeatureWarning::OutOfRange {
                            name: name.to_string(),
                            value,
                            expected: "a ratio in [0, 1]",
                        });
                    }
                }
            }
        }
        warnings
    }
}

/// A named single-row table handed to a scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<(String, f64)>,
}

impl FeatureRow {
    pub fn new(columns: Vec<(String, f64)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A data-quality finding about a feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureWarning {
    /// An expected column had no value and was filled with 0.0.
    Missing { name: String },
    /// A supplied name is not part of the feature schema.
    Unknown { name: String },
    /// A schema field the scorer does not consume.
    NotUsedByScorer { name: String },
    /// A value outside its semantic range.
    OutOfRange {
        name: String,
        value: f64,
        expected: &'static str,
    },
    /// NaN or infinite.
    NonFinite { name: String, value: f64 },
}

impl fmt::Display for FeatureWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureWarning::Missing { name } => {
                write!(f, "feature '{name}' is missing; filled with 0.0")
            }
            FeatureWarning::Unknown { name } => {
                write!(f, "feature '{name}' is not part of the schema; ignored")
            }
            FeatureWarning::NotUsedByScorer { name } => {
                write!(f, "feature '{name}' is not expected by the scorer")
            }
            FeatureWarning::OutOfRange {
                name,
                value,
                expected,
            } => write!(f, "feature '{name}' = {value} but expected {expected}"),
            FeatureWarning::NonFinite { name, value } => {
                write!(f, "feature '{name}' is not a finite number ({value})")
            }
        }
    }
}

/// Raw per-student signals before feature engineering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTelemetry {
    pub hint_count: f64,
    pub bottom_hint: f64,
    pub attempt_count: f64,
    pub ms_first_response: f64,
    pub duration: f64,
    pub frustrated: f64,
    pub confused: f64,
    pub concentrating: f64,
    pub bored: f64,
    pub action_count: f64,
}

/// Upper bound applied to `duration` before deriving features.
pub const MAX_DURATION_MS: f64 = 10_000.0;
/// Upper bound applied to `attempt_count` before deriving features.
pub const MAX_ATTEMPTS: f64 = 7.0;

impl RawTelemetry {
    /// Apply the training-time clipping and compute the engineered features.
    pub fn derive(&self) -> FeatureVector {
        let duration = self.duration.clamp(0.0, MAX_DURATION_MS);
        let attempt_count = self.attempt_count.min(MAX_ATTEMPTS);

        FeatureVector {
            hint_count: self.hint_count,
            bottom_hint: self.bottom_hint,
            attempt_count,
            ms_first_response: self.ms_first_response,
            duration,
            frustrated: self.frustrated,
            confused: self.confused,
            concentrating: self.concentrating,
            bored: self.bored,
            action_count: self.action_count,
            hint_dependency: self.hint_count / (attempt_count + 1.0),
            response_speed: 1.0 / (self.ms_first_response + 1.0),
            confidence_balance: self.concentrating - self.frustrated - self.confused,
            engagement_ratio: self.concentrating / (self.bored + 0.01),
            efficiency_indicator: self.action_count / (attempt_count + 1.0),
        }
    }

    /// Collect raw signals from named values; absent names become 0.0.
    pub fn from_map(values: &HashMap<String, f64>) -> Self {
        let get = |name: &str| values.get(name).copied().unwrap_or_default();
        Self {
            hint_count: get("hint_count"),
            bottom_hint: get("bottom_hint"),
            attempt_count: get("attempt_count"),
            ms_first_response: get("ms_first_response"),
            duration: get("duration"),
            frustrated: get("Average_confidence(FRUSTRATED)"),
            confused: get("Average_confidence(CONFUSED)"),
            concentrating: get("Average_confidence(CONCENTRATING)"),
            bored: get("Average_confidence(BORED)"),
            action_count: get("action_count"),
        }
    }
}
