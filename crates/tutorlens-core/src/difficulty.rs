//! Quiz difficulty tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Pick a quiz difficulty from a score and its category name.
///
/// A struggling category forces `Easy` even when the score alone would not,
/// so a caller that pairs a high score with a low band still gets easy
/// material. Unrecognised category names fall back to the score thresholds.
pub fn map_difficulty(score: f64, category: &str) -> Difficulty {
    let struggling = category
        .parse::<Category>()
        .map(Category::is_struggling)
        .unwrap_or(false);

    if struggling || score < 0.5 {
        Difficulty::Easy
    } else if score < 0.8 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}
