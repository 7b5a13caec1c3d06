//! Performance categories over the correctness score.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Six ordered performance bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Poor,
    Weak,
    #[serde(rename = "Below Average")]
    BelowAverage,
    Average,
    Strong,
    Outstanding,
}

/// Result of [`categorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub category: Category,
    pub ordinal: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub marker: &'static str,
}

/// Lower bounds, ascending. A score takes the last band whose bound it reaches.
const THRESHOLDS: [(f64, Category); 5] = [
    (0.30, Category::Weak),
    (0.45, Category::BelowAverage),
    (0.60, Category::Average),
    (0.75, Category::Strong),
    (0.90, Category::Outstanding),
];

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Poor,
        Category::Weak,
        Category::BelowAverage,
        Category::Average,
        Category::Strong,
        Category::Outstanding,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Poor => "Poor",
            Category::Weak => "Weak",
            Category::BelowAverage => "Below Average",
            Category::Average => "Average",
            Category::Strong => "Strong",
            Category::Outstanding => "Outstanding",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::Poor => "Needs immediate intervention and support",
            Category::Weak => "Requires additional practice and guidance",
            Category::BelowAverage => "Shows potential but needs improvement",
            Category::Average => "Solid understanding with room to grow",
            Category::Strong => "Excellent performance and comprehension",
            Category::Outstanding => "Exceptional mastery of the material",
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Category::Poor => "🆘",
            Category::Weak => "⚠️",
            Category::BelowAverage => "📈",
            Category::Average => "✅",
            Category::Strong => "🌟",
            Category::Outstanding => "🏆",
        }
    }

    /// The three lowest bands, which always get easy material.
    pub fn is_struggling(self) -> bool {
        matches!(
            self,
            Category::Poor | Category::Weak | Category::BelowAverage
        )
    }

    pub fn info(self) -> CategoryInfo {
        CategoryInfo {
            category: self,
            ordinal: self.ordinal(),
            name: self.name(),
            description: self.description(),
            marker: self.marker(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "poor" => Ok(Category::Poor),
            "weak" => Ok(Category::Weak),
            "belowaverage" => Ok(Category::BelowAverage),
            "average" => Ok(Category::Average),
            "strong" => Ok(Category::Strong),
            "outstanding" => Ok(Category::Outstanding),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

/// Map a correctness score to its performance band.
///
/// Scores are not clamped: anything below 0.30 (negative included) is Poor and
/// anything at or above 0.90 (above 1.0 included) is Outstanding. Callers that
/// need a bounded score must bound it themselves.
pub fn categorize(score: f64) -> CategoryInfo {
    let mut category = Category::Poor;
    for (bound, band) in THRESHOLDS {
        if score < bound {
            return category.info();
        }
        category = band;
    }
    category.info()
}
