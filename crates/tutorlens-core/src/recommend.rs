//! Feedback, learning-material and combined recommendation lookups.
//!
//! All lookups are total: unknown inputs fall back to a fixed default text.

use serde::Serialize;

use crate::category::Category;
use crate::profile::LearnerProfile;

pub const DEFAULT_MATERIAL: &str = "📘 Keep learning and practicing regularly.";
pub const DEFAULT_FEEDBACK: &str = "Keep pushing forward — every step counts!";
pub const DEFAULT_COMBINED: &str = "📚 Keep practicing and exploring. Consistency is key!";

const MATERIALS: [&str; 6] = [
    "🔹 Basics tutorial video + guided beginner-level exercises.",
    "🔸 Visual explanation content + step-by-step practice problems.",
    "🔹 Practice exercises with hints enabled + instant feedback.",
    "✅ Standard module content + end-of-lesson quiz.",
    "🌟 Advanced challenge problems + peer group discussion tasks.",
    "🏆 Project-based learning module + opportunity to mentor peers.",
];

const FEEDBACK: [&str; 6] = [
    "It’s okay to struggle — the key is to keep going. Let’s review the basics together.",
    "You’re making progress. Focus on the foundation, and don’t hesitate to seek help.",
    "You’ve got potential. A little more consistent effort will go a long way!",
    "Nice work! You’re on track — just refine your skills step by step.",
    "Great job! You’ve developed a solid understanding. Keep challenging yourself.",
    "Outstanding! You’ve truly mastered the topic. Consider exploring advanced material or helping peers.",
];

/// Learning material for a category ordinal.
pub fn material_for(ordinal: i64) -> &'static str {
    usize::try_from(ordinal)
        .ok()
        .and_then(|i| MATERIALS.get(i))
        .copied()
        .unwrap_or(DEFAULT_MATERIAL)
}

/// Encouragement text for a category ordinal.
pub fn feedback_for(ordinal: i64) -> &'static str {
    usize::try_from(ordinal)
        .ok()
        .and_then(|i| FEEDBACK.get(i))
        .copied()
        .unwrap_or(DEFAULT_FEEDBACK)
}

/// Recommendation for a category name and a profile label.
///
/// The category must match one of the six names exactly. The profile is
/// matched by substring, so labels with or without their marker both work.
/// Within a category the branches are checked in the order written.
pub fn combined_recommendation(category: &str, profile: &str) -> &'static str {
    let is = |p: LearnerProfile| profile.contains(p.name());

    match category {
        "Poor" => {
            if is(LearnerProfile::ConfusedLearner) {
                "🔁 Start with a short concept video, then move to guided practice with step-by-step hints."
            } else if is(LearnerProfile::SlowCareful) {
                "🧩 Try scaffolded exercises with feedback after each step to build confidence."
            } else {
                "📘 Begin with foundational videos and low-difficulty exercises."
            }
        }
        "Weak" => {
            if is(LearnerProfile::ConfusedLearner) {
                "🎥 Rewatch key concepts and then try practice problems with hints enabled."
            } else if is(LearnerProfile::FastCareless) {
                "⏳ Try slower-paced problems with explanations after each question."
            } else {
                "📝 Use interactive lessons followed by short quizzes with explanations."
            }
        }
        "Below Average" => {
            if is(LearnerProfile::FastCareless) {
                "💡 Focus on accuracy. Try untimed quizzes with instant feedback."
            } else if is(LearnerProfile::FocusedPerformer) {
                "📚 Review summaries, then solve medium-difficulty problems."
            } else {
                "🛠 Practice mid-level problems with hints disabled, and reflect after each one."
            }
        }
        "Average" => {
            if is(LearnerProfile::FocusedPerformer) {
                "🎯 Challenge yourself with tougher problems or skip ahead modules."
            } else if is(LearnerProfile::SlowCareful) {
                "📖 Review notes, then solve a mixed-difficulty quiz to reinforce learning."
            } else {
                "🚀 Stay on track with standard lessons and end-of-module quizzes."
            }
        }
        "Strong" => "🏆 Try optional challenge activities, explore related topics, or help peers.",
        "Outstanding" => {
            "🌟 You’re doing amazing! Dive into advanced modules or explore new areas beyond the curriculum."
        }
        _ => DEFAULT_COMBINED,
    }
}

/// All recommendation texts for one prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub feedback: &'static str,
    pub material: &'static str,
    pub combined: &'static str,
}

impl Recommendation {
    pub fn for_outcome(category: Category, profile: LearnerProfile) -> Self {
        let ordinal = i64::from(category.ordinal());
        Self {
            feedback: feedback_for(ordinal),
            material: material_for(ordinal),
            combined: combined_recommendation(category.name(), profile.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poor_branches() {
        assert!(combined_recommendation("Poor", "Confused Learner 🤔").starts_with("🔁"));
        assert!(combined_recommendation("Poor", "Slow and Careful 🐢").starts_with("🧩"));
        assert_eq!(
            combined_recommendation("Poor", "General Learner"),
            "📘 Begin with foundational videos and low-difficulty exercises."
        );
        // not named in the Poor branch
        assert_eq!(
            combined_recommendation("Poor", "Fast but Careless 🐇"),
            combined_recommendation("Poor", "General Learner")
        );
    }

    #[test]
    fn profile_sensitive_categories() {
        assert!(combined_recommendation("Weak", "Fast but Careless 🐇").starts_with("⏳"));
        assert!(combined_recommendation("Weak", "Focused Performer 🎯").starts_with("📝"));
        assert!(combined_recommendation("Below Average", "Focused Performer 🎯").starts_with("📚"));
        assert!(combined_recommendation("Below Average", "Confused Learner 🤔").starts_with("🛠"));
        assert!(combined_recommendation("Average", "Slow and Careful 🐢").starts_with("📖"));
        assert!(combined_recommendation("Average", "General Learner").starts_with("🚀"));
    }

    #[test]
    fn top_categories_ignore_profile() {
        let fixed = combined_recommendation("Outstanding", "General Learner");
        for p in LearnerProfile::ALL {
            assert_eq!(combined_recommendation("Outstanding", p.label()), fixed);
        }
        assert_eq!(
            combined_recommendation("Strong", "Confused Learner 🤔"),
            combined_recommendation("Strong", "Fast but Careless 🐇")
        );
    }

    #[test]
    fn unknown_category_falls_back() {
        assert_eq!(
            combined_recommendation("Legendary", "Confused Learner 🤔"),
            DEFAULT_COMBINED
        );
        // category names are matched exactly
        assert_eq!(combined_recommendation("poor", "General Learner"), DEFAULT_COMBINED);
    }

    #[test]
    fn ordinal_tables() {
        assert!(material_for(0).contains("Basics tutorial"));
        assert!(material_for(5).contains("mentor peers"));
        assert_eq!(material_for(6), DEFAULT_MATERIAL);
        assert_eq!(material_for(-1), DEFAULT_MATERIAL);
        assert!(feedback_for(3).starts_with("Nice work!"));
        assert_eq!(feedback_for(42), DEFAULT_FEEDBACK);
    }

    #[test]
    fn bundle_uses_all_lookups() {
        let rec = Recommendation::for_outcome(Category::Average, LearnerProfile::FocusedPerformer);
        assert_eq!(rec.feedback, feedback_for(3));
        assert_eq!(rec.material, material_for(3));
        assert!(rec.combined.starts_with("🎯"));
    }
}
