//! Read-side queries over a set of prediction events.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use tutorlens_core::model::sort_newest_first;
use tutorlens_core::{Category, LearnerProfile, PredictionEvent};

/// All events of one student, in log order.
pub fn history_for(events: &[PredictionEvent], student_id: &str) -> Vec<PredictionEvent> {
    events
        .iter()
        .filter(|e| e.student_id == student_id)
        .cloned()
        .collect()
}

/// `(timestamp, score)` points for one student, oldest first.
pub fn score_series(events: &[PredictionEvent], student_id: &str) -> Vec<(NaiveDateTime, f64)> {
    let mut series: Vec<(NaiveDateTime, f64)> = events
        .iter()
        .filter(|e| e.student_id == student_id)
        .map(|e| (e.timestamp, e.predicted_score))
        .collect();
    series.sort_by_key(|(ts, _)| *ts);
    series
}

/// The most recent event per student.
///
/// Events are stably sorted newest first and the first occurrence of each id
/// is kept, so among equal timestamps the earliest row in the log wins.
pub fn latest_per_student(events: &[PredictionEvent]) -> BTreeMap<String, PredictionEvent> {
    let mut sorted = events.to_vec();
    sort_newest_first(&mut sorted);

    let mut latest = BTreeMap::new();
    for event in sorted {
        latest.entry(event.student_id.clone()).or_insert(event);
    }
    latest
}

/// Conjunctive equality filter for the classroom view. `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub category: Option<Category>,
    pub profile: Option<LearnerProfile>,
    pub subject: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &PredictionEvent) -> bool {
        self.category.map_or(true, |c| event.category == c)
            && self.profile.map_or(true, |p| event.learner_profile == p)
            && self
                .subject
                .as_deref()
                .map_or(true, |s| event.subject.as_deref() == Some(s))
    }
}

/// Latest-per-student events that pass `filter`, newest first.
pub fn filter_latest(events: &[PredictionEvent], filter: &EventFilter) -> Vec<PredictionEvent> {
    let mut selected: Vec<PredictionEvent> = latest_per_student(events)
        .into_values()
        .filter(|e| filter.matches(e))
        .collect();
    sort_newest_first(&mut selected);
    selected
}

/// Class-level roll-up of the latest snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassroomSummary {
    pub students: usize,
    pub mean_score: Option<f64>,
    pub by_category: BTreeMap<Category, usize>,
    pub by_profile: BTreeMap<LearnerProfile, usize>,
    /// Distinct non-empty subjects, sorted.
    pub subjects: Vec<String>,
}

pub fn classroom_summary(events: &[PredictionEvent]) -> ClassroomSummary {
    let latest = latest_per_student(events);
    let mut summary = ClassroomSummary {
        students: latest.len(),
        ..Default::default()
    };

    let mut total = 0.0;
    for event in latest.values() {
        total += event.predicted_score;
        *summary.by_category.entry(event.category).or_default() += 1;
        *summary.by_profile.entry(event.learner_profile).or_default() += 1;
        if let Some(subject) = &event.subject {
            if !summary.subjects.contains(subject) {
                summary.subjects.push(subject.clone());
            }
        }
    }
    summary.subjects.sort();
    if summary.students > 0 {
        summary.mean_score = Some(total / summary.students as f64);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tutorlens_core::FeatureVector;

    fn event(id: &str, minute: u32, score: f64, subject: Option<&str>) -> PredictionEvent {
        let info = tutorlens_core::categorize(score);
        PredictionEvent {
            student_id: id.into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, minute, 0)
                .unwrap(),
            grade: None,
            subject: subject.map(str::to_string),
            features: FeatureVector::default_input(),
            predicted_score: score,
            category: info.category,
            learner_profile: LearnerProfile::General,
        }
    }

    #[test]
    fn latest_picks_max_timestamp_regardless_of_row_order() {
        let events = vec![
            event("amy", 5, 0.2, None),
            event("amy", 30, 0.8, None),
            event("ben", 10, 0.5, None),
            event("amy", 20, 0.6, None),
        ];
        let latest = latest_per_student(&events);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["amy"].predicted_score, 0.8);
        assert_eq!(latest["ben"].predicted_score, 0.5);
    }

    #[test]
    fn latest_tie_keeps_earlier_row() {
        let events = vec![event("amy", 5, 0.1, None), event("amy", 5, 0.9, None)];
        assert_eq!(latest_per_student(&events)["amy"].predicted_score, 0.1);
    }

    #[test]
    fn series_is_chronological() {
        let events = vec![
            event("amy", 30, 0.8, None),
            event("ben", 10, 0.5, None),
            event("amy", 5, 0.2, None),
        ];
        let series = score_series(&events, "amy");
        let scores: Vec<f64> = series.iter().map(|(_, s)| *s).collect();
        assert_eq!(scores, [0.2, 0.8]);
        assert!(score_series(&events, "cat").is_empty());
    }

    #[test]
    fn filter_is_conjunctive_over_latest_only() {
        let events = vec![
            event("amy", 1, 0.2, Some("Math")),
            event("amy", 2, 0.95, Some("Math")),
            event("ben", 3, 0.1, Some("Math")),
            event("cal", 4, 0.15, Some("Science")),
        ];

        let poor = EventFilter {
            category: Some(Category::Poor),
            ..Default::default()
        };
        let ids: Vec<String> = filter_latest(&events, &poor)
            .into_iter()
            .map(|e| e.student_id)
            .collect();
        // amy's older Poor event is not part of the snapshot
        assert_eq!(ids, ["cal", "ben"]);

        let poor_math = EventFilter {
            subject: Some("Math".into()),
            ..poor.clone()
        };
        let ids: Vec<String> = filter_latest(&events, &poor_math)
            .into_iter()
            .map(|e| e.student_id)
            .collect();
        assert_eq!(ids, ["ben"]);

        let nobody = EventFilter {
            profile: Some(LearnerProfile::ConfusedLearner),
            ..Default::default()
        };
        assert!(filter_latest(&events, &nobody).is_empty());
        assert_eq!(filter_latest(&events, &EventFilter::default()).len(), 3);
    }

    #[test]
    fn summary_counts_latest_snapshot() {
        let events = vec![
            event("amy", 1, 0.2, Some("Math")),
            event("amy", 2, 0.95, Some("Math")),
            event("ben", 3, 0.1, Some("Science")),
        ];
        let summary = classroom_summary(&events);
        assert_eq!(summary.students, 2);
        assert_eq!(summary.by_category.get(&Category::Outstanding), Some(&1));
        assert_eq!(summary.by_category.get(&Category::Poor), Some(&1));
        assert_eq!(summary.by_profile.get(&LearnerProfile::General), Some(&2));
        assert_eq!(summary.subjects, ["Math", "Science"]);
        let mean = summary.mean_score.unwrap();
        assert!((mean - 0.525).abs() < 1e-12);
    }

    #[test]
    fn summary_of_nothing() {
        let summary = classroom_summary(&[]);
        assert_eq!(summary.students, 0);
        assert_eq!(summary.mean_score, None);
    }
}
