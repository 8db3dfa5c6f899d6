//! Progress summaries for one student and for everyone in a store.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, StudentRecord};
use crate::store::RecordStore;

/// A student's progress as shown to students and teachers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub student_id: String,
    pub mastery: f64,
    /// Mastery as a whole percentage, rounded down.
    pub mastery_percent: u32,
    pub difficulty: Difficulty,
    pub attempts: u32,
    pub correct: u32,
    /// Correct answers over attempts (0 with no attempts).
    pub accuracy: f64,
    pub last_activity: DateTime<Utc>,
}

impl From<&StudentRecord> for ProgressSummary {
    fn from(record: &StudentRecord) -> Self {
        Self {
            student_id: record.id.clone(),
            mastery: record.mastery,
            mastery_percent: (record.mastery * 100.0) as u32,
            difficulty: record.difficulty,
            attempts: record.attempts,
            correct: record.correct,
            accuracy: record.accuracy(),
            last_activity: record.last_activity,
        }
    }
}

/// Aggregate over every student in a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub students: usize,
    pub mean_mastery: f64,
    pub total_attempts: u64,
    pub total_correct: u64,
    /// Correct over attempts across all students.
    pub overall_accuracy: f64,
    /// Number of students currently at each band.
    pub by_difficulty: BTreeMap<Difficulty, usize>,
}

impl GroupSummary {
    pub fn from_summaries(summaries: &[ProgressSummary]) -> Self {
        if summaries.is_empty() {
            return Self::default();
        }
        let mut by_difficulty = BTreeMap::new();
        let mut total_attempts = 0u64;
        let mut total_correct = 0u64;
        let mut mastery_sum = 0.0;
        for s in summaries {
            *by_difficulty.entry(s.difficulty).or_insert(0) += 1;
            total_attempts += u64::from(s.attempts);
            total_correct += u64::from(s.correct);
            mastery_sum += s.mastery;
        }
        let overall_accuracy = if total_attempts == 0 {
            0.0
        } else {
            total_correct as f64 / total_attempts as f64
        };
        Self {
            students: summaries.len(),
            mean_mastery: mastery_sum / summaries.len() as f64,
            total_attempts,
            total_correct,
            overall_accuracy,
            by_difficulty,
        }
    }
}

/// Summaries for every student in `store`, ordered by id.
pub fn summarize_store(store: &dyn RecordStore) -> Result<Vec<ProgressSummary>> {
    let mut summaries = Vec::new();
    for id in store.student_ids()? {
        if let Some(record) = store.load(&id)? {
            summaries.push(ProgressSummary::from(&record));
        }
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn record(
        id: &str,
        mastery: f64,
        difficulty: Difficulty,
        attempts: u32,
        correct: u32,
    ) -> StudentRecord {
        StudentRecord {
            difficulty,
            attempts,
            correct,
            ..StudentRecord::new(id, mastery)
        }
    }

    #[test]
    fn summary_truncates_percentage() {
        let summary = ProgressSummary::from(&record("a", 0.6789, Difficulty::Medium, 8, 6));
        assert_eq!(summary.mastery_percent, 67);
        assert_eq!(summary.accuracy, 0.75);
        assert_eq!(summary.difficulty, Difficulty::Medium);
    }

    #[test]
    fn group_summary_aggregates() {
        let summaries = vec![
            ProgressSummary::from(&record("a", 0.2, Difficulty::Easy, 4, 1)),
            ProgressSummary::from(&record("b", 0.8, Difficulty::Hard, 6, 5)),
            ProgressSummary::from(&record("c", 0.5, Difficulty::Easy, 0, 0)),
        ];
        let group = GroupSummary::from_summaries(&summaries);
        assert_eq!(group.students, 3);
        assert!((group.mean_mastery - 0.5).abs() < 1e-12);
        assert_eq!(group.total_attempts, 10);
        assert_eq!(group.total_correct, 6);
        assert!((group.overall_accuracy - 0.6).abs() < 1e-12);
        assert_eq!(group.by_difficulty.get(&Difficulty::Easy), Some(&2));
        assert_eq!(group.by_difficulty.get(&Difficulty::Medium), None);
    }

    #[test]
    fn empty_group() {
        let group = GroupSummary::from_summaries(&[]);
        assert_eq!(group.students, 0);
        assert_eq!(group.overall_accuracy, 0.0);
    }

    #[test]
    fn summarize_store_in_id_order() {
        let mut store = MemoryStore::new();
        store.save(&record("zed", 0.3, Difficulty::Easy, 1, 0)).unwrap();
        store.save(&record("amy", 0.9, Difficulty::Hard, 5, 5)).unwrap();
        let summaries = summarize_store(&store).unwrap();
        let ids: Vec<_> = summaries.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, vec!["amy", "zed"]);
    }
}
