//! Mastery tracking.
//!
//! Two update rules are available. The linear rule moves mastery a fixed
//! fraction toward 1 on a correct answer and toward 0 on a wrong one:
//!
//! ```text
//! correct:   m' = m + α(1 - m)
//! incorrect: m' = m - βm
//! ```
//!
//! The knowledge-tracing rule first computes the posterior probability that
//! the skill is known given the observation, then applies the learn
//! transition:
//!
//! ```text
//! correct:   p = m(1 - slip) / (m(1 - slip) + (1 - m)guess)
//! incorrect: p = m·slip / (m·slip + (1 - m)(1 - guess))
//! m' = p + (1 - p)learn
//! ```
//!
//! Both are clamped to `[0, 1]`.

use chrono::{DateTime, Utc};

use crate::config::{BktParams, MasteryConfig, MasteryModel};
use crate::error::{TutorError, TutorResult};
use crate::model::StudentRecord;

/// Updates mastery estimates and attempt counters.
#[derive(Debug, Clone)]
pub struct MasteryTracker {
    config: MasteryConfig,
}

impl MasteryTracker {
    pub fn new(config: MasteryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MasteryConfig {
        &self.config
    }

    /// Mastery after one more answer, without touching any record.
    pub fn next_mastery(&self, mastery: f64, correct: bool) -> TutorResult<f64> {
        if !(0.0..=1.0).contains(&mastery) {
            return Err(TutorError::Validation(format!(
                "mastery {mastery} is outside [0, 1]"
            )));
        }
        let next = match self.config.model {
            MasteryModel::Linear => linear(mastery, correct, self.config.alpha, self.config.beta),
            MasteryModel::Bkt => knowledge_tracing(mastery, correct, &self.config.bkt),
        };
        Ok(next.clamp(0.0, 1.0))
    }

    /// Apply one answer to `record` and return the new mastery.
    ///
    /// The record is checked first; on error it is left exactly as it was.
    pub fn update(&self, record: &mut StudentRecord, correct: bool) -> TutorResult<f64> {
        self.update_at(record, correct, Utc::now())
    }

    /// Like [`update`](Self::update) with an explicit activity timestamp.
    pub fn update_at(
        &self,
        record: &mut StudentRecord,
        correct: bool,
        at: DateTime<Utc>,
    ) -> TutorResult<f64> {
        record.validate()?;
        let mastery = self.next_mastery(record.mastery, correct)?;

        tracing::debug!(
            student = %record.id,
            correct,
            from = record.mastery,
            to = mastery,
            "mastery updated"
        );

        record.mastery = mastery;
        record.attempts += 1;
        if correct {
            record.correct += 1;
        }
        record.last_activity = at;
        Ok(mastery)
    }
}

fn linear(m: f64, correct: bool, alpha: f64, beta: f64) -> f64 {
    if correct {
        m + alpha * (1.0 - m)
    } else {
        m - beta * m
    }
}

fn knowledge_tracing(m: f64, correct: bool, params: &BktParams) -> f64 {
    let (num, den) = if correct {
        let num = m * (1.0 - params.slip);
        (num, num + (1.0 - m) * params.guess)
    } else {
        let num = m * params.slip;
        (num, num + (1.0 - m) * (1.0 - params.guess))
    };
    let posterior = if den != 0.0 { num / den } else { m };
    posterior + (1.0 - posterior) * params.learn
}
