//! Difficulty selection.
//!
//! A three-state machine over `easy < medium < hard`, driven only by the
//! current mastery value and the current band.

use crate::config::PolicyConfig;
use crate::model::{Difficulty, Transition};

/// Maps mastery to the band of the next problem.
#[derive(Debug, Clone)]
pub struct DifficultyPolicy {
    config: PolicyConfig,
}

impl DifficultyPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Band for the next problem.
    pub fn next_difficulty(&self, mastery: f64, current: Difficulty) -> Difficulty {
        self.evaluate(mastery, current).0
    }

    /// Band for the next problem and the move that produced it.
    ///
    /// A promotion or demotion that would leave the band unchanged (already
    /// at hard, already at easy) is reported as [`Transition::Hold`].
    pub fn evaluate(&self, mastery: f64, current: Difficulty) -> (Difficulty, Transition) {
        let next = if mastery >= self.config.promote_threshold {
            if self.config.allow_double_step && mastery >= self.config.double_step_threshold {
                current.harder().harder()
            } else {
                current.harder()
            }
        } else if mastery < self.config.demote_threshold {
            current.easier()
        } else {
            current
        };

        let transition = match next.cmp(&current) {
            std::cmp::Ordering::Greater => Transition::Promote,
            std::cmp::Ordering::Less => Transition::Demote,
            std::cmp::Ordering::Equal => Transition::Hold,
        };
        (next, transition)
    }
}
