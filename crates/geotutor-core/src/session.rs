//! Session orchestration.
//!
//! The controller ties the pieces together for one student at a time:
//! generate a problem at the student's band, check the answer, update
//! mastery, re-evaluate the band, and persist the record.

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{ToleranceConfig, TutorConfig};
use crate::error::{TutorError, TutorResult};
use crate::generator::{ProblemGenerator, WorkedExample};
use crate::mastery::MasteryTracker;
use crate::model::{
    AttemptResult, Difficulty, FeedbackResult, Problem, Shape, StudentRecord, Transition,
};
use crate::policy::DifficultyPolicy;
use crate::progress::ProgressSummary;
use crate::store::RecordStore;

/// Runs tutoring sessions against an injected record store.
pub struct SessionController<S, R = ChaCha8Rng> {
    store: S,
    generator: ProblemGenerator<R>,
    tracker: MasteryTracker,
    policy: DifficultyPolicy,
    tolerance: ToleranceConfig,
    initial_mastery: f64,
}

impl<S: RecordStore> SessionController<S, ChaCha8Rng> {
    /// Controller whose problems are reproducible from `seed`.
    pub fn seeded(config: TutorConfig, store: S, seed: u64) -> TutorResult<Self> {
        Self::new(config, store, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Controller with an OS-seeded random source.
    pub fn from_entropy(config: TutorConfig, store: S) -> TutorResult<Self> {
        Self::new(config, store, ChaCha8Rng::from_entropy())
    }
}

impl<S: RecordStore, R: Rng> SessionController<S, R> {
    /// Build a controller. Fails if the configuration is invalid.
    pub fn new(config: TutorConfig, store: S, rng: R) -> TutorResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            generator: ProblemGenerator::new(config.ranges, rng),
            tracker: MasteryTracker::new(config.mastery.clone()),
            policy: DifficultyPolicy::new(config.policy),
            tolerance: config.tolerance,
            initial_mastery: config.mastery.initial_mastery,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Load a student's record, creating and saving a fresh one if needed.
    pub fn start_session(&mut self, student_id: &str) -> TutorResult<StudentRecord> {
        check_id(student_id)?;
        match self.store.load(student_id)? {
            Some(record) => {
                record.validate()?;
                tracing::info!(
                    student = student_id,
                    mastery = record.mastery,
                    difficulty = %record.difficulty,
                    "session started"
                );
                Ok(record)
            }
            None => {
                let record = StudentRecord::new(student_id, self.initial_mastery);
                self.store.save(&record)?;
                tracing::info!(student = student_id, "created new student record");
                Ok(record)
            }
        }
    }

    /// The band the student's next problem will be generated at.
    pub fn current_difficulty(&self, student_id: &str) -> TutorResult<Difficulty> {
        Ok(self.record_or_new(student_id)?.difficulty)
    }

    /// Generate a problem at the student's current band.
    pub fn next_problem(&mut self, student_id: &str, shape: Shape) -> TutorResult<Problem> {
        let difficulty = self.current_difficulty(student_id)?;
        Ok(self.generator.generate(shape, difficulty))
    }

    /// Check `answer` against `problem` and update the student's record.
    ///
    /// Nothing is loaded or saved unless the answer parses. The record is
    /// saved only after the mastery update and band evaluation succeed.
    pub fn submit_answer(
        &mut self,
        student_id: &str,
        problem: &Problem,
        answer: &str,
    ) -> TutorResult<FeedbackResult> {
        check_id(student_id)?;
        let answer = parse_answer(answer)?;

        let mut record = self.record_or_new(student_id)?;
        let previous_difficulty = record.difficulty;

        let expected = problem.area();
        let correct = self.tolerance.accepts(answer, expected);
        let answered_at = Utc::now();

        let mastery = self.tracker.update_at(&mut record, correct, answered_at)?;
        let (difficulty, transition) = self.policy.evaluate(mastery, previous_difficulty);
        record.difficulty = difficulty;
        self.store.save(&record)?;

        if transition != Transition::Hold {
            tracing::info!(
                student = student_id,
                from = %previous_difficulty,
                to = %difficulty,
                mastery,
                "difficulty changed"
            );
        }

        let attempt = AttemptResult {
            problem_id: problem.id,
            shape: problem.shape(),
            difficulty: problem.difficulty,
            answer,
            expected,
            correct,
            answered_at,
        };
        let message = feedback_message(&attempt, transition, difficulty);

        Ok(FeedbackResult {
            attempt,
            mastery,
            previous_difficulty,
            difficulty,
            transition,
            message,
        })
    }

    /// An easy solved problem for `shape`.
    pub fn worked_example(&mut self, shape: Shape) -> WorkedExample {
        self.generator.worked_example(shape)
    }

    /// The student's progress. Unknown students report a fresh record.
    pub fn progress(&self, student_id: &str) -> TutorResult<ProgressSummary> {
        Ok(ProgressSummary::from(&self.record_or_new(student_id)?))
    }

    fn record_or_new(&self, student_id: &str) -> TutorResult<StudentRecord> {
        check_id(student_id)?;
        Ok(self
            .store
            .load(student_id)?
            .unwrap_or_else(|| StudentRecord::new(student_id, self.initial_mastery)))
    }
}

fn check_id(student_id: &str) -> TutorResult<()> {
    if student_id.trim().is_empty() {
        return Err(TutorError::Validation("student id is empty".into()));
    }
    Ok(())
}

/// Read a typed answer as a finite number.
pub fn parse_answer(raw: &str) -> TutorResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TutorError::InvalidAnswer(
            "please enter a number for the area".into(),
        ));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| TutorError::InvalidAnswer(format!("'{trimmed}' is not a number")))?;
    if !value.is_finite() {
        return Err(TutorError::InvalidAnswer(format!(
            "'{trimmed}' is not a finite number"
        )));
    }
    Ok(value)
}

fn feedback_message(attempt: &AttemptResult, transition: Transition, next: Difficulty) -> String {
    let mut message = format!(
        "Your answer: {:.2} | Correct area: {:.2}\n",
        attempt.answer, attempt.expected
    );
    if attempt.correct {
        message.push_str("Correct! Well done!");
    } else {
        message.push_str(&format!(
            "Incorrect. Remember to apply the {} area formula: {}.",
            attempt.shape,
            attempt.shape.formula()
        ));
    }
    match transition {
        Transition::Promote => message.push_str(&format!("\nMoving up to {next} problems.")),
        Transition::Demote => message.push_str(&format!("\nMoving back to {next} problems.")),
        Transition::Hold => {}
    }
    message
}
