//! Tutor error types.
//!
//! These error types represent failures inside the tutoring core. They are
//! recovered at the session boundary: answer and shape errors go back to the
//! student as something to fix, everything else is surfaced as a bug or an
//! environment problem.

use thiserror::Error;

/// Errors that can occur while tutoring a student.
#[derive(Debug, Error)]
pub enum TutorError {
    /// A value broke a model invariant or the configuration is invalid.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested shape is not one of the supported shapes.
    #[error("unsupported shape: {0}")]
    InvalidShape(String),

    /// The student's answer could not be read as a number.
    #[error("invalid answer: {0}")]
    InvalidAnswer(String),

    /// The record store failed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl TutorError {
    /// Returns `true` if the student can fix this error by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            TutorError::InvalidAnswer(_) | TutorError::InvalidShape(_)
        )
    }
}

/// Convenience alias for results in the tutoring core.
pub type TutorResult<T> = std::result::Result<T, TutorError>;
