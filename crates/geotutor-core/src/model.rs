//! Core data model types for geotutor.
//!
//! These are the fundamental types that the tutoring core uses to represent
//! shapes, difficulty bands, problems, student records, and attempt outcomes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TutorError, TutorResult};

/// Supported shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Triangle,
    Square,
    Rectangle,
}

impl Shape {
    /// All supported shapes, in presentation order.
    pub const ALL: [Shape; 3] = [Shape::Triangle, Shape::Square, Shape::Rectangle];

    /// The area formula in words, as shown to students.
    pub fn formula(&self) -> &'static str {
        match self {
            Shape::Triangle => "½ × base × height",
            Shape::Square => "side × side",
            Shape::Rectangle => "length × width",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Triangle => write!(f, "triangle"),
            Shape::Square => write!(f, "square"),
            Shape::Rectangle => write!(f, "rectangle"),
        }
    }
}

impl FromStr for Shape {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "triangle" => Ok(Shape::Triangle),
            "square" => Ok(Shape::Square),
            "rectangle" => Ok(Shape::Rectangle),
            other => Err(TutorError::InvalidShape(other.to_string())),
        }
    }
}

/// Difficulty bands, ordered `Easy < Medium < Hard`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// One band harder, saturating at `Hard`.
    pub fn harder(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One band easier, saturating at `Easy`.
    pub fn easier(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
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
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "mid" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(TutorError::Validation(format!(
                "unknown difficulty: {other}"
            ))),
        }
    }
}

/// The measured sides of a shape. The shape is implied by the variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Dimensions {
    Triangle { base: f64, height: f64 },
    Square { side: f64 },
    Rectangle { length: f64, width: f64 },
}

impl Dimensions {
    pub fn shape(&self) -> Shape {
        match self {
            Dimensions::Triangle { .. } => Shape::Triangle,
            Dimensions::Square { .. } => Shape::Square,
            Dimensions::Rectangle { .. } => Shape::Rectangle,
        }
    }

    /// Area computed from the dimensions.
    pub fn area(&self) -> f64 {
        match *self {
            Dimensions::Triangle { base, height } => 0.5 * base * height,
            Dimensions::Square { side } => side * side,
            Dimensions::Rectangle { length, width } => length * width,
        }
    }

    /// Named dimension values, in presentation order.
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Dimensions::Triangle { base, height } => vec![("base", base), ("height", height)],
            Dimensions::Square { side } => vec![("side", side)],
            Dimensions::Rectangle { length, width } => vec![("length", length), ("width", width)],
        }
    }
}

/// A generated area problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Unique identifier used to refer back to this problem.
    pub id: Uuid,
    /// The shape and its sides.
    pub dimensions: Dimensions,
    /// Difficulty band the problem was generated at.
    pub difficulty: Difficulty,
    /// When the problem was generated.
    pub created_at: DateTime<Utc>,
}

impl Problem {
    pub fn new(dimensions: Dimensions, difficulty: Difficulty) -> Self {
        Self {
            id: Uuid::new_v4(),
            dimensions,
            difficulty,
            created_at: Utc::now(),
        }
    }

    pub fn shape(&self) -> Shape {
        self.dimensions.shape()
    }

    /// Expected area. Always derived from the current dimensions.
    pub fn area(&self) -> f64 {
        self.dimensions.area()
    }

    /// Problem statement for text presentation.
    pub fn prompt(&self) -> String {
        let sides = self
            .dimensions
            .named()
            .into_iter()
            .map(|(name, value)| format!("{name} = {value}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} ({}): {sides}. What is the area?",
            capitalize(&self.shape().to_string()),
            self.difficulty
        )
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A student's persisted progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Student identifier. File stores key records by id, so it may be absent on disk.
    #[serde(default)]
    pub id: String,
    /// Mastery estimate in `[0, 1]`.
    #[serde(default = "default_mastery")]
    pub mastery: f64,
    /// Current difficulty band.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Total answered problems.
    #[serde(default)]
    pub attempts: u32,
    /// Correctly answered problems.
    #[serde(default)]
    pub correct: u32,
    /// Last time the student answered a problem.
    #[serde(
        default = "Utc::now",
        alias = "last_login",
        deserialize_with = "timestamp::deserialize"
    )]
    pub last_activity: DateTime<Utc>,
}

/// Mastery given to students who have never been seen before.
pub const DEFAULT_INITIAL_MASTERY: f64 = 0.5;

fn default_mastery() -> f64 {
    DEFAULT_INITIAL_MASTERY
}

impl StudentRecord {
    /// A fresh record at the easy band with no attempts.
    pub fn new(id: impl Into<String>, initial_mastery: f64) -> Self {
        Self {
            id: id.into(),
            mastery: initial_mastery,
            difficulty: Difficulty::Easy,
            attempts: 0,
            correct: 0,
            last_activity: Utc::now(),
        }
    }

    /// Check the record's invariants.
    pub fn validate(&self) -> TutorResult<()> {
        if !(0.0..=1.0).contains(&self.mastery) {
            return Err(TutorError::Validation(format!(
                "mastery {} for student '{}' is outside [0, 1]",
                self.mastery, self.id
            )));
        }
        if self.correct > self.attempts {
            return Err(TutorError::Validation(format!(
                "student '{}' has {} correct answers but only {} attempts",
                self.id, self.correct, self.attempts
            )));
        }
        Ok(())
    }

    /// Fraction of attempts answered correctly (0 with no attempts).
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.correct as f64 / self.attempts as f64
        }
    }
}

/// Accepts RFC 3339 timestamps as well as the naive `YYYY-MM-DDTHH:MM:SS`
/// form older record files contain (read as UTC).
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// The outcome of checking one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    /// The problem that was answered.
    pub problem_id: Uuid,
    pub shape: Shape,
    /// Band of the answered problem, not the student's next band.
    pub difficulty: Difficulty,
    /// What the student submitted.
    pub answer: f64,
    /// The problem's true area.
    pub expected: f64,
    pub correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// What a difficulty evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Promote,
    Demote,
    Hold,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Promote => write!(f, "promote"),
            Transition::Demote => write!(f, "demote"),
            Transition::Hold => write!(f, "hold"),
        }
    }
}

/// Everything the presentation layer needs after an answer is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub attempt: AttemptResult,
    /// Mastery after the update.
    pub mastery: f64,
    pub previous_difficulty: Difficulty,
    /// Band for the next generated problem.
    pub difficulty: Difficulty,
    pub transition: Transition,
    /// Human-readable feedback.
    pub message: String,
}

impl FeedbackResult {
    pub fn correct(&self) -> bool {
        self.attempt.correct
    }
}
