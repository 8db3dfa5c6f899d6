//! Randomized problem generation.
//!
//! Every call draws fresh dimensions from the ranges configured for the
//! requested band. The random source is injected so that sequences can be
//! replayed from a seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{DimensionRange, DimensionRanges};
use crate::error::TutorResult;
use crate::model::{capitalize, Difficulty, Dimensions, Problem, Shape};

/// Produces area problems for a shape at a difficulty band.
#[derive(Debug, Clone)]
pub struct ProblemGenerator<R = ChaCha8Rng> {
    ranges: DimensionRanges,
    rng: R,
}

impl ProblemGenerator<ChaCha8Rng> {
    /// Reproducible generator: the same seed yields the same problems.
    pub fn seeded(ranges: DimensionRanges, seed: u64) -> Self {
        Self::new(ranges, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy(ranges: DimensionRanges) -> Self {
        Self::new(ranges, ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> ProblemGenerator<R> {
    pub fn new(ranges: DimensionRanges, rng: R) -> Self {
        Self { ranges, rng }
    }

    pub fn ranges(&self) -> &DimensionRanges {
        &self.ranges
    }

    /// Generate a problem for `shape` at `difficulty`.
    pub fn generate(&mut self, shape: Shape, difficulty: Difficulty) -> Problem {
        let ranges = *self.ranges.for_difficulty(difficulty);
        let dimensions = match shape {
            Shape::Triangle => Dimensions::Triangle {
                base: sample(&mut self.rng, &ranges.triangle.base),
                height: sample(&mut self.rng, &ranges.triangle.height),
            },
            Shape::Square => Dimensions::Square {
                side: sample(&mut self.rng, &ranges.square.side),
            },
            Shape::Rectangle => Dimensions::Rectangle {
                length: sample(&mut self.rng, &ranges.rectangle.length),
                width: sample(&mut self.rng, &ranges.rectangle.width),
            },
        };
        let problem = Problem::new(dimensions, difficulty);
        tracing::debug!(
            problem = %problem.id,
            %shape,
            %difficulty,
            area = problem.area(),
            "generated problem"
        );
        problem
    }

    /// Generate from shape and difficulty names, as typed by a user.
    pub fn generate_named(&mut self, shape: &str, difficulty: &str) -> TutorResult<Problem> {
        let shape: Shape = shape.parse()?;
        let difficulty: Difficulty = difficulty.parse()?;
        Ok(self.generate(shape, difficulty))
    }

    /// An easy problem for `shape` solved step by step.
    pub fn worked_example(&mut self, shape: Shape) -> WorkedExample {
        let problem = self.generate(shape, Difficulty::Easy);
        WorkedExample::new(problem)
    }
}

/// A solved problem shown to the student as a model answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkedExample {
    pub problem: Problem,
    pub explanation: String,
}

impl WorkedExample {
    pub fn new(problem: Problem) -> Self {
        let shape = problem.shape();
        let sides = problem
            .dimensions
            .named()
            .into_iter()
            .map(|(name, value)| format!("{} = {value}", capitalize(name)))
            .collect::<Vec<_>>()
            .join(", ");
        let explanation = format!(
            "{} example:\n{sides}\nArea = {} = {:.2}",
            capitalize(&shape.to_string()),
            shape.formula(),
            problem.area()
        );
        Self {
            problem,
            explanation,
        }
    }
}

fn sample<R: Rng>(rng: &mut R, range: &DimensionRange) -> f64 {
    if range.decimals == 0 {
        let lo = range.min.ceil() as i64;
        let hi = range.max.floor() as i64;
        return rng.gen_range(lo..=hi) as f64;
    }
    let raw = rng.gen_range(range.min..=range.max);
    let factor = 10f64.powi(range.decimals as i32);
    ((raw * factor).round() / factor).clamp(range.min, range.max)
}
