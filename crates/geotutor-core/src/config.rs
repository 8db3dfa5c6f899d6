//! Tutor configuration and loading.
//!
//! Every tunable of the tutoring core lives in [`TutorConfig`]. Files may be
//! partial: anything missing falls back to its default. A config is only
//! usable after [`TutorConfig::validate`] has accepted it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{TutorError, TutorResult};
use crate::model::{Difficulty, DEFAULT_INITIAL_MASTERY};

/// Top-level geotutor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub mastery: MasteryConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    #[serde(default)]
    pub ranges: DimensionRanges,
}

/// Which mastery update rule to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryModel {
    /// `m + α(1 - m)` on correct, `m - βm` on incorrect.
    #[default]
    Linear,
    /// Classical knowledge tracing with guess, slip, and learn probabilities.
    Bkt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryConfig {
    #[serde(default)]
    pub model: MasteryModel,
    /// Learning rate applied on correct answers.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Decay rate applied on incorrect answers.
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Mastery assigned to new students.
    #[serde(default = "default_initial_mastery")]
    pub initial_mastery: f64,
    #[serde(default)]
    pub bkt: BktParams,
}

fn default_alpha() -> f64 {
    0.1
}
fn default_beta() -> f64 {
    0.15
}
fn default_initial_mastery() -> f64 {
    DEFAULT_INITIAL_MASTERY
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            model: MasteryModel::default(),
            alpha: default_alpha(),
            beta: default_beta(),
            initial_mastery: default_initial_mastery(),
            bkt: BktParams::default(),
        }
    }
}

/// Knowledge-tracing probabilities, used by [`MasteryModel::Bkt`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BktParams {
    /// Chance of answering correctly without knowing the skill.
    #[serde(default = "default_guess")]
    pub guess: f64,
    /// Chance of answering wrongly despite knowing the skill.
    #[serde(default = "default_slip")]
    pub slip: f64,
    /// Chance of learning the skill on each attempt.
    #[serde(default = "default_learn")]
    pub learn: f64,
}

fn default_guess() -> f64 {
    0.2
}
fn default_slip() -> f64 {
    0.1
}
fn default_learn() -> f64 {
    0.3
}

impl Default for BktParams {
    fn default() -> Self {
        Self {
            guess: default_guess(),
            slip: default_slip(),
            learn: default_learn(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Mastery at or above which the band goes up.
    #[serde(default = "default_promote")]
    pub promote_threshold: f64,
    /// Mastery below which the band goes down.
    #[serde(default = "default_demote")]
    pub demote_threshold: f64,
    /// Allow jumping two bands at once on very high mastery.
    #[serde(default)]
    pub allow_double_step: bool,
    #[serde(default = "default_double_step")]
    pub double_step_threshold: f64,
}

fn default_promote() -> f64 {
    0.7
}
fn default_demote() -> f64 {
    0.3
}
fn default_double_step() -> f64 {
    0.9
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            promote_threshold: default_promote(),
            demote_threshold: default_demote(),
            allow_double_step: false,
            double_step_threshold: default_double_step(),
        }
    }
}

/// How close an answer must be to the true area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    #[serde(default = "default_absolute")]
    pub absolute: f64,
    /// Fraction of the true area.
    #[serde(default)]
    pub relative: f64,
}

fn default_absolute() -> f64 {
    0.01
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            absolute: default_absolute(),
            relative: 0.0,
        }
    }
}

impl ToleranceConfig {
    /// Whether `answer` is close enough to `expected`.
    pub fn accepts(&self, answer: f64, expected: f64) -> bool {
        let allowed = self.absolute.max(self.relative * expected.abs());
        (answer - expected).abs() <= allowed
    }
}

/// Sampling range for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionRange {
    pub min: f64,
    pub max: f64,
    /// Decimal places kept. Zero samples whole numbers only.
    #[serde(default)]
    pub decimals: u32,
}

impl DimensionRange {
    pub const fn integer(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            decimals: 0,
        }
    }

    pub const fn real(min: f64, max: f64, decimals: u32) -> Self {
        Self { min, max, decimals }
    }

    /// Whether `value` could have been drawn from this range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &str) -> TutorResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(invalid(format!("{name}: bounds must be finite")));
        }
        if self.min <= 0.0 {
            return Err(invalid(format!("{name}: min must be positive")));
        }
        if self.max < self.min {
            return Err(invalid(format!(
                "{name}: max {} is below min {}",
                self.max, self.min
            )));
        }
        if self.decimals > 6 {
            return Err(invalid(format!("{name}: at most 6 decimals supported")));
        }
        if self.decimals == 0 && self.min.ceil() > self.max.floor() {
            return Err(invalid(format!(
                "{name}: no whole number between {} and {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleRanges {
    pub base: DimensionRange,
    pub height: DimensionRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquareRanges {
    pub side: DimensionRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleRanges {
    pub length: DimensionRange,
    pub width: DimensionRange,
}

/// Ranges for every shape within one difficulty band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeRanges {
    pub triangle: TriangleRanges,
    pub square: SquareRanges,
    pub rectangle: RectangleRanges,
}

impl ShapeRanges {
    fn validate(&self, band: Difficulty) -> TutorResult<()> {
        self.triangle
            .base
            .validate(&format!("ranges.{band}.triangle.base"))?;
        self.triangle
            .height
            .validate(&format!("ranges.{band}.triangle.height"))?;
        self.square
            .side
            .validate(&format!("ranges.{band}.square.side"))?;
        self.rectangle
            .length
            .validate(&format!("ranges.{band}.rectangle.length"))?;
        self.rectangle
            .width
            .validate(&format!("ranges.{band}.rectangle.width"))?;
        Ok(())
    }
}

/// Per-difficulty, per-shape dimension ranges.
///
/// Files may override single dimensions; everything not listed keeps the
/// default for its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialRanges")]
pub struct DimensionRanges {
    pub easy: ShapeRanges,
    pub medium: ShapeRanges,
    pub hard: ShapeRanges,
}

#[derive(Debug, Default, Deserialize)]
struct PartialRanges {
    #[serde(default)]
    easy: PartialShapeRanges,
    #[serde(default)]
    medium: PartialShapeRanges,
    #[serde(default)]
    hard: PartialShapeRanges,
}

#[derive(Debug, Default, Deserialize)]
struct PartialShapeRanges {
    #[serde(default)]
    triangle: PartialTriangle,
    #[serde(default)]
    square: PartialSquare,
    #[serde(default)]
    rectangle: PartialRectangle,
}

#[derive(Debug, Default, Deserialize)]
struct PartialTriangle {
    base: Option<DimensionRange>,
    height: Option<DimensionRange>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialSquare {
    side: Option<DimensionRange>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialRectangle {
    length: Option<DimensionRange>,
    width: Option<DimensionRange>,
}

impl PartialShapeRanges {
    fn over(self, base: ShapeRanges) -> ShapeRanges {
        ShapeRanges {
            triangle: TriangleRanges {
                base: self.triangle.base.unwrap_or(base.triangle.base),
                height: self.triangle.height.unwrap_or(base.triangle.height),
            },
            square: SquareRanges {
                side: self.square.side.unwrap_or(base.square.side),
            },
            rectangle: RectangleRanges {
                length: self.rectangle.length.unwrap_or(base.rectangle.length),
                width: self.rectangle.width.unwrap_or(base.rectangle.width),
            },
        }
    }
}

impl From<PartialRanges> for DimensionRanges {
    fn from(partial: PartialRanges) -> Self {
        Self {
            easy: partial.easy.over(default_easy()),
            medium: partial.medium.over(default_medium()),
            hard: partial.hard.over(default_hard()),
        }
    }
}

impl DimensionRanges {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> &ShapeRanges {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

fn default_easy() -> ShapeRanges {
    ShapeRanges {
        triangle: TriangleRanges {
            base: DimensionRange::integer(3.0, 8.0),
            height: DimensionRange::integer(3.0, 8.0),
        },
        square: SquareRanges {
            side: DimensionRange::integer(3.0, 8.0),
        },
        rectangle: RectangleRanges {
            length: DimensionRange::integer(4.0, 8.0),
            width: DimensionRange::integer(3.0, 6.0),
        },
    }
}

fn default_medium() -> ShapeRanges {
    ShapeRanges {
        triangle: TriangleRanges {
            base: DimensionRange::integer(6.0, 12.0),
            height: DimensionRange::real(5.0, 10.0, 1),
        },
        square: SquareRanges {
            side: DimensionRange::integer(7.0, 15.0),
        },
        rectangle: RectangleRanges {
            length: DimensionRange::integer(8.0, 15.0),
            width: DimensionRange::integer(5.0, 10.0),
        },
    }
}

fn default_hard() -> ShapeRanges {
    ShapeRanges {
        triangle: TriangleRanges {
            base: DimensionRange::real(8.0, 20.0, 1),
            height: DimensionRange::real(6.0, 15.0, 1),
        },
        square: SquareRanges {
            side: DimensionRange::real(10.0, 25.0, 1),
        },
        rectangle: RectangleRanges {
            length: DimensionRange::real(10.0, 30.0, 1),
            width: DimensionRange::real(5.0, 15.0, 1),
        },
    }
}

impl Default for DimensionRanges {
    fn default() -> Self {
        Self {
            easy: default_easy(),
            medium: default_medium(),
            hard: default_hard(),
        }
    }
}

fn invalid(message: String) -> TutorError {
    TutorError::Validation(message)
}

fn open_unit(name: &str, value: f64) -> TutorResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be in (0, 1), got {value}")))
    }
}

fn closed_unit(name: &str, value: f64) -> TutorResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be in [0, 1], got {value}")))
    }
}

impl TutorConfig {
    /// Check every tunable. Returns the first problem found.
    pub fn validate(&self) -> TutorResult<()> {
        let m = &self.mastery;
        open_unit("mastery.alpha", m.alpha)?;
        open_unit("mastery.beta", m.beta)?;
        closed_unit("mastery.initial_mastery", m.initial_mastery)?;
        if m.model == MasteryModel::Bkt {
            closed_unit("mastery.bkt.guess", m.bkt.guess)?;
            closed_unit("mastery.bkt.slip", m.bkt.slip)?;
            closed_unit("mastery.bkt.learn", m.bkt.learn)?;
            if m.bkt.guess >= 1.0 || m.bkt.slip >= 1.0 {
                return Err(invalid("mastery.bkt guess and slip must be below 1".into()));
            }
        }

        let p = &self.policy;
        closed_unit("policy.promote_threshold", p.promote_threshold)?;
        closed_unit("policy.demote_threshold", p.demote_threshold)?;
        if p.demote_threshold >= p.promote_threshold {
            return Err(invalid(format!(
                "policy.demote_threshold ({}) must be below policy.promote_threshold ({})",
                p.demote_threshold, p.promote_threshold
            )));
        }
        if p.allow_double_step {
            closed_unit("policy.double_step_threshold", p.double_step_threshold)?;
            if p.double_step_threshold < p.promote_threshold {
                return Err(invalid(
                    "policy.double_step_threshold must not be below policy.promote_threshold"
                        .into(),
                ));
            }
        }

        let t = &self.tolerance;
        if !(t.absolute.is_finite() && t.absolute >= 0.0)
            || !(t.relative.is_finite() && t.relative >= 0.0)
        {
            return Err(invalid("tolerance values must be finite and non-negative".into()));
        }
        if t.absolute == 0.0 && t.relative == 0.0 {
            return Err(invalid(
                "tolerance.absolute or tolerance.relative must be positive".into(),
            ));
        }

        for band in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            self.ranges.for_difficulty(band).validate(band)?;
        }
        Ok(())
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TutorConfig = toml::from_str(content).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `geotutor.toml` in the current directory
/// 2. `~/.config/geotutor/config.toml`
///
/// Environment variable overrides: `GEOTUTOR_ALPHA`, `GEOTUTOR_BETA`.
pub fn load_config() -> Result<TutorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TutorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("geotutor.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loading config from {}", path.display());
            toml::from_str::<TutorConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TutorConfig::default(),
    };

    if let Some(alpha) = env_f64("GEOTUTOR_ALPHA")? {
        config.mastery.alpha = alpha;
    }
    if let Some(beta) = env_f64("GEOTUTOR_BETA")? {
        config.mastery.beta = beta;
    }

    config.validate()?;
    Ok(config)
}

fn env_f64(var: &str) -> Result<Option<f64>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("{var} is not a number: {raw}")),
        Err(_) => Ok(None),
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("geotutor"))
}
