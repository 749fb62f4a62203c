//! Benchmark settings

use crate::batch::BATCH;
use crate::error::BenchError;
use crate::Variant;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lowest accepted number of timed repetitions per batch
pub const MIN_REPETITIONS: usize = 100;

/// Which variants are measured and cross-validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledVariants {
    pub scalar: bool,
    pub vectorized: bool,
    pub vec16: bool,
    pub vec2: bool,
    pub vec12: bool,
    pub horizontal: bool,
    pub horizontal2: bool,
}

impl Default for EnabledVariants {
    fn default() -> Self {
        Self {
            scalar: true,
            vectorized: true,
            vec16: true,
            vec2: true,
            vec12: true,
            horizontal: true,
            horizontal2: true,
        }
    }
}

impl EnabledVariants {
    pub fn contains(&self, variant: Variant) -> bool {
        match variant {
            Variant::Scalar => self.scalar,
            Variant::Vectorized => self.vectorized,
            Variant::Vec16 => self.vec16,
            Variant::Vec2 => self.vec2,
            Variant::Vec12 => self.vec12,
            Variant::Horizontal => self.horizontal,
            Variant::Horizontal2 => self.horizontal2,
        }
    }

    /// Enabled variants in report order
    pub fn iter(&self) -> impl Iterator<Item = Variant> + '_ {
        Variant::ALL.into_iter().filter(move |&v| self.contains(v))
    }
}

/// Settings for one benchmark run
///
/// Missing JSON fields take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Size of the query point set
    pub evaluations: usize,
    pub first_map_size: usize,
    pub max_map_size: usize,
    pub step_multiplier: f64,
    /// Timed runs per measurement batch
    pub repetitions: usize,
    /// A batch is stable when `stddev * stability_factor <= mean`
    pub stability_factor: f64,
    /// Upper bound on measurement batches per variant and trial
    pub max_batches: usize,
    /// Largest accepted per-component deviation from the scalar result
    pub tolerance: f32,
    pub seed: u64,
    pub enabled: EnabledVariants,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            evaluations: 10_000,
            first_map_size: 4,
            max_map_size: 256,
            step_multiplier: 1.25,
            repetitions: MIN_REPETITIONS,
            stability_factor: 20.0,
            max_batches: 16,
            tolerance: 1e-5,
            seed: 1,
            enabled: EnabledVariants::default(),
        }
    }
}

impl BenchConfig {
    pub fn from_json_str(s: &str) -> Result<Self, BenchError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    // Negated comparisons so NaN is rejected too
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), BenchError> {
        let fail = |msg: String| Err(BenchError::InvalidConfig(msg));

        if self.repetitions < MIN_REPETITIONS {
            return fail(format!("repetitions must be at least {MIN_REPETITIONS}, got {}", self.repetitions));
        }
        // Batch variants only see whole batches
        if self.evaluations == 0 || self.evaluations % BATCH != 0 {
            return fail(format!(
                "evaluations must be a positive multiple of {BATCH}, got {}",
                self.evaluations
            ));
        }
        if self.first_map_size < crate::grid::MIN_BINS {
            return fail(format!("first_map_size must be at least 4, got {}", self.first_map_size));
        }
        if self.max_map_size < self.first_map_size {
            return fail(format!(
                "max_map_size {} is below first_map_size {}",
                self.max_map_size, self.first_map_size
            ));
        }
        if !(self.step_multiplier > 1.0) {
            return fail(format!("step_multiplier must exceed 1, got {}", self.step_multiplier));
        }
        if !(self.stability_factor > 0.0) {
            return fail(format!("stability_factor must be positive, got {}", self.stability_factor));
        }
        if !(self.tolerance > 0.0) {
            return fail(format!("tolerance must be positive, got {}", self.tolerance));
        }
        if self.max_batches == 0 {
            return fail("max_batches must be at least 1".to_string());
        }
        Ok(())
    }
}
