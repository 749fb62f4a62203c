//! Measurement and cross-validation over a sweep of grid sizes
//!
//! Everything here returns structured results; formatting lives in
//! [`crate::report`].

use crate::batch::{batches, BATCH};
use crate::config::{BenchConfig, EnabledVariants};
use crate::error::{BenchError, Mismatch};
use crate::grid::GridSet;
use crate::tsc::CycleCounter;
use crate::{Evaluation, Point2, Point3, Variant};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::hint::black_box;
use tracing::{debug, warn};

/// Running mean and mean-of-squares of per-evaluation costs
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    sum: f64,
    sum_sq: f64,
    count: usize,
}

impl RunningStats {
    #[inline]
    pub fn record(&mut self, x: f64) {
        self.sum += x;
        self.sum_sq += x * x;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// `sqrt(E[x²] - E[x]²)`; rounding below zero reads as zero
    pub fn stddev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.count as f64 - mean * mean).max(0.0).sqrt()
    }
}

/// Cycles per evaluation of one variant in one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub mean: f64,
    pub stddev: f64,
    /// Repetition batches run, including the accepted one
    pub batches: usize,
    /// `false` when `max_batches` ran out before the spread settled
    pub converged: bool,
}

/// Speed-up of one variant relative to another
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ratio {
    pub value: f64,
    pub stddev: f64,
}

/// `a.mean / b.mean` with first-order error propagation
pub fn ratio(a: &Measurement, b: &Measurement) -> Ratio {
    let value = a.mean / b.mean;
    let stddev = value
        * (a.stddev * a.stddev / (a.mean * a.mean) + b.stddev * b.stddev / (b.mean * b.mean)).sqrt();
    Ratio { value, stddev }
}

/// Times closures in repetition batches until their spread is small enough
#[derive(Debug)]
pub struct Runner {
    repetitions: usize,
    evaluations: usize,
    stability_factor: f64,
    max_batches: usize,
    tsc: CycleCounter,
}

impl Runner {
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            repetitions: config.repetitions,
            evaluations: config.evaluations,
            stability_factor: config.stability_factor,
            max_batches: config.max_batches,
            tsc: CycleCounter::new(),
        }
    }

    /// Measure `run`, which performs `evaluations` interpolations per call
    ///
    /// Every batch starts with one untimed warm-up call. A batch whose
    /// `stddev * stability_factor` exceeds its mean is discarded and rerun,
    /// at most `max_batches` times in total.
    pub fn measure<F: FnMut()>(&mut self, variant: Variant, mut run: F) -> Measurement {
        let mut batches = 0;
        loop {
            batches += 1;
            let mut stats = RunningStats::default();

            run();
            for _ in 0..self.repetitions {
                self.tsc.start();
                run();
                self.tsc.stop();
                stats.record(self.tsc.cycles() as f64 / self.evaluations as f64);
            }

            let mean = stats.mean();
            let stddev = stats.stddev();
            let converged = stddev * self.stability_factor <= mean;
            debug!(variant = variant.name(), batches, mean, stddev, converged, "measurement batch");

            if converged || batches >= self.max_batches {
                if !converged {
                    warn!(
                        variant = variant.name(),
                        batches, mean, stddev, "measurement did not stabilize"
                    );
                }
                return Measurement {
                    mean,
                    stddev,
                    batches,
                    converged,
                };
            }
        }
    }
}

/// Grid sizes of a sweep: `first`, then repeatedly `floor(size * multiplier)`
/// while not above `max`
#[derive(Debug, Clone)]
pub struct MapSizes {
    next: usize,
    max: usize,
    multiplier: f64,
}

impl MapSizes {
    pub fn new(first: usize, max: usize, multiplier: f64) -> Self {
        Self {
            next: first,
            max,
            multiplier,
        }
    }
}

impl Iterator for MapSizes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next > self.max {
            return None;
        }
        let current = self.next;
        let grown = (current as f64 * self.multiplier) as usize;
        self.next = grown.max(current + 1);
        Some(current)
    }
}

/// Query points: the two grid corners, then uniform samples in `[-1, 1)²`
pub fn generate_points<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Point2> {
    let mut points = Vec::with_capacity(count);
    points.extend([[-1.0f32, -1.0], [1.0, 1.0]].into_iter().take(count));
    while points.len() < count {
        let a = rng.random_range(-1.0f32..1.0);
        let b = rng.random_range(-1.0f32..1.0);
        points.push([a, b]);
    }
    points
}

#[inline]
fn check(variant: Variant, point: Point2, expected: Point3, actual: Point3, tolerance: f32) -> Result<(), Mismatch> {
    // Written so that NaN fails the check
    let agrees = (0..3).all(|c| (expected[c] - actual[c]).abs() <= tolerance);
    if agrees {
        Ok(())
    } else {
        Err(Mismatch {
            variant,
            point,
            expected,
            actual,
        })
    }
}

/// Compare every enabled variant against the scalar reference
///
/// Points are visited in order; batch variants are checked lane by lane on
/// each full batch. Returns the first disagreement.
pub fn cross_validate(
    grids: &GridSet,
    points: &[Point2],
    enabled: &EnabledVariants,
    tolerance: f32,
) -> Result<(), Mismatch> {
    let mut singles = Vec::new();
    let mut batched = Vec::new();
    for variant in enabled.iter().filter(|&v| v != Variant::Scalar) {
        match variant.evaluation() {
            Evaluation::Single(f) => singles.push((variant, f)),
            Evaluation::Batch(f) => batched.push((variant, f)),
        }
    }

    let mut expected = [[0.0f32; 3]; BATCH];
    for chunk in points.chunks(BATCH) {
        for (lane, &p) in chunk.iter().enumerate() {
            let reference = crate::evaluate_scalar(&grids.padded, p);
            for &(variant, f) in &singles {
                check(variant, p, reference, f(grids, p), tolerance)?;
            }
            expected[lane] = reference;
        }

        if let Ok(batch) = <[Point2; BATCH]>::try_from(chunk) {
            for &(variant, f) in &batched {
                let actual = f(grids, &batch);
                for lane in 0..BATCH {
                    check(variant, batch[lane], expected[lane], actual[lane], tolerance)?;
                }
            }
        }
    }
    Ok(())
}

/// Outcome of one grid size
#[derive(Debug, Clone, Serialize)]
pub struct TrialReport {
    pub map_size: usize,
    pub measurements: Vec<(Variant, Measurement)>,
    /// `Scalar / variant`, present only when the scalar variant was measured
    pub ratios: Vec<(Variant, Ratio)>,
    pub failure: Option<Mismatch>,
}

impl TrialReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn measurement(&self, variant: Variant) -> Option<&Measurement> {
        self.measurements.iter().find(|(v, _)| *v == variant).map(|(_, m)| m)
    }
}

/// Runs trials over the sweep, sharing one random stream and one point set
#[derive(Debug)]
pub struct Harness<R = ChaCha8Rng> {
    config: BenchConfig,
    rng: R,
    points: Vec<Point2>,
    batches: Vec<[Point2; BATCH]>,
}

impl Harness<ChaCha8Rng> {
    /// Validate `config` and draw the point set from a stream seeded with
    /// `config.seed`
    pub fn new(config: BenchConfig) -> Result<Self, BenchError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Harness<R> {
    pub fn with_rng(config: BenchConfig, mut rng: R) -> Result<Self, BenchError> {
        config.validate()?;
        let points = generate_points(&mut rng, config.evaluations);
        let batches = batches(&points);
        Ok(Self {
            config,
            rng,
            points,
            batches,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn map_sizes(&self) -> MapSizes {
        MapSizes::new(
            self.config.first_map_size,
            self.config.max_map_size,
            self.config.step_multiplier,
        )
    }

    /// Build and fill fresh grids of `size x size`, measure and validate
    pub fn run_trial(&mut self, size: usize) -> TrialReport {
        let mut grids = GridSet::new(-1.0, 1.0, size);
        grids.fill_random(&mut self.rng);
        debug!(map_size = grids.map_size(), points = grids.point_count(), "trial start");

        let mut runner = Runner::new(&self.config);
        let mut measurements = Vec::new();
        for variant in self.config.enabled.iter() {
            let points = &self.points;
            let batches = &self.batches;
            let grids = &grids;
            let m = match variant.evaluation() {
                Evaluation::Single(f) => runner.measure(variant, || {
                    for &p in points {
                        black_box(f(grids, black_box(p)));
                    }
                }),
                Evaluation::Batch(f) => runner.measure(variant, || {
                    for batch in batches {
                        black_box(f(grids, black_box(batch)));
                    }
                }),
            };
            measurements.push((variant, m));
        }

        let ratios = match measurements.iter().find(|(v, _)| *v == Variant::Scalar) {
            Some(&(_, scalar)) => measurements
                .iter()
                .filter(|(v, _)| *v != Variant::Scalar)
                .map(|(v, m)| (*v, ratio(&scalar, m)))
                .collect(),
            None => Vec::new(),
        };

        let failure = cross_validate(&grids, &self.points, &self.config.enabled, self.config.tolerance).err();
        if let Some(m) = &failure {
            warn!(map_size = size, "{m}");
        }

        TrialReport {
            map_size: grids.map_size(),
            measurements,
            ratios,
            failure,
        }
    }

    /// Run every trial of the sweep, stopping at the first failed validation
    pub fn run(&mut self) -> Result<Vec<TrialReport>, BenchError> {
        self.run_with(|_| {})
    }

    /// Like [`Harness::run`], handing each trial to `on_trial` as soon as it
    /// completes, the failing one included
    pub fn run_with<F: FnMut(&TrialReport)>(&mut self, mut on_trial: F) -> Result<Vec<TrialReport>, BenchError> {
        let mut trials = Vec::new();
        for size in self.map_sizes() {
            let trial = self.run_trial(size);
            on_trial(&trial);
            if let Some(m) = &trial.failure {
                return Err(BenchError::Mismatch(m.clone()));
            }
            trials.push(trial);
        }
        Ok(trials)
    }
}
