//! Levenberg–Marquardt fit of the Fitts's-Law model
//!
//!   elapsed ≈ a + b · log2(distance / width + 1)
//!
//! The solver is bounded by [`FitOptions::max_iterations`] so a pathological
//! data set can never stall the caller.

use crate::error::{Error, Result};
use crate::measurement::Measurement;
use nalgebra::{Matrix2, Vector2};
use tracing::{debug, info, warn};

/// Smallest number of samples the fitter accepts
pub const MIN_SAMPLES: usize = 2;

const MAX_DAMPING: f64 = 1e16;
const MIN_DAMPING: f64 = 1e-12;

/// `log2(distance / width + 1)`, in bits
pub fn index_of_difficulty(distance: f64, width: f64) -> f64 {
    (distance / width + 1.0).log2()
}

/// Fitted intercept `a` (seconds) and slope `b` (seconds per bit)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittsModel {
    pub a: f64,
    pub b: f64,
}

impl FittsModel {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    pub fn predict(&self, distance: f64, width: f64) -> f64 {
        self.predict_id(index_of_difficulty(distance, width))
    }

    pub fn predict_id(&self, id: f64) -> f64 {
        self.a + self.b * id
    }

    /// Bits per second; only meaningful for a positive slope
    pub fn throughput(&self) -> Option<f64> {
        (self.b > 0.0).then(|| 1.0 / self.b)
    }
}

impl Default for FittsModel {
    fn default() -> Self {
        Self { a: 1.0, b: 1.0 }
    }
}

/// Solver budget and tolerances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub initial: FittsModel,
    pub max_iterations: usize,
    pub initial_damping: f64,
    /// Relative step size below which the fit has converged
    pub step_tolerance: f64,
    /// Relative drop in squared error below which the fit has converged
    pub cost_tolerance: f64,
    /// Largest gradient component accepted as a stationary point
    pub gradient_tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            initial: FittsModel::default(),
            max_iterations: 100,
            initial_damping: 1e-3,
            step_tolerance: 1e-10,
            cost_tolerance: 1e-12,
            gradient_tolerance: 1e-12,
        }
    }
}

impl FitOptions {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a converged fit
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub model: FittsModel,
    pub iterations: usize,
    pub residual_sum_of_squares: f64,
    /// `None` when every observed time is identical
    pub r_squared: Option<f64>,
    /// Covariance of `(a, b)`; `None` without spare degrees of freedom
    pub covariance: Option<[[f64; 2]; 2]>,
}

impl FitReport {
    pub fn standard_errors(&self) -> Option<(f64, f64)> {
        self.covariance
            .map(|c| (c[0][0].max(0.0).sqrt(), c[1][1].max(0.0).sqrt()))
    }
}

/// Fit with [`FitOptions::default`]
pub fn fit(samples: &[Measurement]) -> Result<FitReport> {
    fit_with(samples, &FitOptions::default())
}

pub fn fit_with(samples: &[Measurement], options: &FitOptions) -> Result<FitReport> {
    let points = prepare(samples)?;
    let n = points.len() as f64;

    // The model is linear in (a, b), so J = [1, id] and JᵀJ never changes.
    let (sum_id, sum_id_sq) = points
        .iter()
        .fold((0.0, 0.0), |(s, sq), &(id, _)| (s + id, sq + id * id));
    let jtj = Matrix2::new(n, sum_id, sum_id, sum_id_sq);

    let det = jtj.determinant();
    if sum_id_sq <= 0.0 || det <= 1e-12 * n * sum_id_sq {
        warn!(samples = points.len(), "indices of difficulty do not vary");
        return Err(Error::FitConvergence {
            iterations: 0,
            reason: "every sample has the same index of difficulty, slope is not identifiable"
                .into(),
        });
    }

    let cost = |p: &Vector2<f64>| -> f64 {
        points
            .iter()
            .map(|&(id, elapsed)| {
                let r = elapsed - (p[0] + p[1] * id);
                r * r
            })
            .sum()
    };

    let mut params = Vector2::new(options.initial.a, options.initial.b);
    let mut current = cost(&params);
    let mut lambda = options.initial_damping;

    for iteration in 1..=options.max_iterations {
        let gradient = points.iter().fold(Vector2::zeros(), |g, &(id, elapsed)| {
            let r = elapsed - (params[0] + params[1] * id);
            g + Vector2::new(r, r * id)
        });
        if gradient.amax() <= options.gradient_tolerance {
            return Ok(report(&points, &jtj, params, current, iteration));
        }

        let mut damped = jtj;
        damped[(0, 0)] += lambda * jtj[(0, 0)];
        damped[(1, 1)] += lambda * jtj[(1, 1)];

        let Some(step) = damped.lu().solve(&gradient) else {
            lambda *= 10.0;
            continue;
        };

        let candidate = params + step;
        let next = cost(&candidate);

        if next.is_finite() && next <= current {
            let small_step =
                step.norm() <= options.step_tolerance * (params.norm() + options.step_tolerance);
            let small_drop = current - next <= options.cost_tolerance * current;

            params = candidate;
            current = next;
            lambda = (lambda / 10.0).max(MIN_DAMPING);
            debug!(iteration, a = params[0], b = params[1], cost = current, "accepted step");

            if small_step || small_drop {
                return Ok(report(&points, &jtj, params, current, iteration));
            }
        } else {
            lambda *= 10.0;
            if lambda > MAX_DAMPING {
                warn!(iteration, "damping diverged");
                return Err(Error::FitConvergence {
                    iterations: iteration,
                    reason: "no step reduces the squared error".into(),
                });
            }
        }
    }

    warn!(max_iterations = options.max_iterations, "fit ran out of iterations");
    Err(Error::FitConvergence {
        iterations: options.max_iterations,
        reason: "iteration budget exhausted".into(),
    })
}

// (index of difficulty, elapsed) pairs, rejecting anything unusable
fn prepare(samples: &[Measurement]) -> Result<Vec<(f64, f64)>> {
    if samples.len() < MIN_SAMPLES {
        return Err(Error::DegenerateInput {
            reason: format!(
                "{} measurement(s), at least {} required",
                samples.len(),
                MIN_SAMPLES
            ),
        });
    }

    samples
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if !m.width.is_finite() || m.width <= 0.0 {
                return Err(Error::DegenerateInput {
                    reason: format!("measurement {i} has width {}", m.width),
                });
            }
            if !m.distance.is_finite() || m.distance < 0.0 || !m.elapsed.is_finite() {
                return Err(Error::DegenerateInput {
                    reason: format!("measurement {i} is not finite"),
                });
            }
            Ok((index_of_difficulty(m.distance, m.width), m.elapsed))
        })
        .collect()
}

fn report(
    points: &[(f64, f64)],
    jtj: &Matrix2<f64>,
    params: Vector2<f64>,
    ssr: f64,
    iterations: usize,
) -> FitReport {
    let n = points.len();

    let elapsed: Vec<f64> = points.iter().map(|&(_, e)| e).collect();
    let r_squared = crate::util::mean(&elapsed).and_then(|m| {
        let sst: f64 = elapsed.iter().map(|e| (e - m) * (e - m)).sum();
        (sst > 0.0).then(|| 1.0 - ssr / sst)
    });

    let covariance = if n > 2 {
        let s_sq = ssr / (n - 2) as f64;
        jtj.try_inverse().map(|inv| {
            let c = inv * s_sq;
            [[c[(0, 0)], c[(0, 1)]], [c[(1, 0)], c[(1, 1)]]]
        })
    } else {
        None
    };

    let model = FittsModel::new(params[0], params[1]);
    info!(
        a = model.a,
        b = model.b,
        iterations,
        samples = n,
        "fitted Fitts model"
    );

    FitReport {
        model,
        iterations,
        residual_sum_of_squares: ssr,
        r_squared,
        covariance,
    }
}
