use crate::error::{Error, Result};
use crate::geometry::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, warn};

/// Smallest radius a target can have, in pixels
pub const MIN_RADIUS: u32 = 3;

/// Radius draws tried before giving up on a canvas.
///
/// Only matters near the smallest valid canvas: at 7 px just `r = 3` fits, a
/// draw lands there about 0.7% of the time, and roughly 62% of `generate`
/// calls fail. At 20 px that drops below 1%, at 100 px it is negligible.
pub const MAX_RADIUS_ATTEMPTS: usize = 64;

const RADIUS_SCALE: f64 = 60.0;
const WEIBULL_SHAPE: f64 = 1.2;

/// Handle the display uses to track the visual of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// A circular target shown on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub created_at: Instant,
}

impl Target {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn width(&self) -> f64 {
        2.0 * self.r
    }
}

/// Produces randomized targets that always lie fully inside the canvas.
///
/// The random source is injected so sessions can be replayed from a seed.
#[derive(Debug)]
pub struct TargetGenerator<R: Rng = StdRng> {
    rng: R,
    next_id: u64,
}

impl TargetGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> TargetGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, next_id: 0 }
    }

    /// Generate a target for a `canvas_width` x `canvas_height` canvas.
    ///
    /// Radii that leave no room on the canvas are redrawn, up to
    /// [`MAX_RADIUS_ATTEMPTS`] times, before failing with `InvalidBounds`.
    pub fn generate(&mut self, canvas_width: u32, canvas_height: u32, now: Instant) -> Result<Target> {
        let limit = canvas_width.min(canvas_height);
        if limit <= 2 * MIN_RADIUS {
            return Err(Error::InvalidBounds {
                canvas_width,
                canvas_height,
                attempts: 0,
            });
        }

        for attempt in 1..=MAX_RADIUS_ATTEMPTS {
            let r = self.sample_radius();
            if 2 * r >= limit {
                debug!(radius = r, attempt, "radius does not fit canvas, redrawing");
                continue;
            }

            let x = self.rng.gen_range(0..canvas_width - 2 * r);
            let y = self.rng.gen_range(0..canvas_height - 2 * r);

            let id = TargetId(self.next_id);
            self.next_id += 1;

            let target = Target {
                id,
                x: f64::from(x + r),
                y: f64::from(y + r),
                r: f64::from(r),
                created_at: now,
            };
            debug!(id = id.0, x = target.x, y = target.y, r = target.r, "generated target");
            return Ok(target);
        }

        warn!(
            canvas_width,
            canvas_height, "every radius draw was too large for the canvas"
        );
        Err(Error::InvalidBounds {
            canvas_width,
            canvas_height,
            attempts: MAX_RADIUS_ATTEMPTS,
        })
    }

    // Weibull(shape 1.2, scale 1) by inverse transform, scaled to pixels
    fn sample_radius(&mut self) -> u32 {
        let u: f64 = self.rng.gen();
        let w = (-(1.0 - u).ln()).powf(1.0 / WEIBULL_SHAPE);
        (w * RADIUS_SCALE).floor() as u32 + MIN_RADIUS
    }
}
