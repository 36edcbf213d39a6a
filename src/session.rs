use crate::error::{Error, Result};
use crate::fit::{self, FitOptions, FitReport};
use crate::geometry::Point;
use crate::measurement::{Columns, Measurement, MeasurementLog};
use crate::target::{Target, TargetGenerator};
use rand::rngs::StdRng;
use rand::Rng;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The only options a session recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1000,
            canvas_height: 800,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// A target is shown and waiting for a hit
    Active { target: Target, previous: Point },
    Terminated,
}

/// Inclusive containment check
pub fn hit_test(target: &Target, click: Point) -> bool {
    target.center().distance_squared(click) <= target.r * target.r
}

/// Measurement produced by `click` at `now`, or `None` for a miss.
///
/// `previous` is where the last hit landed (the first target's own center
/// before any hit).
pub fn register_click(
    target: &Target,
    previous: Point,
    click: Point,
    now: Instant,
) -> Option<Measurement> {
    if !hit_test(target, click) {
        return None;
    }

    Some(Measurement {
        elapsed: now.saturating_duration_since(target.created_at).as_secs_f64(),
        distance: target.center().distance(previous),
        width: target.width(),
    })
}

/// Drives one pointing test: owns the active target and the measurement log
#[derive(Debug)]
pub struct SessionController<R: Rng = StdRng> {
    config: SessionConfig,
    generator: TargetGenerator<R>,
    state: SessionState,
    log: MeasurementLog,
    fit_options: FitOptions,
}

impl<R: Rng> SessionController<R> {
    /// Start a session by showing its first target
    pub fn new(config: SessionConfig, mut generator: TargetGenerator<R>, now: Instant) -> Result<Self> {
        config.validate()?;
        let target = generator.generate(config.canvas_width, config.canvas_height, now)?;
        info!(
            canvas_width = config.canvas_width,
            canvas_height = config.canvas_height,
            "session started"
        );

        Ok(Self {
            config,
            generator,
            state: SessionState::Active {
                previous: target.center(),
                target,
            },
            log: MeasurementLog::new(),
            fit_options: FitOptions::default(),
        })
    }

    pub fn with_fit_options(mut self, fit_options: FitOptions) -> Self {
        self.fit_options = fit_options;
        self
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn target(&self) -> Option<&Target> {
        match &self.state {
            SessionState::Active { target, .. } => Some(target),
            SessionState::Terminated => None,
        }
    }

    pub fn previous_position(&self) -> Option<Point> {
        match self.state {
            SessionState::Active { previous, .. } => Some(previous),
            SessionState::Terminated => None,
        }
    }

    pub fn log(&self) -> &MeasurementLog {
        &self.log
    }

    /// Handle a primary-button click in canvas coordinates.
    ///
    /// Misses return `Ok(None)` and change nothing. On a hit the next target is
    /// generated before anything is recorded, so a generation failure leaves
    /// the session as it was.
    pub fn on_click(&mut self, click: Point, now: Instant) -> Result<Option<Measurement>> {
        let SessionState::Active { target, previous } = &self.state else {
            return Err(Error::SessionTerminated);
        };

        let Some(measurement) = register_click(target, *previous, click, now) else {
            debug!(x = click.x, y = click.y, "miss");
            return Ok(None);
        };
        let acquired = target.id;

        let next = self
            .generator
            .generate(self.config.canvas_width, self.config.canvas_height, now)?;

        self.log.push(measurement);
        info!(
            id = acquired.0,
            elapsed = measurement.elapsed,
            distance = measurement.distance,
            width = measurement.width,
            "target acquired"
        );

        self.state = SessionState::Active {
            target: next,
            previous: click,
        };
        Ok(Some(measurement))
    }

    /// End the session and fit every hit after the practice sample.
    ///
    /// Only a second call fails outright; fit failures travel in
    /// [`FinishedSession::fit`] so the raw trials can still be shown.
    pub fn finish(&mut self) -> Result<FinishedSession> {
        if !self.is_active() {
            return Err(Error::SessionTerminated);
        }
        self.state = SessionState::Terminated;

        let log = std::mem::take(&mut self.log);
        let fit = fit::fit_with(log.trials(), &self.fit_options);
        match &fit {
            Ok(report) => info!(
                hits = log.len(),
                a = report.model.a,
                b = report.model.b,
                "session finished"
            ),
            Err(err) => warn!(hits = log.len(), error = %err, "session finished without a model"),
        }

        Ok(FinishedSession { log, fit })
    }
}

/// Frozen outcome of a session
#[derive(Debug)]
pub struct FinishedSession {
    pub log: MeasurementLog,
    pub fit: Result<FitReport>,
}

impl FinishedSession {
    pub fn trials(&self) -> &[Measurement] {
        self.log.trials()
    }

    pub fn columns(&self) -> Columns {
        self.log.columns()
    }

    pub fn report(&self) -> Option<&FitReport> {
        self.fit.as_ref().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetId;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn target_at(x: f64, y: f64, r: f64, created_at: Instant) -> Target {
        Target {
            id: TargetId(99),
            x,
            y,
            r,
            created_at,
        }
    }

    fn controller_with(target: Target, previous: Point) -> SessionController {
        SessionController {
            config: SessionConfig::default(),
            generator: TargetGenerator::seeded(5),
            state: SessionState::Active { target, previous },
            log: MeasurementLog::new(),
            fit_options: FitOptions::default(),
        }
    }

    fn hit_current(session: &mut SessionController, now: Instant) -> Measurement {
        let center = session.target().unwrap().center();
        session.on_click(center, now).unwrap().unwrap()
    }

    #[test]
    fn test_hit_test_boundary_is_inclusive() {
        let t = target_at(500.0, 400.0, 50.0, Instant::now());
        assert!(hit_test(&t, Point::new(500.0, 400.0)));
        assert!(hit_test(&t, Point::new(550.0, 400.0)));
        assert!(hit_test(&t, Point::new(500.0, 350.0)));
        assert!(!hit_test(&t, Point::new(550.0 + 1e-9, 400.0)));
        assert!(!hit_test(&t, Point::new(500.0, 520.0)));
    }

    #[test]
    fn test_register_click_on_center() {
        let t0 = Instant::now();
        let t = target_at(500.0, 400.0, 50.0, t0);
        let previous = Point::new(200.0, 0.0);

        let m = register_click(&t, previous, Point::new(500.0, 400.0), t0 + Duration::from_millis(500))
            .unwrap();
        assert!((m.elapsed - 0.5).abs() < 1e-9);
        assert_eq!(m.distance, 500.0);
        assert_eq!(m.width, 100.0);
    }

    #[test]
    fn test_register_click_miss() {
        let t0 = Instant::now();
        let t = target_at(500.0, 400.0, 50.0, t0);
        assert_eq!(
            register_click(&t, Point::new(0.0, 0.0), Point::new(500.0, 520.0), t0),
            None
        );
    }

    #[test]
    fn test_new_session_starts_active_at_first_center() {
        let now = Instant::now();
        let session =
            SessionController::new(SessionConfig::default(), TargetGenerator::seeded(1), now).unwrap();

        let target = *session.target().unwrap();
        assert!(session.is_active());
        assert_eq!(session.previous_position(), Some(target.center()));
        assert_eq!(target.created_at, now);
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_invalid_canvas_is_rejected() {
        let config = SessionConfig {
            canvas_width: 0,
            canvas_height: 800,
        };
        let result = SessionController::new(config, TargetGenerator::seeded(1), Instant::now());
        assert_matches!(result, Err(Error::InvalidConfig(_)));

        let config = SessionConfig {
            canvas_width: 5,
            canvas_height: 800,
        };
        let result = SessionController::new(config, TargetGenerator::seeded(1), Instant::now());
        assert_matches!(result, Err(Error::InvalidBounds { .. }));
    }

    #[test]
    fn test_hit_records_and_replaces_target() {
        let t0 = Instant::now();
        let mut session = controller_with(
            target_at(500.0, 400.0, 50.0, t0),
            Point::new(500.0, 400.0),
        );

        let click_at = t0 + Duration::from_millis(500);
        let m = session
            .on_click(Point::new(500.0, 400.0), click_at)
            .unwrap()
            .unwrap();

        assert!((m.elapsed - 0.5).abs() < 1e-9);
        assert_eq!(m.distance, 0.0);
        assert_eq!(m.width, 100.0);
        assert_eq!(session.log().as_slice(), &[m]);
        assert_eq!(session.previous_position(), Some(Point::new(500.0, 400.0)));

        let next = session.target().unwrap();
        assert_ne!(next.id, TargetId(99));
        assert_eq!(next.created_at, click_at);
    }

    #[test]
    fn test_previous_position_tracks_click_not_center() {
        let t0 = Instant::now();
        let mut session = controller_with(
            target_at(500.0, 400.0, 50.0, t0),
            Point::new(500.0, 400.0),
        );

        session.on_click(Point::new(520.0, 430.0), t0).unwrap().unwrap();
        assert_eq!(session.previous_position(), Some(Point::new(520.0, 430.0)));

        let next = session.target().unwrap().center();
        let m = session.on_click(next, t0).unwrap().unwrap();
        assert!((m.distance - next.distance(Point::new(520.0, 430.0))).abs() < 1e-9);
    }

    #[test]
    fn test_miss_changes_nothing() {
        let t0 = Instant::now();
        let target = target_at(500.0, 400.0, 50.0, t0);
        let mut session = controller_with(target, Point::new(500.0, 400.0));

        assert_eq!(session.on_click(Point::new(500.0, 520.0), t0).unwrap(), None);
        assert_eq!(session.on_click(Point::new(-40.0, 9000.0), t0).unwrap(), None);

        assert!(session.log().is_empty());
        assert_eq!(session.target(), Some(&target));
        assert_eq!(session.previous_position(), Some(Point::new(500.0, 400.0)));
    }

    #[test]
    fn test_log_length_matches_hits_in_order() {
        let t0 = Instant::now();
        let mut session =
            SessionController::new(SessionConfig::default(), TargetGenerator::seeded(8), t0).unwrap();

        let mut expected = vec![];
        for i in 1..=6u64 {
            let now = t0 + Duration::from_millis(300 * i);
            expected.push(hit_current(&mut session, now));
            session.on_click(Point::new(-1.0, -1.0), now).unwrap();
        }

        assert_eq!(session.log().len(), 6);
        assert_eq!(session.log().as_slice(), expected.as_slice());
        assert_eq!(session.log().as_slice()[0].distance, 0.0);
    }

    #[test]
    fn test_finish_drops_practice_sample_and_terminates() {
        let t0 = Instant::now();
        let mut session =
            SessionController::new(SessionConfig::default(), TargetGenerator::seeded(21), t0).unwrap();

        for i in 1..=12u64 {
            hit_current(&mut session, t0 + Duration::from_millis(400 * i));
        }

        let finished = session.finish().unwrap();
        assert_eq!(finished.log.len(), 12);
        assert_eq!(finished.trials().len(), 11);
        assert_eq!(finished.columns().len(), 11);

        assert!(!session.is_active());
        assert_eq!(session.target(), None);
        assert_matches!(
            session.on_click(Point::new(0.0, 0.0), t0),
            Err(Error::SessionTerminated)
        );
        assert_matches!(session.finish(), Err(Error::SessionTerminated));
    }

    #[test]
    fn test_finish_with_too_few_hits_reports_degenerate_fit() {
        let t0 = Instant::now();
        let mut session =
            SessionController::new(SessionConfig::default(), TargetGenerator::seeded(2), t0).unwrap();
        hit_current(&mut session, t0 + Duration::from_millis(300));
        hit_current(&mut session, t0 + Duration::from_millis(600));

        let finished = session.finish().unwrap();
        assert_eq!(finished.trials().len(), 1);
        assert_matches!(finished.fit, Err(Error::DegenerateInput { .. }));
        assert!(finished.report().is_none());
    }
}
