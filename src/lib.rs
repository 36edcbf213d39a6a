// Library surface for headless/integration tests and reuse.
// Keep this free of terminal rendering; the binary owns the display.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod measurement;
pub mod runtime;
pub mod session;
pub mod surface;
pub mod target;
pub mod util;

pub use error::{Error, Result};
pub use fit::{FitOptions, FitReport, FittsModel};
pub use geometry::Point;
pub use measurement::{Measurement, MeasurementLog};
pub use session::{FinishedSession, SessionConfig, SessionController};
pub use target::{Target, TargetGenerator};
