/// Result type alias for the experiment core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for target generation, sessions and model fitting
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "no target fits a {canvas_width}x{canvas_height} canvas after {attempts} radius draws"
    )]
    InvalidBounds {
        canvas_width: u32,
        canvas_height: u32,
        attempts: usize,
    },

    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),

    #[error("not enough usable measurements to fit: {reason}")]
    DegenerateInput { reason: String },

    #[error("model fit did not converge after {iterations} iterations: {reason}")]
    FitConvergence { iterations: usize, reason: String },

    #[error("session already finished")]
    SessionTerminated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
