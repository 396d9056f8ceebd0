//! Error types for axis control

use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the axis controller and its helpers.
///
/// Saturation of the commanded output is deliberately absent: it is a normal
/// operating condition and is reported through [`MoveReport`](crate::MoveReport).
#[derive(Debug, Error)]
pub enum AxisError {
    /// `move_to` was called before a hardware binding was attached.
    #[error("no hardware binding attached")]
    NotBound,

    /// A second binding was offered to an already bound controller.
    #[error("controller is already bound to hardware")]
    AlreadyBound,

    /// The axis did not reach the convergence threshold in time.
    #[error("axis did not converge after {ticks} ticks ({elapsed:?}), last error {last_error:.6}")]
    Timeout {
        ticks: u64,
        elapsed: Duration,
        last_error: f64,
    },

    /// The move was aborted through its cancel token.
    #[error("move cancelled after {ticks} ticks")]
    Cancelled { ticks: u64 },

    #[error("target position must be finite, got {0}")]
    InvalidTarget(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A byte slice did not match the fixed size of a wire frame.
    #[error("frame must be {expected} bytes, got {actual}")]
    Frame { expected: usize, actual: usize },

    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl AxisError {
    /// True for outcomes where the actuator was driven and then stopped early.
    pub fn is_aborted_move(&self) -> bool {
        matches!(self, AxisError::Timeout { .. } | AxisError::Cancelled { .. })
    }
}

/// Result alias used throughout the crate
pub type AxisResult<T> = std::result::Result<T, AxisError>;
