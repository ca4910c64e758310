//! Error types for the runtime

use crate::scheduling::TimerId;
use thiserror::Error;

/// Runtime error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Node '{node}' failed to initialize: {reason}")]
    NodeInit { node: String, reason: String },

    #[error("Node '{node}' failed to shut down: {reason}")]
    NodeShutdown { node: String, reason: String },

    #[error("Timer period must be positive and finite, got {0}")]
    InvalidPeriod(f64),

    #[error("Timer {0} is not armed")]
    TimerNotArmed(TimerId),

    #[error("Scheduler rate must be positive and finite, got {0} Hz")]
    InvalidRate(f64),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
