//! crates/salon_core/src/error.rs
//!
//! The error taxonomy surfaced by the core services.

use crate::ports::PortError;

/// Every failure a core operation can report. None of them is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or incomplete request.
    #[error("{0}")]
    Validation(String),

    /// The requested interval overlaps an active appointment.
    #[error("{0}")]
    Conflict(String),

    /// Deliberately says nothing about which field was wrong.
    #[error("invalid credentials")]
    Auth,

    #[error("{0}")]
    NotFound(String),

    /// Infrastructure failure behind one of the ports.
    #[error("Service Port Error: {0}")]
    Port(PortError),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }
}

impl From<PortError> for CoreError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => CoreError::NotFound(what),
            other => CoreError::Port(other),
        }
    }
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
