//! Error types for treegrid core systems.

use thiserror::Error;

/// Errors raised by the core plumbing (timers and debouncers).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The timer ID is invalid or has already been removed.
    #[error("invalid or expired timer id")]
    InvalidTimerId,
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
