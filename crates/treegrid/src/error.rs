//! Error types for the table model.

use thiserror::Error;

/// Errors reported by table operations.
///
/// Most inconsistencies (unknown rows, unresolvable parents) are logged and
/// ignored. The variants below are the preconditions a caller must fix.
#[derive(Error, Debug)]
pub enum TableError {
    /// A row with this id already exists in the table or earlier in the batch.
    #[error("duplicate row id: {0}")]
    DuplicateRowId(String),

    /// Row descriptors could not be parsed.
    #[error("invalid row descriptors: {0}")]
    Descriptor(#[from] serde_json::Error),

    /// Table configuration could not be parsed.
    #[error("invalid table configuration: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The deferred-cell token is unknown or was already resolved.
    #[error("unknown or already resolved deferred cell token")]
    UnknownToken,
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
