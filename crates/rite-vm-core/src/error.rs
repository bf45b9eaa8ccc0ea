//! Core error types

use thiserror::Error;

/// Errors raised by runtime state operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Memory limit exceeded or allocation failed
    #[error("OutOfMemory")]
    OutOfMemory,

    /// Code unit index does not exist in the table
    #[error("code unit index {index} out of range (table holds {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Table length at the time of the request
        len: usize,
    },
}

impl From<std::collections::TryReserveError> for CoreError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
