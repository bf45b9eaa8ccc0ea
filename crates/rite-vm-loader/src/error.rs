//! Loader errors

use rite_vm_core::CoreError;
use thiserror::Error;

/// Why a binary header was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFault {
    /// Magic identifier mismatch
    Magic([u8; 4]),
    /// Format version other than the one this loader implements
    Version([u8; 4]),
    /// Declared size smaller than the header itself
    DeclaredSize(u32),
}

impl std::fmt::Display for HeaderFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderFault::Magic(m) => write!(f, "bad magic \"{}\"", m.escape_ascii()),
            HeaderFault::Version(v) => write!(f, "unsupported version \"{}\"", v.escape_ascii()),
            HeaderFault::DeclaredSize(n) => write!(f, "declared size {} below header size", n),
        }
    }
}

/// Errors that can occur while loading an image
#[derive(Debug, Error)]
pub enum LoadError {
    /// Bad magic, unsupported version or impossible declared size
    #[error("invalid binary header: {0}")]
    InvalidHeader(HeaderFault),

    /// Stored checksum does not match the container body
    #[error("checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Checksum from the header
        stored: u16,
        /// Checksum computed over the body
        computed: u16,
    },

    /// Input ended before a declared size was satisfied
    #[error("unexpected end of data at offset {offset}")]
    UnexpectedEndOfData {
        /// Absolute offset of the read that could not be satisfied
        offset: u64,
    },

    /// A debug-line record addressed a code unit that does not exist
    #[error("code unit index {index} out of range (table holds {len})")]
    IndexOutOfRange {
        /// Requested table index
        index: usize,
        /// Table length at the time of the request
        len: usize,
    },

    /// Memory limit exceeded or allocation failed
    #[error("out of memory")]
    OutOfMemory,

    /// Section size too small to hold its own header
    #[error("malformed section at offset {offset}: declared size {size}")]
    MalformedSection {
        /// Absolute offset of the section header
        offset: u64,
        /// Declared section size
        size: u32,
    },

    /// I/O error from the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Whether this failure happens after registration may have started, and
    /// so rolls back the code unit table
    pub fn rolls_back(&self) -> bool {
        !matches!(
            self,
            LoadError::InvalidHeader(_) | LoadError::ChecksumMismatch { .. }
        )
    }
}

impl From<CoreError> for LoadError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::OutOfMemory => LoadError::OutOfMemory,
            CoreError::IndexOutOfRange { index, len } => LoadError::IndexOutOfRange { index, len },
        }
    }
}

impl From<std::collections::TryReserveError> for LoadError {
    fn from(_: std::collections::TryReserveError) -> Self {
        LoadError::OutOfMemory
    }
}

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoadError>;
