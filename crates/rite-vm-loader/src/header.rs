//! Binary header validation

use serde::Serialize;

use crate::error::{HeaderFault, LoadError, Result};
use crate::format::{BINARY_FORMAT_VER, BINARY_IDENT, HEADER_SIZE};
use crate::source::ByteSource;

/// Decoded fixed header of a Rite image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinaryHeader {
    /// Producer identifier (informational)
    pub compiler_name: [u8; 4],
    /// Producer version (informational)
    pub compiler_version: [u8; 4],
    /// Total image size in bytes, header included
    pub declared_size: u32,
    /// Stored CRC-16 of the body
    pub checksum: u16,
}

impl BinaryHeader {
    /// Number of body bytes covered by the checksum
    pub fn body_len(&self) -> u64 {
        u64::from(self.declared_size).saturating_sub(HEADER_SIZE as u64)
    }
}

/// Read and validate the fixed header. Touches no runtime state.
///
/// The whole header is read before any field is checked, so a truncated
/// header reports `UnexpectedEndOfData` rather than a bad magic.
pub(crate) fn read_header<S: ByteSource + ?Sized>(src: &mut S) -> Result<BinaryHeader> {
    let raw: [u8; HEADER_SIZE] = src.read_array()?;
    parse_header(&raw)
}

fn parse_header(raw: &[u8; HEADER_SIZE]) -> Result<BinaryHeader> {
    let field = |at: usize| -> [u8; 4] { [raw[at], raw[at + 1], raw[at + 2], raw[at + 3]] };

    let magic = field(0);
    if magic != BINARY_IDENT {
        return Err(LoadError::InvalidHeader(HeaderFault::Magic(magic)));
    }
    let version = field(4);
    if version != BINARY_FORMAT_VER {
        return Err(LoadError::InvalidHeader(HeaderFault::Version(version)));
    }

    let declared_size = u32::from_be_bytes(field(16));
    if (declared_size as usize) < HEADER_SIZE {
        return Err(LoadError::InvalidHeader(HeaderFault::DeclaredSize(
            declared_size,
        )));
    }

    Ok(BinaryHeader {
        compiler_name: field(8),
        compiler_version: field(12),
        declared_size,
        checksum: u16::from_be_bytes([raw[20], raw[21]]),
    })
}
