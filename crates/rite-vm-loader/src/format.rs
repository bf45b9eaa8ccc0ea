//! Rite binary image layout
//!
//! All multi-byte integers are big-endian.
//!
//! ```text
//! Header:   magic[4] version[4] compiler_name[4] compiler_version[4]
//!           declared_size[4] checksum[2]
//! Section+: kind[4] size[4] payload[size - 8]
//!   IREP:   nrecords[2] base_index[2] Record*
//!     Record: record_len[4] nlocals[2] nregs[2]
//!             ilen[4] instr[4]*ilen
//!             plen[4] (tag[1] len[2] bytes[len])*plen
//!             slen[4] (namelen[2] bytes[namelen | 0 if 0xFFFF])*slen
//!   LINE:   nrecords[2] base_index[2] Record*
//!     Record: record_len[4] fname_len[2] fname[fname_len]
//!             ninstr[4] line[2]*ninstr
//!   END\0:  terminator
//! ```
//!
//! `record_len` counts the whole record, its own four bytes included.
//!
//! The checksum covers every byte after the checksum field up to
//! `declared_size`, which counts the header too.

use std::fmt;

use serde::Serialize;

/// Magic identifier
pub const BINARY_IDENT: [u8; 4] = *b"RITE";

/// The only format version this loader accepts
pub const BINARY_FORMAT_VER: [u8; 4] = *b"0002";

/// Size of the fixed binary header
pub const HEADER_SIZE: usize = 22;

/// Offset of the first checksummed byte (just past the checksum field)
pub const CRC_BODY_OFFSET: usize = HEADER_SIZE;

/// Size of a section header (`kind` + `size`)
pub const SECTION_HEADER_SIZE: u32 = 8;

/// Size of the `nrecords` + `base_index` prefix of IREP and LINE payloads
pub const RECORD_TABLE_HEADER_SIZE: u32 = 4;

/// Symbol name length marking an anonymous symbol
pub const NULL_SYM_LEN: u16 = 0xFFFF;

/// Section tags
pub mod tag {
    /// Code unit records
    pub const IREP: [u8; 4] = *b"IREP";
    /// Debug line records
    pub const LINENO: [u8; 4] = *b"LINE";
    /// End of container
    pub const END: [u8; 4] = *b"END\0";
}

/// Known section kinds; anything else is carried as `Unknown` and skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionKind {
    /// Code unit records
    Irep,
    /// Debug line records
    Lineno,
    /// End of container
    End,
    /// Unrecognized tag
    Unknown([u8; 4]),
}

impl SectionKind {
    /// Classify a raw section tag
    pub fn from_tag(tag: [u8; 4]) -> Self {
        match tag {
            tag::IREP => SectionKind::Irep,
            tag::LINENO => SectionKind::Lineno,
            tag::END => SectionKind::End,
            other => SectionKind::Unknown(other),
        }
    }

    /// Raw section tag
    pub fn tag(self) -> [u8; 4] {
        match self {
            SectionKind::Irep => tag::IREP,
            SectionKind::Lineno => tag::LINENO,
            SectionKind::End => tag::END,
            SectionKind::Unknown(t) => t,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag().escape_ascii())
    }
}

/// Constant pool entry type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolTag {
    /// Base-10 integer literal
    Integer,
    /// Floating-point literal
    Float,
    /// Raw string bytes
    String,
    /// Any other tag; decodes to nil
    Other(u8),
}

impl PoolTag {
    /// Wire value for integer literals
    pub const INTEGER: u8 = 3;
    /// Wire value for float literals
    pub const FLOAT: u8 = 6;
    /// Wire value for strings
    pub const STRING: u8 = 16;

    /// Classify a raw pool tag
    pub fn from_u8(tag: u8) -> Self {
        match tag {
            Self::INTEGER => PoolTag::Integer,
            Self::FLOAT => PoolTag::Float,
            Self::STRING => PoolTag::String,
            other => PoolTag::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_kind_roundtrip() {
        for kind in [SectionKind::Irep, SectionKind::Lineno, SectionKind::End] {
            assert_eq!(SectionKind::from_tag(kind.tag()), kind);
        }
        assert_eq!(
            SectionKind::from_tag(*b"DBG\0"),
            SectionKind::Unknown(*b"DBG\0")
        );
        assert_eq!(SectionKind::End.to_string(), "END\\x00");
    }

    #[test]
    fn test_pool_tags() {
        assert_eq!(PoolTag::from_u8(3), PoolTag::Integer);
        assert_eq!(PoolTag::from_u8(6), PoolTag::Float);
        assert_eq!(PoolTag::from_u8(16), PoolTag::String);
        assert_eq!(PoolTag::from_u8(9), PoolTag::Other(9));
    }

    #[test]
    fn test_header_size_matches_layout() {
        assert_eq!(HEADER_SIZE, 4 + 4 + 4 + 4 + 4 + 2);
    }
}
