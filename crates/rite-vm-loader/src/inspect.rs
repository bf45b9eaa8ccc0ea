//! Structural inspection without loading
//!
//! [`inspect_buffer`] validates an image the way a load does (header,
//! declared size, checksum) and then lists its sections and record extents.
//! Records are stepped over by their `record_len` field, so nothing is decoded
//! and no runtime state is involved.

use serde::Serialize;

use crate::crc::crc16_ccitt;
use crate::error::{LoadError, Result};
use crate::format::{HEADER_SIZE, SectionKind};
use crate::header::{BinaryHeader, read_header};
use crate::load::verify_checksum;
use crate::section::{SectionHeader, read_section_header};
use crate::source::{ByteSource, SliceSource};

/// Layout summary of an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    /// Decoded binary header
    pub header: BinaryHeader,
    /// Sections in file order, terminator included
    pub sections: Vec<SectionInfo>,
}

impl ImageInfo {
    /// Sections of the given kind
    pub fn sections_of(&self, kind: SectionKind) -> impl Iterator<Item = &SectionInfo> {
        self.sections.iter().filter(move |s| s.header.kind == kind)
    }

    /// Total IREP records across all IREP sections
    pub fn code_unit_count(&self) -> usize {
        self.sections_of(SectionKind::Irep)
            .map(|s| s.records.len())
            .sum()
    }
}

/// One section and, for record-table sections, its records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    /// Section header
    pub header: SectionHeader,
    /// `base_index` of IREP and LINE payloads
    pub base_index: Option<u16>,
    /// Record extents of IREP and LINE payloads
    pub records: Vec<RecordExtent>,
}

/// Position of one record within the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordExtent {
    /// Absolute offset of the record
    pub offset: u64,
    /// Record length from its `record_len` field
    pub len: u32,
}

/// Validate `bytes` and describe its layout
pub fn inspect_buffer(bytes: &[u8]) -> Result<ImageInfo> {
    let header = read_header(&mut SliceSource::new(bytes))?;
    let declared = header.declared_size as usize;
    if bytes.len() < declared {
        return Err(LoadError::UnexpectedEndOfData {
            offset: bytes.len() as u64,
        });
    }
    verify_checksum(&header, crc16_ccitt(0, &bytes[HEADER_SIZE..declared]))?;

    let mut src = SliceSource::at(&bytes[..declared], HEADER_SIZE);
    let mut sections = Vec::new();
    loop {
        let section = read_section_header(&mut src)?;
        let mut payload = src.bounded(section.payload_len())?;

        let (base_index, records) = match section.kind {
            SectionKind::Irep | SectionKind::Lineno => {
                let (base, records) = record_extents(&mut payload)?;
                (Some(base), records)
            }
            _ => (None, Vec::new()),
        };
        payload.skip_rest()?;

        sections.push(SectionInfo {
            header: section,
            base_index,
            records,
        });
        if section.kind == SectionKind::End {
            return Ok(ImageInfo { header, sections });
        }
    }
}

fn record_extents<S: ByteSource + ?Sized>(src: &mut S) -> Result<(u16, Vec<RecordExtent>)> {
    let nrecords = src.read_u16()?;
    let base_index = src.read_u16()?;

    let mut records = Vec::new();
    for _ in 0..nrecords {
        let offset = src.position();
        let len = src.read_u32()?;
        if len < 4 {
            return Err(LoadError::MalformedSection { offset, size: len });
        }
        src.skip(u64::from(len - 4))?;
        records.push(RecordExtent { offset, len });
    }
    Ok((base_index, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(sections: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (tag, payload) in sections {
            body.extend_from_slice(*tag);
            body.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
            body.extend_from_slice(payload);
        }
        let mut out = b"RITE0002TEST0000".to_vec();
        out.extend_from_slice(&((body.len() + HEADER_SIZE) as u32).to_be_bytes());
        out.extend_from_slice(&crc16_ccitt(0, &body).to_be_bytes());
        out.extend(body);
        out
    }

    #[test]
    fn test_lists_sections_and_records() {
        // two opaque records of 6 and 4 bytes
        let irep = vec![0, 2, 0, 1, 0, 0, 0, 6, 0xAA, 0xBB, 0, 0, 0, 4];
        let bytes = image(&[(b"IREP", irep), (b"NOTE", vec![1, 2]), (b"END\0", vec![])]);

        let info = inspect_buffer(&bytes).unwrap();
        assert_eq!(info.sections.len(), 3);
        assert_eq!(info.code_unit_count(), 2);

        let irep = &info.sections[0];
        assert_eq!(irep.header.offset, 22);
        assert_eq!(irep.base_index, Some(1));
        assert_eq!(
            irep.records,
            vec![
                RecordExtent { offset: 34, len: 6 },
                RecordExtent { offset: 40, len: 4 },
            ]
        );
        assert_eq!(
            info.sections[1].header.kind,
            SectionKind::Unknown(*b"NOTE")
        );
        assert!(info.sections[1].records.is_empty());
    }

    #[test]
    fn test_record_overrunning_section() {
        let irep = vec![0, 1, 0, 0, 0, 0, 0, 9, 0];
        let bytes = image(&[(b"IREP", irep), (b"END\0", vec![])]);
        assert!(matches!(
            inspect_buffer(&bytes),
            Err(LoadError::UnexpectedEndOfData { .. })
        ));
    }

    #[test]
    fn test_serializes() {
        let bytes = image(&[(b"END\0", vec![])]);
        let info = inspect_buffer(&bytes).unwrap();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["header"]["declared_size"], 30);
        assert_eq!(json["sections"][0]["header"]["size"], 8);
    }
}
