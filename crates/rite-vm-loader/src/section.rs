//! Section walker
//!
//! Reads section headers until the terminator and hands each payload, as a
//! bounded window, to the decoder for its kind. Unknown kinds are skipped by
//! their declared size.

use serde::Serialize;

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::format::{SECTION_HEADER_SIZE, SectionKind};
use crate::irep::read_irep_section;
use crate::ledger::AllocationLedger;
use crate::lineno::read_lineno_section;
use crate::source::ByteSource;

/// A decoded section header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionHeader {
    /// Section kind
    pub kind: SectionKind,
    /// Absolute offset of the section header
    pub offset: u64,
    /// Declared size, header included
    pub size: u32,
}

impl SectionHeader {
    /// Bytes following the section header
    pub fn payload_len(&self) -> u64 {
        u64::from(self.size.saturating_sub(SECTION_HEADER_SIZE))
    }
}

pub(crate) fn read_section_header<S: ByteSource + ?Sized>(src: &mut S) -> Result<SectionHeader> {
    let offset = src.position();
    let kind = SectionKind::from_tag(src.read_array()?);
    let size = src.read_u32()?;
    if size < SECTION_HEADER_SIZE {
        return Err(LoadError::MalformedSection { offset, size });
    }
    Ok(SectionHeader { kind, offset, size })
}

/// What a completed walk found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SectionWalk {
    /// Table index of the entry unit, from the first IREP section
    pub entry: Option<usize>,
    /// Sections passed over without decoding
    pub skipped: usize,
}

/// Walk sections from the current position up to and including the terminator
pub(crate) fn walk_sections<S: ByteSource + ?Sized>(
    src: &mut S,
    ledger: &mut AllocationLedger<'_>,
    config: &LoaderConfig,
) -> Result<SectionWalk> {
    let mut walk = SectionWalk::default();

    loop {
        let header = read_section_header(src)?;
        let mut payload = src.bounded(header.payload_len())?;

        match header.kind {
            SectionKind::Irep => {
                let section = read_irep_section(&mut payload, ledger)?;
                if walk.entry.is_none() {
                    walk.entry = Some(ledger.base() + usize::from(section.base_index));
                }
                tracing::debug!(
                    target: "rite::load",
                    offset = header.offset,
                    size = header.size,
                    records = section.count,
                    first = ?section.first,
                    base_index = section.base_index,
                    "decoded IREP section"
                );
            }
            SectionKind::Lineno if config.load_debug_info => {
                let attached = read_lineno_section(&mut payload, ledger)?;
                tracing::debug!(
                    target: "rite::load",
                    offset = header.offset,
                    size = header.size,
                    records = attached,
                    "decoded LINE section"
                );
            }
            SectionKind::End => {
                payload.skip_rest()?;
                tracing::debug!(target: "rite::load", offset = header.offset, "reached END section");
                return Ok(walk);
            }
            kind => {
                walk.skipped += 1;
                tracing::trace!(
                    target: "rite::load",
                    %kind,
                    offset = header.offset,
                    size = header.size,
                    "skipping section"
                );
            }
        }

        payload.skip_rest()?;
    }
}
