//! Load entry points
//!
//! A load validates the header and checksum before touching the runtime, then
//! walks the sections under an [`AllocationLedger`]. Any failure after that
//! point leaves the code unit table as it was before the call.

use std::io::{Read, Seek};
use std::ops::Range;

use rite_vm_bytecode::CodeUnitIndex;
use rite_vm_core::State;

use crate::config::LoaderConfig;
use crate::crc::{Crc16, crc16_ccitt};
use crate::error::{LoadError, Result};
use crate::format::HEADER_SIZE;
use crate::header::{BinaryHeader, read_header};
use crate::ledger::AllocationLedger;
use crate::section::{SectionWalk, walk_sections};
use crate::source::{ByteSource, SliceSource, StreamSource};

/// Result of a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Index of the top-level code unit
    pub entry: CodeUnitIndex,
    /// Table indices registered by this load
    pub units: Range<usize>,
    /// Sections passed over without decoding
    pub skipped_sections: usize,
}

/// Image loader
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// Create a loader with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with the given configuration
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Decode an in-memory image into `state`
    pub fn load_buffer(&self, state: &mut State, bytes: &[u8]) -> Result<LoadReport> {
        tracing::debug!(target: "rite::load", len = bytes.len(), "loading image from buffer");

        let header = read_header(&mut SliceSource::new(bytes))?;
        let declared = header.declared_size as usize;
        if bytes.len() < declared {
            return Err(LoadError::UnexpectedEndOfData {
                offset: bytes.len() as u64,
            });
        }
        verify_checksum(&header, crc16_ccitt(0, &bytes[HEADER_SIZE..declared]))?;

        let mut body = SliceSource::at(&bytes[..declared], HEADER_SIZE);
        self.decode(state, &mut body)
    }

    /// Decode an image read from `reader`, starting at its current position.
    ///
    /// The body is read twice: once in blocks to verify the checksum, then
    /// through a buffered reader to decode sections.
    pub fn load_stream<R: Read + Seek>(&self, state: &mut State, mut reader: R) -> Result<LoadReport> {
        let origin = reader.stream_position()?;
        tracing::debug!(target: "rite::load", origin, "loading image from stream");

        let block = self.config.stream_block_size.max(1);
        let mut src = StreamSource::new(reader, origin, block);
        let header = read_header(&mut src)?;

        let computed = checksum_stream(&mut src, header.body_len(), block)?;
        verify_checksum(&header, computed)?;

        src.seek_to(HEADER_SIZE as u64)?;
        let mut body = src.bounded(header.body_len())?;
        self.decode(state, &mut body)
    }

    fn decode<S: ByteSource + ?Sized>(&self, state: &mut State, src: &mut S) -> Result<LoadReport> {
        let mut ledger = AllocationLedger::new(state);
        let outcome = walk_sections(src, &mut ledger, &self.config)
            .and_then(|walk| resolve_entry(&ledger, walk).map(|entry| (entry, walk)));

        match outcome {
            Ok((entry, walk)) => {
                let units = ledger.commit();
                tracing::debug!(
                    target: "rite::load",
                    %entry,
                    registered = units.len(),
                    skipped = walk.skipped,
                    "image loaded"
                );
                Ok(LoadReport {
                    entry,
                    units,
                    skipped_sections: walk.skipped,
                })
            }
            Err(err) => {
                if ledger.registered() > 0 {
                    tracing::warn!(
                        target: "rite::load",
                        error = %err,
                        registered = ledger.registered(),
                        "load failed after registering code units"
                    );
                }
                Err(err)
            }
        }
    }
}

/// Decode an in-memory image, returning the entry code unit
pub fn load_from_buffer(state: &mut State, bytes: &[u8]) -> Result<CodeUnitIndex> {
    Loader::new().load_buffer(state, bytes).map(|report| report.entry)
}

/// Decode an image from a seekable stream, returning the entry code unit
pub fn load_from_stream<R: Read + Seek>(state: &mut State, reader: R) -> Result<CodeUnitIndex> {
    Loader::new().load_stream(state, reader).map(|report| report.entry)
}

pub(crate) fn verify_checksum(header: &BinaryHeader, computed: u16) -> Result<()> {
    if header.checksum != computed {
        return Err(LoadError::ChecksumMismatch {
            stored: header.checksum,
            computed,
        });
    }
    Ok(())
}

fn checksum_stream<R: Read + Seek>(src: &mut StreamSource<R>, len: u64, block: usize) -> Result<u16> {
    let mut buf = Vec::new();
    let chunk = usize::try_from(len).map_or(block, |len| len.min(block));
    buf.try_reserve_exact(chunk)?;
    buf.resize(chunk, 0);

    let mut crc = Crc16::new();
    while crc.len() < len {
        let want = usize::try_from(len - crc.len()).map_or(chunk, |left| left.min(chunk));
        let n = src.read_some(&mut buf[..want])?;
        if n == 0 {
            return Err(LoadError::UnexpectedEndOfData {
                offset: src.position(),
            });
        }
        crc.update(&buf[..n]);
    }
    Ok(crc.value())
}

fn resolve_entry(ledger: &AllocationLedger<'_>, walk: SectionWalk) -> Result<CodeUnitIndex> {
    let len = ledger.state().code_units().len();
    let index = walk.entry.unwrap_or(ledger.base());
    if index >= len {
        return Err(LoadError::IndexOutOfRange { index, len });
    }
    CodeUnitIndex::try_from(index).map_err(|_| LoadError::IndexOutOfRange { index, len })
}
