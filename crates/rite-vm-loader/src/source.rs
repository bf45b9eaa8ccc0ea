//! Byte sources the decoders read from
//!
//! Decoders are written once against [`ByteSource`] and run unchanged over an
//! in-memory image ([`SliceSource`]) or a seekable stream ([`StreamSource`]).
//! [`Bounded`] narrows any source to a window (a section payload, the declared
//! container size) and turns reads past its end into `UnexpectedEndOfData`.

use std::io::{self, BufReader, Read, Seek, SeekFrom};

use crate::error::{LoadError, Result};

/// Sequential big-endian reader with an absolute position
pub(crate) trait ByteSource {
    /// Absolute offset of the next byte
    fn position(&self) -> u64;

    /// Fill `buf` completely, or fail without a partial result
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Advance `n` bytes without reading them
    fn skip(&mut self, n: u64) -> Result<()>;

    /// Bytes left before a known end, `None` when the end is unknown
    fn remaining(&self) -> Option<u64>;

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read `len` bytes into a fresh buffer.
    ///
    /// The length is checked against the known end before allocating.
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure(len as u64)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)?;
        buf.resize(len, 0);
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Fail early when fewer than `len` bytes are known to be left
    fn ensure(&self, len: u64) -> Result<()> {
        match self.remaining() {
            Some(left) if left < len => Err(LoadError::UnexpectedEndOfData {
                offset: self.position() + left,
            }),
            _ => Ok(()),
        }
    }

    /// Narrow this source to the next `len` bytes
    fn bounded(&mut self, len: u64) -> Result<Bounded<'_, Self>> {
        self.ensure(len)?;
        let end = self.position() + len;
        Ok(Bounded { inner: self, end })
    }
}

/// Cursor over an in-memory image
#[derive(Debug, Clone)]
pub(crate) struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }
}

impl ByteSource for SliceSource<'_> {
    fn position(&self) -> u64 {
        self.pos as u64
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self
            .pos
            .checked_add(buf.len())
            .filter(|&end| end <= self.bytes.len())
            .ok_or(LoadError::UnexpectedEndOfData {
                offset: self.bytes.len() as u64,
            })?;
        buf.copy_from_slice(&self.bytes[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        self.ensure(n)?;
        self.pos += n as usize;
        Ok(())
    }

    fn remaining(&self) -> Option<u64> {
        Some((self.bytes.len() - self.pos) as u64)
    }
}

/// Buffered reader over a seekable stream
///
/// Positions are relative to `origin`, the stream offset the image starts at.
pub(crate) struct StreamSource<R> {
    inner: BufReader<R>,
    origin: u64,
    pos: u64,
}

impl<R: Read + Seek> StreamSource<R> {
    /// Wrap `inner`, whose cursor must currently sit at stream offset `origin`
    pub(crate) fn new(inner: R, origin: u64, capacity: usize) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity.max(1), inner),
            origin,
            pos: 0,
        }
    }

    /// Move to image offset `pos`
    pub(crate) fn seek_to(&mut self, pos: u64) -> Result<()> {
        let target = self
            .origin
            .checked_add(pos)
            .ok_or(LoadError::UnexpectedEndOfData { offset: pos })?;
        self.inner.seek(SeekFrom::Start(target))?;
        self.pos = pos;
        Ok(())
    }

    /// Read up to `buf.len()` bytes, returning how many arrived (0 at EOF)
    pub(crate) fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => {
                    self.pos += n as u64;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read + Seek> ByteSource for StreamSource<R> {
    fn position(&self) -> u64 {
        self.pos
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_some(&mut buf[filled..])?;
            if n == 0 {
                return Err(LoadError::UnexpectedEndOfData { offset: self.pos });
            }
            filled += n;
        }
        Ok(())
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        let delta = i64::try_from(n).map_err(|_| LoadError::UnexpectedEndOfData {
            offset: self.pos,
        })?;
        self.inner.seek_relative(delta)?;
        self.pos += n;
        Ok(())
    }

    fn remaining(&self) -> Option<u64> {
        None
    }
}

/// A window of at most `end - position` bytes over another source
pub(crate) struct Bounded<'a, S: ?Sized> {
    inner: &'a mut S,
    end: u64,
}

impl<S: ByteSource + ?Sized> Bounded<'_, S> {
    /// Skip whatever is left of the window
    pub(crate) fn skip_rest(&mut self) -> Result<()> {
        let left = self.end - self.inner.position();
        if left > 0 {
            self.inner.skip(left)?;
        }
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Bounded<'_, S> {
    fn position(&self) -> u64 {
        self.inner.position()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len() as u64)?;
        self.inner.read_exact(buf)
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        self.ensure(n)?;
        self.inner.skip(n)
    }

    fn remaining(&self) -> Option<u64> {
        let left = self.end.saturating_sub(self.inner.position());
        Some(match self.inner.remaining() {
            Some(inner) => inner.min(left),
            None => left,
        })
    }
}
