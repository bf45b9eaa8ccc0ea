//! CRC-16/CCITT (polynomial 0x1021, initial value 0, MSB first, no final XOR)
//!
//! The running value is the whole state, so a checksum can be continued
//! across any number of chunks: feeding `a` then `b` gives the same result as
//! feeding `a ++ b`.

const POLY: u16 = 0x1021;

const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Continue `crc` over `bytes`
#[inline]
pub fn crc16_ccitt(crc: u16, bytes: &[u8]) -> u16 {
    bytes.iter().fold(crc, |crc, &b| {
        (crc << 8) ^ TABLE[usize::from((crc >> 8) as u8 ^ b)]
    })
}

/// Streaming accumulator over [`crc16_ccitt`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc16 {
    state: u16,
    len: u64,
}

impl Crc16 {
    /// Start a fresh checksum
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk
    pub fn update(&mut self, bytes: &[u8]) {
        self.state = crc16_ccitt(self.state, bytes);
        self.len += bytes.len() as u64;
    }

    /// Current checksum value
    pub fn value(&self) -> u16 {
        self.state
    }

    /// Bytes fed so far
    pub fn len(&self) -> u64 {
        self.len
    }

    /// No bytes fed yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
