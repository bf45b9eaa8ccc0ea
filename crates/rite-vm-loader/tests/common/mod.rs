//! Test-only image encoder

#![allow(dead_code)]

use rite_vm_bytecode::CodeUnit;
use rite_vm_core::State;
use rite_vm_loader::crc16_ccitt;

pub const TAG_INTEGER: u8 = 3;
pub const TAG_FLOAT: u8 = 6;
pub const TAG_STRING: u8 = 16;

/// One IREP record
#[derive(Debug, Clone, Default)]
pub struct Irep {
    nlocals: u16,
    nregs: u16,
    iseq: Vec<u32>,
    pool: Vec<(u8, Vec<u8>)>,
    syms: Vec<Option<Vec<u8>>>,
}

impl Irep {
    pub fn new(nlocals: u16, nregs: u16) -> Self {
        Self {
            nlocals,
            nregs,
            ..Self::default()
        }
    }

    pub fn code(mut self, word: u32) -> Self {
        self.iseq.push(word);
        self
    }

    pub fn string(self, bytes: &[u8]) -> Self {
        self.pool_entry(TAG_STRING, bytes)
    }

    pub fn integer(self, text: &str) -> Self {
        self.pool_entry(TAG_INTEGER, text.as_bytes())
    }

    pub fn float(self, text: &str) -> Self {
        self.pool_entry(TAG_FLOAT, text.as_bytes())
    }

    pub fn pool_entry(mut self, tag: u8, bytes: &[u8]) -> Self {
        self.pool.push((tag, bytes.to_vec()));
        self
    }

    pub fn sym(mut self, name: &[u8]) -> Self {
        self.syms.push(Some(name.to_vec()));
        self
    }

    pub fn anon_sym(mut self) -> Self {
        self.syms.push(None);
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.nlocals.to_be_bytes());
        body.extend_from_slice(&self.nregs.to_be_bytes());
        body.extend_from_slice(&(self.iseq.len() as u32).to_be_bytes());
        for word in &self.iseq {
            body.extend_from_slice(&word.to_be_bytes());
        }
        body.extend_from_slice(&(self.pool.len() as u32).to_be_bytes());
        for (tag, bytes) in &self.pool {
            body.push(*tag);
            body.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            body.extend_from_slice(bytes);
        }
        body.extend_from_slice(&(self.syms.len() as u32).to_be_bytes());
        for sym in &self.syms {
            match sym {
                Some(name) => {
                    body.extend_from_slice(&(name.len() as u16).to_be_bytes());
                    body.extend_from_slice(name);
                }
                None => body.extend_from_slice(&0xFFFFu16.to_be_bytes()),
            }
        }
        with_record_len(body)
    }
}

/// One LINE record
#[derive(Debug, Clone)]
pub struct Lines {
    fname: String,
    lines: Vec<u16>,
}

impl Lines {
    pub fn new(fname: &str, lines: &[u16]) -> Self {
        Self {
            fname: fname.to_owned(),
            lines: lines.to_vec(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&(self.fname.len() as u16).to_be_bytes());
        body.extend_from_slice(self.fname.as_bytes());
        body.extend_from_slice(&(self.lines.len() as u32).to_be_bytes());
        for line in &self.lines {
            body.extend_from_slice(&line.to_be_bytes());
        }
        with_record_len(body)
    }
}

fn with_record_len(body: Vec<u8>) -> Vec<u8> {
    let mut out = ((body.len() + 4) as u32).to_be_bytes().to_vec();
    out.extend(body);
    out
}

/// Record-table payload (`nrecords` + `base_index` + raw records)
pub fn record_table(base_index: u16, records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(records.len() as u16).to_be_bytes());
    out.extend_from_slice(&base_index.to_be_bytes());
    for record in records {
        out.extend_from_slice(record);
    }
    out
}

/// Assembles sections into a checksummed image
#[derive(Debug, Clone, Default)]
pub struct ImageBuilder {
    sections: Vec<([u8; 4], Vec<u8>)>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn irep(self, base_index: u16, records: &[Irep]) -> Self {
        let encoded: Vec<Vec<u8>> = records.iter().map(Irep::encode).collect();
        self.section(*b"IREP", record_table(base_index, &encoded))
    }

    pub fn lineno(self, base_index: u16, records: &[Lines]) -> Self {
        let encoded: Vec<Vec<u8>> = records.iter().map(Lines::encode).collect();
        self.section(*b"LINE", record_table(base_index, &encoded))
    }

    pub fn section(mut self, tag: [u8; 4], payload: Vec<u8>) -> Self {
        self.sections.push((tag, payload));
        self
    }

    pub fn insert_section(mut self, at: usize, tag: [u8; 4], payload: Vec<u8>) -> Self {
        let at = at.min(self.sections.len());
        self.sections.insert(at, (tag, payload));
        self
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Encode the sections followed by an END section
    pub fn build(&self) -> Vec<u8> {
        let mut body = self.encode_sections();
        body.extend(encode_section(*b"END\0", &[]));
        seal(body)
    }

    /// Encode the sections with no terminator
    pub fn build_unterminated(&self) -> Vec<u8> {
        seal(self.encode_sections())
    }

    fn encode_sections(&self) -> Vec<u8> {
        self.sections
            .iter()
            .flat_map(|(tag, payload)| encode_section(*tag, payload))
            .collect()
    }
}

fn encode_section(tag: [u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// Prefix `body` with a header carrying the right size and checksum
pub fn seal(body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 22);
    out.extend_from_slice(b"RITE0002");
    out.extend_from_slice(b"MATZ0000");
    out.extend_from_slice(&((body.len() + 22) as u32).to_be_bytes());
    out.extend_from_slice(&crc16_ccitt(0, &body).to_be_bytes());
    out.extend(body);
    out
}

/// The single-record image: two registers, one instruction, pool `["hi"]`
pub fn hi_image() -> Vec<u8> {
    ImageBuilder::new()
        .irep(0, &[Irep::new(0, 2).code(0x0000_004a).string(b"hi")])
        .build()
}

/// A multi-record image with every pool kind, symbols and line tables
pub fn rich_image() -> Vec<u8> {
    ImageBuilder::new()
        .irep(
            0,
            &[
                Irep::new(2, 5)
                    .code(0x0080_0003)
                    .code(0x0100_4020)
                    .code(0x0000_004a)
                    .string(b"hello")
                    .integer("42")
                    .float("1.25")
                    .sym(b"puts")
                    .anon_sym()
                    .sym(b""),
                Irep::new(1, 3)
                    .code(0x0000_0029)
                    .integer("-7")
                    .pool_entry(99, b"opaque")
                    .sym(b"puts")
                    .sym(b"each"),
                Irep::new(0, 1).code(0x0000_0029),
            ],
        )
        .lineno(
            0,
            &[
                Lines::new("main.rb", &[1, 1, 2]),
                Lines::new("main.rb", &[4]),
                Lines::new("lib.rb", &[9]),
            ],
        )
        .build()
}

/// Snapshot of every registered unit, for structural comparison
pub fn units(state: &State) -> Vec<CodeUnit> {
    state.code_units().iter().map(|(_, unit)| unit.clone()).collect()
}

/// Names of a unit's symbol slots, `None` for anonymous ones
pub fn sym_names(state: &State, unit: &CodeUnit) -> Vec<Option<Vec<u8>>> {
    unit.syms
        .iter()
        .map(|sym| sym.and_then(|s| state.symbols().name(s)).map(<[u8]>::to_vec))
        .collect()
}
