//! Code unit representation
//!
//! One code unit is the compiled form of one method, block or top-level
//! scope: its instruction words, its literal pool and the symbols its
//! instructions refer to by position.

use serde::{Deserialize, Serialize};

use crate::constant::ConstantPool;
use crate::instruction::Code;
use crate::operand::Symbol;

/// Source position table attached after a code unit is registered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    /// Source file the unit was compiled from, as raw bytes
    pub filename: Box<[u8]>,
    /// Line number per instruction
    pub lines: Vec<u16>,
}

impl DebugInfo {
    /// Create debug info from a filename and its line table
    pub fn new(filename: impl AsRef<[u8]>, lines: Vec<u16>) -> Self {
        Self {
            filename: filename.as_ref().into(),
            lines,
        }
    }

    /// Line of the instruction at `pc`, if recorded
    #[inline]
    pub fn line_at(&self, pc: usize) -> Option<u16> {
        self.lines.get(pc).copied()
    }

    /// Filename for display, with invalid UTF-8 replaced
    pub fn filename_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.filename)
    }

    /// Heap bytes owned by this table
    pub fn heap_size(&self) -> usize {
        self.filename.len() + self.lines.len() * std::mem::size_of::<u16>()
    }
}

/// A compiled code unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeUnit {
    /// Number of local variables
    pub local_count: u16,

    /// Size of the register window
    pub register_count: u16,

    /// Instruction words
    pub iseq: Vec<Code>,

    /// Literal pool
    pub pool: ConstantPool,

    /// Symbol slots (`None` marks an anonymous symbol)
    pub syms: Vec<Option<Symbol>>,

    /// Filename and line table, when the image carried one
    pub debug: Option<DebugInfo>,
}

impl CodeUnit {
    /// Create a new code unit builder
    pub fn builder() -> CodeUnitBuilder {
        CodeUnitBuilder::new()
    }

    /// Number of instruction words
    #[inline]
    pub fn ilen(&self) -> usize {
        self.iseq.len()
    }

    /// Symbol at slot `index`; `None` for anonymous or missing slots
    #[inline]
    pub fn symbol(&self, index: usize) -> Option<Symbol> {
        self.syms.get(index).copied().flatten()
    }

    /// Source filename, if debug info is attached
    pub fn filename(&self) -> Option<&[u8]> {
        self.debug.as_ref().map(|d| &*d.filename)
    }

    /// Heap bytes owned by this unit (buffers, pool, symbol slots, debug info)
    pub fn heap_size(&self) -> usize {
        self.iseq.len() * std::mem::size_of::<Code>()
            + self.pool.heap_size()
            + self.syms.len() * std::mem::size_of::<Option<Symbol>>()
            + self.debug.as_ref().map_or(0, DebugInfo::heap_size)
    }
}

/// Builder for code units
#[derive(Debug, Default)]
pub struct CodeUnitBuilder {
    local_count: u16,
    register_count: u16,
    iseq: Vec<Code>,
    pool: ConstantPool,
    syms: Vec<Option<Symbol>>,
    debug: Option<DebugInfo>,
}

impl CodeUnitBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set local variable count
    pub fn local_count(mut self, count: u16) -> Self {
        self.local_count = count;
        self
    }

    /// Set register count
    pub fn register_count(mut self, count: u16) -> Self {
        self.register_count = count;
        self
    }

    /// Set all instructions
    pub fn iseq(mut self, iseq: Vec<Code>) -> Self {
        self.iseq = iseq;
        self
    }

    /// Add a single instruction
    pub fn instruction(mut self, code: Code) -> Self {
        self.iseq.push(code);
        self
    }

    /// Set constant pool
    pub fn pool(mut self, pool: ConstantPool) -> Self {
        self.pool = pool;
        self
    }

    /// Set all symbol slots
    pub fn syms(mut self, syms: Vec<Option<Symbol>>) -> Self {
        self.syms = syms;
        self
    }

    /// Attach debug info
    pub fn debug(mut self, debug: DebugInfo) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Build the code unit
    pub fn build(self) -> CodeUnit {
        CodeUnit {
            local_count: self.local_count,
            register_count: self.register_count,
            iseq: self.iseq,
            pool: self.pool,
            syms: self.syms,
            debug: self.debug,
        }
    }
}
