//! Constant pool for code units

use serde::{Deserialize, Serialize};

/// A literal value referenced by instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    /// No value (unknown constant kinds decode to this)
    Nil,
    /// Machine integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// Raw string bytes (not required to be UTF-8)
    String(Box<[u8]>),
}

impl Constant {
    /// Create a string constant from raw bytes
    #[inline]
    pub fn string(bytes: impl Into<Box<[u8]>>) -> Self {
        Self::String(bytes.into())
    }

    /// Check if this is the nil constant
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Get as integer if this is an integer constant
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as float if this is a float constant
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get string bytes if this is a string constant
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(s) => Some(&s[..]),
            _ => None,
        }
    }

    /// Heap bytes owned by this constant
    #[inline]
    pub fn heap_size(&self) -> usize {
        match self {
            Self::String(s) => s.len(),
            _ => 0,
        }
    }
}

/// Ordered constant pool of one code unit
///
/// Entries keep their on-disk order; instructions address them by position,
/// so no deduplication happens here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantPool {
    constants: Vec<Constant>,
}

impl ConstantPool {
    /// Create a new empty constant pool
    pub fn new() -> Self {
        Self {
            constants: Vec::new(),
        }
    }

    /// Create constant pool with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            constants: Vec::with_capacity(capacity),
        }
    }

    /// Append a constant, returns its index
    pub fn push(&mut self, constant: Constant) -> u32 {
        let idx = self.constants.len() as u32;
        self.constants.push(constant);
        idx
    }

    /// Get a constant by index
    #[inline]
    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// Number of constants in the pool
    #[inline]
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Check if the pool is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Iterate over constants
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.constants.iter()
    }

    /// Heap bytes owned by the pool, entries included
    pub fn heap_size(&self) -> usize {
        self.constants.len() * std::mem::size_of::<Constant>()
            + self.constants.iter().map(Constant::heap_size).sum::<usize>()
    }
}

impl From<Vec<Constant>> for ConstantPool {
    fn from(constants: Vec<Constant>) -> Self {
        Self { constants }
    }
}
