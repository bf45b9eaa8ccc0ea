//! Bytecode operands

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Index into the runtime's code unit table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct CodeUnitIndex(pub u32);

impl CodeUnitIndex {
    /// Create a new code unit index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get index value
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Get index value as a table slot
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for CodeUnitIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl TryFrom<usize> for CodeUnitIndex {
    type Error = std::num::TryFromIntError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index).map(Self)
    }
}

impl fmt::Display for CodeUnitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interned symbol id
///
/// Ids are handed out by the runtime's symbol table starting at 1, so an
/// anonymous slot can be stored as `Option<Symbol>` at no extra cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Symbol(NonZeroU32);

impl Symbol {
    /// Create a symbol from a raw id, `None` for id 0
    #[inline]
    pub const fn from_raw(id: u32) -> Option<Self> {
        match NonZeroU32::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Symbol of the `index`-th interned name (its id is `index + 1`)
    #[inline]
    pub const fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Position of the name in the interning order
    #[inline]
    pub const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Raw symbol id (always non-zero)
    #[inline]
    pub const fn id(self) -> u32 {
        self.0.get()
    }
}
