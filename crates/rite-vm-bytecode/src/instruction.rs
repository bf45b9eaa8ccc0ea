//! Instruction words
//!
//! The loader stores instruction words verbatim. The accessors below only
//! slice a word into its operand fields; they do not validate the opcode.
//!
//! Word layout (MSB first):
//!
//! ```text
//! | A:9 | B:9 | C:7 | op:7 |      three-operand form
//! | A:9 |    Bx:16    | op:7 |     wide second operand
//! |       Ax:25       | op:7 |     single wide operand
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

const OP_MASK: u32 = 0x7f;
const A_MASK: u32 = 0x1ff;
const B_MASK: u32 = 0x1ff;
const C_MASK: u32 = 0x7f;
const BX_MASK: u32 = 0xffff;
const AX_MASK: u32 = 0x1ff_ffff;

/// Bias applied to the signed wide operand
pub const SBX_BIAS: i32 = (BX_MASK >> 1) as i32;

/// A single fixed-width instruction word
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Code(pub u32);

impl Code {
    /// Wrap a raw instruction word
    #[inline]
    pub const fn new(word: u32) -> Self {
        Self(word)
    }

    /// Raw word
    #[inline]
    pub const fn word(self) -> u32 {
        self.0
    }

    /// Opcode field (low 7 bits)
    #[inline]
    pub const fn opcode(self) -> u8 {
        (self.0 & OP_MASK) as u8
    }

    /// Operand A
    #[inline]
    pub const fn a(self) -> u16 {
        ((self.0 >> 23) & A_MASK) as u16
    }

    /// Operand B
    #[inline]
    pub const fn b(self) -> u16 {
        ((self.0 >> 14) & B_MASK) as u16
    }

    /// Operand C
    #[inline]
    pub const fn c(self) -> u8 {
        ((self.0 >> 7) & C_MASK) as u8
    }

    /// Wide unsigned operand Bx
    #[inline]
    pub const fn bx(self) -> u16 {
        ((self.0 >> 7) & BX_MASK) as u16
    }

    /// Wide signed operand sBx
    #[inline]
    pub const fn sbx(self) -> i32 {
        self.bx() as i32 - SBX_BIAS
    }

    /// Single wide operand Ax
    #[inline]
    pub const fn ax(self) -> u32 {
        (self.0 >> 7) & AX_MASK
    }
}

impl From<u32> for Code {
    fn from(word: u32) -> Self {
        Self(word)
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({:#010x})", self.0)
    }
}
