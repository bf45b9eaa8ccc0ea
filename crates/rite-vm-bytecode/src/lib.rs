//! # Rite VM Bytecode
//!
//! In-memory representation of compiled code units, as executed by the Rite
//! interpreter and produced by the image loader.
//!
//! ## Design Principles
//!
//! - **Register-based**: instruction words address a per-unit register window
//! - **Fixed-width**: every instruction is one 32-bit [`Code`] word
//! - **Index-addressed**: code units refer to each other by [`CodeUnitIndex`], never by pointer

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod code_unit;
pub mod constant;
pub mod instruction;
pub mod operand;

pub use code_unit::{CodeUnit, CodeUnitBuilder, DebugInfo};
pub use constant::{Constant, ConstantPool};
pub use instruction::Code;
pub use operand::{CodeUnitIndex, Symbol};
