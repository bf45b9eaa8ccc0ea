//! # Rite VM Core
//!
//! Per-runtime state the image loader registers into: the code unit arena,
//! the symbol interner and memory accounting.
//!
//! A [`State`] is single-threaded. Callers that share one across threads must
//! serialize access themselves.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod state;
pub mod symbol;
pub mod table;

pub use error::{CoreError, CoreResult};
pub use memory::MemoryManager;
pub use state::State;
pub use symbol::SymbolTable;
pub use table::CodeUnitTable;
