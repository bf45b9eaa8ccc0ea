//! # Rite VM Loader
//!
//! Loads precompiled Rite bytecode images into a [`State`](rite_vm_core::State).
//!
//! An image is a checksummed container of tagged sections. IREP sections
//! carry code units (instructions, literal pools, symbols); LINE sections
//! attach source line tables to them; unknown sections are skipped. See
//! [`format`] for the byte layout.
//!
//! ## Guarantees
//!
//! - **Validated first**: header and checksum are checked before any code unit
//!   is registered
//! - **All or nothing**: a load that fails midway leaves the code unit table
//!   exactly as long as it was before the call
//! - **Bounded**: every length field is checked against the enclosing section
//!   before it drives an allocation
//! - **Source-agnostic**: buffers and seekable streams go through the same
//!   decoders and produce identical results
//!
//! ```no_run
//! use rite_vm_core::State;
//! use rite_vm_loader::load_from_buffer;
//!
//! let bytes = std::fs::read("app.mrb").unwrap();
//! let mut state = State::new();
//! let entry = load_from_buffer(&mut state, &bytes).unwrap();
//! println!("entry unit {entry}");
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod crc;
pub mod error;
pub mod format;
pub mod header;
pub mod inspect;
pub mod load;
pub mod section;

mod irep;
mod ledger;
mod lineno;
mod literal;
mod source;

pub use config::LoaderConfig;
pub use crc::{Crc16, crc16_ccitt};
pub use error::{HeaderFault, LoadError, Result};
pub use header::BinaryHeader;
pub use inspect::{ImageInfo, RecordExtent, SectionInfo, inspect_buffer};
pub use load::{LoadReport, Loader, load_from_buffer, load_from_stream};
pub use section::SectionHeader;
