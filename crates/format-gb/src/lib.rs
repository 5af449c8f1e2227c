//! Game Boy (MBC3-class) cartridge ROM image parser.
//!
//! A cartridge image is a flat byte file addressed in 0x4000-byte
//! banks. This crate models that address space, slices it with
//! bounds-checked typed views, parses and verifies the $0100-$014F
//! cartridge header with its two checksums, and decodes the
//! Generation-I 8-bit text encoding — including a `strings(1)`-style
//! scanner for locating embedded text in an unindexed image.

mod addr;
mod header;
mod rom;
mod strings;
pub mod text;
mod view;

pub use addr::{banks_in, Addr, BANK_SIZE};
pub use header::{Header, HEADER_END, HEADER_START};
pub use rom::{Rom, RomError};
pub use strings::{decode_at, scan, strings, ScanRules};
pub use view::{Bytes, Endian, Kind, Note, Record, View, HULL_LABEL};
