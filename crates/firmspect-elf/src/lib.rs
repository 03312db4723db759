//! ELF container reader for embedded firmware images.
//!
//! Parses the fixed-size file header, the section header table and the
//! symbol table of a 32-bit ELF object, resolving a target machine profile
//! (word/pointer/char sizes, endianness) along the way. The reader exposes
//! section lookup, bounded byte-range reads, section checksums and a cached
//! string-at-target-address lookup.

mod constants;
mod crc;
mod file;
mod header;
mod symtab;
mod target;

pub use constants::*;
pub use crc::Crc32;
pub use file::ElfFile;
pub use header::{FileHeader, SectionHeader, SymbolEntry, SymbolKind};
pub use symtab::SymbolTable;
pub use target::TargetProfile;

use thiserror::Error;

/// Container parsing errors.
#[derive(Error, Debug)]
pub enum ElfError {
    #[error("malformed container header: {0}")]
    MalformedHeader(&'static str),
    #[error("unrecognized architecture (machine = {machine})")]
    UnsupportedArchitecture { machine: u16 },
    #[error("cannot find section {0}")]
    MissingSection(&'static str),
    #[error("container file is closed")]
    Closed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ElfError>;
