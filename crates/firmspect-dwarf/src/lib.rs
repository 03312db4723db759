//! DWARF debug-information decoder (32-bit encoding).
//!
//! Parses `.debug_abbrev` and walks the `.debug_info` DIE tree to build a
//! type graph and a map of global variables, then answers type-name queries
//! by flattening matching structures and arrays into addressable leaves.

mod abbrev;
mod constants;
pub mod cursor;
mod info;
pub mod leb128;
mod query;
mod types;

pub use abbrev::{Abbrev, AbbrevTable, AttrSpec};
pub use constants::*;
pub use info::DwarfInfo;
pub use query::Variable;
pub use types::{TypeGraph, TypeNode};

use thiserror::Error;

/// Debug-information decoding errors.
///
/// These abort the current query only; container-level state built earlier
/// stays valid.
#[derive(Error, Debug)]
pub enum DwarfError {
    #[error("string-indirection form used but .debug_str is absent")]
    MissingStringSection,
    #[error("failed to find abbrev code {code} from offset {offset}")]
    AbbreviationNotFound { code: u32, offset: u32 },
    #[error("unsupported attribute form 0x{form:x}")]
    UnsupportedForm { form: u32 },
    #[error("debug stream truncated")]
    TruncatedStream,
    #[error("cyclic type reference at offset 0x{offset:x}")]
    CyclicTypeReference { offset: u64 },
    #[error("invalid type pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, DwarfError>;
