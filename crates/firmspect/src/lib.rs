//! Firmware object inspector.
//!
//! Combines the ELF container reader with the DWARF decoder to answer the
//! questions an inspection host asks: which sections exist, what symbol is
//! bound where, and which typed global variables match a type-name pattern.
//!
//! # Example
//!
//! ```ignore
//! use firmspect::Inspector;
//!
//! let mut inspector = Inspector::open("firmware.out")?;
//! let vars = inspector.global_variables_by_type(".*_Struct")?;
//! ```

// Re-export from sub-crates
pub use firmspect_dwarf::{DwarfError, DwarfInfo, Variable};
pub use firmspect_elf::{
    ElfError, ElfFile, FileHeader, SectionHeader, SymbolTable, TargetProfile,
};

mod error;
mod inspector;
mod source;

pub use error::{Error, Result};
pub use inspector::Inspector;
pub use source::{ObjectSource, SymbolSource};
