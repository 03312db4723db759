//! High-level inspection session over one object file.

use std::path::Path;

use firmspect_dwarf::{DwarfInfo, Variable};
use firmspect_elf::{ElfError, ElfFile, SymbolTable};
use tracing::debug;

use crate::Result;

/// One open object file plus the lazily parsed views over it.
///
/// The symbol table is parsed on first use and cached for the life of the
/// session. Debug info is decoded per query so a host that never asks for
/// typed globals pays nothing for them.
pub struct Inspector {
    elf: ElfFile,
    symbols: Option<SymbolTable>,
}

impl Inspector {
    /// Open `path` and validate its container header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let elf = ElfFile::open(path)?;
        Ok(Self { elf, symbols: None })
    }

    #[must_use]
    pub fn elf(&self) -> &ElfFile {
        &self.elf
    }

    /// The symbol table, parsed on first call.
    pub fn symbols(&mut self) -> Result<&SymbolTable> {
        let table = match self.symbols.take() {
            Some(table) => table,
            None => self.elf.parse_symbols()?,
        };
        Ok(self.symbols.insert(table))
    }

    /// All typed global variables.
    pub fn global_variables(&mut self) -> Result<Vec<Variable>> {
        self.global_variables_by_type(".*")
    }

    /// Flattened global variables whose resolved type name matches
    /// `pattern`, restricted to names the symbol table actually binds.
    ///
    /// Debug info routinely describes variables that the linker discarded;
    /// dropping entries without a symbol keeps ghosts out of the result.
    pub fn global_variables_by_type(&mut self, pattern: &str) -> Result<Vec<Variable>> {
        let dwarf = self.debug_info()?;
        let variables = dwarf.global_variables_by_type(pattern)?;
        let symbols = self.symbols()?;

        let total = variables.len();
        let bound: Vec<Variable> = variables
            .into_iter()
            .filter(|v| {
                let base = v.name.split('.').next().unwrap_or(&v.name);
                symbols.symbol_value(base).is_some()
            })
            .collect();
        debug!(
            total,
            bound = bound.len(),
            pattern,
            "filtered typed globals against symbol table"
        );
        Ok(bound)
    }

    /// Decode the object's `.debug_info` into a type graph.
    ///
    /// `.debug_info` and `.debug_abbrev` are required; `.debug_str` is
    /// passed through only when present.
    pub fn debug_info(&self) -> Result<DwarfInfo> {
        let info = self.required_section_bytes(".debug_info")?;
        let abbrev = self.required_section_bytes(".debug_abbrev")?;
        let strings = match self.elf.find_section(".debug_str") {
            Some(section) => Some(self.elf.read_section_bytes(section)?),
            None => None,
        };

        // Multi-byte reads follow the container: a swapped container is
        // little-endian on disk, so its DWARF payload is too.
        let big_endian = !self.elf.swapped();
        let dwarf = DwarfInfo::parse(&info, &abbrev, strings.as_deref(), big_endian)?;
        Ok(dwarf)
    }

    fn required_section_bytes(&self, name: &'static str) -> Result<Vec<u8>> {
        let section = self
            .elf
            .find_section(name)
            .ok_or(ElfError::MissingSection(name))?;
        Ok(self.elf.read_section_bytes(section)?)
    }
}
