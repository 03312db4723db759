//! Capability traits consumed by inspection hosts.
//!
//! A debugger front end or firmware flasher that sits on top of this crate
//! programs against these traits instead of the concrete readers, so a test
//! harness can substitute canned tables without touching a file.

use firmspect_elf::SectionHeader;

use crate::Result;

/// Name and address resolution over a parsed symbol table.
pub trait SymbolSource {
    /// Address bound to `name`, if any.
    fn symbol_value(&self, name: &str) -> Option<u32>;

    /// Data symbol names bound at `value`, falling back to absolute
    /// symbols for addresses resolved out of ROM tables.
    fn data_symbols(&self, value: u32) -> Option<&[String]>;

    /// Function names bound at `value`, with the same absolute fallback.
    fn func_names(&self, value: u32) -> Option<&[String]>;
}

impl SymbolSource for firmspect_elf::SymbolTable {
    fn symbol_value(&self, name: &str) -> Option<u32> {
        Self::symbol_value(self, name)
    }

    fn data_symbols(&self, value: u32) -> Option<&[String]> {
        Self::data_symbols(self, value)
    }

    fn func_names(&self, value: u32) -> Option<&[String]> {
        Self::func_names(self, value)
    }
}

/// Raw access to an object file's section contents.
pub trait ObjectSource {
    fn sections(&self) -> &[SectionHeader];

    fn find_section(&self, name: &str) -> Option<&SectionHeader>;

    /// Full section payload.
    fn read_section(&self, section: &SectionHeader) -> Result<Vec<u8>>;

    /// Slice of a section addressed by target address.
    fn read_range(
        &self,
        section: &SectionHeader,
        buf: &mut [u8],
        addr: u32,
        length: usize,
    ) -> Result<usize>;

    /// Best-effort C string at a target address; probing, never errors.
    fn find_string(&self, addr: u32) -> Option<String>;

    fn find_string_in(&self, addr: u32, section_name: &str) -> Option<String>;

    /// CRC-32 over a whole section.
    fn crc(&self, section: &SectionHeader) -> Result<u32>;

    /// CRC-32 over `length` bytes starting at target address `addr`.
    fn crc_range(&self, section: &SectionHeader, addr: u32, length: u32) -> Result<u32>;
}

impl ObjectSource for firmspect_elf::ElfFile {
    fn sections(&self) -> &[SectionHeader] {
        Self::sections(self)
    }

    fn find_section(&self, name: &str) -> Option<&SectionHeader> {
        Self::find_section(self, name)
    }

    fn read_section(&self, section: &SectionHeader) -> Result<Vec<u8>> {
        Ok(self.read_section_bytes(section)?)
    }

    fn read_range(
        &self,
        section: &SectionHeader,
        buf: &mut [u8],
        addr: u32,
        length: usize,
    ) -> Result<usize> {
        Ok(self.read_section_range(section, buf, addr, length)?)
    }

    fn find_string(&self, addr: u32) -> Option<String> {
        Self::find_string(self, addr)
    }

    fn find_string_in(&self, addr: u32, section_name: &str) -> Option<String> {
        Self::find_string_in(self, addr, section_name)
    }

    fn crc(&self, section: &SectionHeader) -> Result<u32> {
        Ok(self.section_crc(section)?)
    }

    fn crc_range(&self, section: &SectionHeader, addr: u32, length: u32) -> Result<u32> {
        Ok(self.section_crc_range(section, addr, length)?)
    }
}
