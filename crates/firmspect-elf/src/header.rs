//! ELF file header, section header and symbol record structures.

use crate::constants::*;
use crate::{ElfError, Result};

/// Read big-endian u16 from bytes.
#[inline]
fn read_be16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Read big-endian u32 from bytes.
#[inline]
fn read_be32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Fixed-size ELF file header.
///
/// Multi-byte fields are read big-endian first; if the version field comes
/// out at 255 or above the file was written in the opposite byte order and
/// every multi-byte field is swapped before use. The same decision applies
/// to all section headers and symbol records that follow.
#[derive(Clone, Debug)]
pub struct FileHeader {
    pub e_ident: [u8; EI_NIDENT],
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u32,
    pub e_phoff: u32,
    pub e_shoff: u32,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
    /// Whether multi-byte fields required swapping relative to the read order.
    pub swapped: bool,
}

impl FileHeader {
    /// Parse the header from the first [`FILE_HEADER_SIZE`] bytes of a file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FILE_HEADER_SIZE {
            return Err(ElfError::MalformedHeader("file shorter than header"));
        }
        if data[..4] != ELF_MAGIC {
            return Err(ElfError::MalformedHeader("bad magic number"));
        }
        if data[EI_CLASS] != ELF_CLASS_32 {
            return Err(ElfError::MalformedHeader("not a 32-bit object"));
        }
        if data[EI_DATA] != ELFDATA2LSB && data[EI_DATA] != ELFDATA2MSB {
            return Err(ElfError::MalformedHeader("invalid data encoding"));
        }

        let mut e_ident = [0u8; EI_NIDENT];
        e_ident.copy_from_slice(&data[..EI_NIDENT]);

        let mut header = Self {
            e_ident,
            e_type: read_be16(data, 16),
            e_machine: read_be16(data, 18),
            e_version: read_be32(data, 20),
            e_entry: read_be32(data, 24),
            e_phoff: read_be32(data, 28),
            e_shoff: read_be32(data, 32),
            e_flags: read_be32(data, 36),
            e_ehsize: read_be16(data, 40),
            e_phentsize: read_be16(data, 42),
            e_phnum: read_be16(data, 44),
            e_shentsize: read_be16(data, 46),
            e_shnum: read_be16(data, 48),
            e_shstrndx: read_be16(data, 50),
            // e_version should be 1 in almost all cases
            swapped: read_be32(data, 20) >= 255,
        };

        if header.swapped {
            header.e_type = header.e_type.swap_bytes();
            header.e_machine = header.e_machine.swap_bytes();
            header.e_version = header.e_version.swap_bytes();
            header.e_entry = header.e_entry.swap_bytes();
            header.e_phoff = header.e_phoff.swap_bytes();
            header.e_shoff = header.e_shoff.swap_bytes();
            header.e_flags = header.e_flags.swap_bytes();
            header.e_ehsize = header.e_ehsize.swap_bytes();
            header.e_phentsize = header.e_phentsize.swap_bytes();
            header.e_phnum = header.e_phnum.swap_bytes();
            header.e_shentsize = header.e_shentsize.swap_bytes();
            header.e_shnum = header.e_shnum.swap_bytes();
            header.e_shstrndx = header.e_shstrndx.swap_bytes();
        }

        Ok(header)
    }

    /// The data-encoding byte of `e_ident`.
    #[must_use]
    pub fn data_encoding(&self) -> u8 {
        self.e_ident[EI_DATA]
    }
}

impl std::fmt::Display for FileHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "version = 0x{:x}, machine = 0x{:x}, nSects = 0x{:x}",
            self.e_version, self.e_machine, self.e_shnum
        )
    }
}

/// One section header table record.
#[derive(Clone, Debug, Default)]
pub struct SectionHeader {
    /// Name resolved from the section name table after all headers are read.
    pub name: String,
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u32,
    pub sh_addr: u32,
    pub sh_offset: u32,
    pub sh_size: u32,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u32,
    pub sh_entsize: u32,
}

impl SectionHeader {
    /// Parse one record, applying the file-wide swap decision.
    pub fn parse(data: &[u8], swapped: bool) -> Result<Self> {
        if data.len() < SECTION_HEADER_SIZE {
            return Err(ElfError::MalformedHeader("section header out of bounds"));
        }
        let field = |offset: usize| {
            let v = read_be32(data, offset);
            if swapped { v.swap_bytes() } else { v }
        };
        Ok(Self {
            name: String::new(),
            sh_name: field(0),
            sh_type: field(4),
            sh_flags: field(8),
            sh_addr: field(12),
            sh_offset: field(16),
            sh_size: field(20),
            sh_link: field(24),
            sh_info: field(28),
            sh_addralign: field(32),
            sh_entsize: field(36),
        })
    }

    /// Whether the section occupies target memory and may hold strings.
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        (self.sh_flags & SHF_ALLOC) != 0 && self.sh_size > 0
    }
}

impl std::fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: base = 0x{:x}, size = 0x{:x} ({}), type = {}",
            self.name, self.sh_addr, self.sh_size, self.sh_size, self.sh_type
        )
    }
}

/// Disjoint classification of a symbol record, derived from `st_info`.
///
/// `st_info` is constructed as `(binding << 4) | (type & 0xf)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Absolute,
    Data,
    Code,
    LocalAbsolute,
    LocalData,
    LocalCode,
    Ignored,
}

/// One fixed 16-byte symbol table record.
#[derive(Clone, Debug)]
pub struct SymbolEntry {
    pub st_name: u32,
    pub st_value: u32,
    pub st_size: u32,
    pub st_info: u8,
    pub st_other: u8,
    pub st_shndx: u16,
}

impl SymbolEntry {
    /// Parse one record from `data`, honoring the byte-swap decision.
    pub fn parse(data: &[u8], swapped: bool) -> Result<Self> {
        if data.len() < SYMBOL_ENTRY_SIZE as usize {
            return Err(ElfError::MalformedHeader("symbol record out of bounds"));
        }
        let word = |offset: usize| {
            let v = read_be32(data, offset);
            if swapped { v.swap_bytes() } else { v }
        };
        let half = if swapped {
            read_be16(data, 14).swap_bytes()
        } else {
            read_be16(data, 14)
        };
        Ok(Self {
            st_name: word(0),
            st_value: word(4),
            st_size: word(8),
            st_info: data[12],
            st_other: data[13],
            st_shndx: half,
        })
    }

    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        const GLOBAL_NOTYPE: u8 = (STB_GLOBAL << 4) | STT_NOTYPE;
        const GLOBAL_OBJECT: u8 = (STB_GLOBAL << 4) | STT_OBJECT;
        const GLOBAL_COMMON: u8 = (STB_GLOBAL << 4) | STT_COMMON;
        const GLOBAL_FUNC: u8 = (STB_GLOBAL << 4) | STT_FUNC;

        match self.st_info {
            GLOBAL_NOTYPE => SymbolKind::Absolute,
            GLOBAL_OBJECT | GLOBAL_COMMON => SymbolKind::Data,
            GLOBAL_FUNC => SymbolKind::Code,
            STT_NOTYPE => SymbolKind::LocalAbsolute,
            STT_OBJECT => SymbolKind::LocalData,
            STT_FUNC => SymbolKind::LocalCode,
            _ => SymbolKind::Ignored,
        }
    }
}
