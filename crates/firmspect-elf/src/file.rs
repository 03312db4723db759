//! Open container files and read sections, strings and checksums.

use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::constants::{EM_TI_C5500, FILE_HEADER_SIZE, SECTION_HEADER_SIZE};
use crate::crc::Crc32;
use crate::header::{FileHeader, SectionHeader};
use crate::symtab::SymbolTable;
use crate::target::TargetProfile;
use crate::{ElfError, Result};

/// Cap on a single read when streaming a section into memory.
const SECTION_CHUNK: usize = 0x0080_0000;

/// Chunk size for CRC streaming.
const CRC_CHUNK: usize = 1024;

/// Chunk size when scanning for a string terminator.
const STRING_CHUNK: usize = 80;

/// An opened 32-bit ELF object file.
///
/// Owns one file descriptor. `close` releases it and `reopen` restores it;
/// all other operations require the handle to be open. The string-address
/// cache is private to the handle, so a handle must not be shared across
/// threads without external serialization.
#[derive(Debug)]
pub struct ElfFile {
    path: PathBuf,
    file: Option<File>,
    header: FileHeader,
    target: TargetProfile,
    sections: Vec<SectionHeader>,
    string_cache: RefCell<FxHashMap<u64, String>>,
}

impl ElfFile {
    /// Open and parse the container at `path`.
    ///
    /// Reads the file header, resolves the target profile, then reads every
    /// section header and its name. Fails with `UnsupportedArchitecture` if
    /// the machine id has no known profile.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;

        let mut header_bytes = [0u8; FILE_HEADER_SIZE];
        file.read_exact(&mut header_bytes)
            .map_err(|_| ElfError::MalformedHeader("file shorter than header"))?;
        let header = FileHeader::parse(&header_bytes)?;

        let target = TargetProfile::new(header.e_machine, header.data_encoding(), header.e_flags);
        if !target.is_known() {
            return Err(ElfError::UnsupportedArchitecture {
                machine: header.e_machine,
            });
        }

        let mut sections = Vec::with_capacity(header.e_shnum as usize);
        let mut record = [0u8; SECTION_HEADER_SIZE];
        for i in 0..header.e_shnum {
            let offset = u64::from(header.e_shoff) + u64::from(i) * u64::from(header.e_shentsize);
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(&mut record)?;
            sections.push(SectionHeader::parse(&record, header.swapped)?);
        }

        let mut elf = Self {
            path,
            file: Some(file),
            header,
            target,
            sections,
            string_cache: RefCell::new(FxHashMap::default()),
        };
        elf.resolve_section_names()?;

        debug!(
            machine = elf.header.e_machine,
            swapped = elf.header.swapped,
            sections = elf.sections.len(),
            "container parsed"
        );
        Ok(elf)
    }

    fn resolve_section_names(&mut self) -> Result<()> {
        let index = self.header.e_shstrndx as usize;
        let name_table = self
            .sections
            .get(index)
            .ok_or(ElfError::MalformedHeader("section name table out of range"))?
            .clone();
        let strings = self.read_section_bytes(&name_table)?;
        for section in &mut self.sections {
            section.name = cstr_at(&strings, section.sh_name as usize);
        }
        Ok(())
    }

    /// Release the file descriptor. The parsed headers stay available.
    pub fn close(&mut self) {
        self.file = None;
    }

    /// Restore the descriptor after a `close`. No-op if already open.
    pub fn reopen(&mut self) -> Result<()> {
        if self.file.is_none() {
            self.file = Some(File::open(&self.path)?);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    #[must_use]
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    #[must_use]
    pub fn target(&self) -> &TargetProfile {
        &self.target
    }

    /// Whether multi-byte fields needed byte swapping.
    #[must_use]
    pub fn swapped(&self) -> bool {
        self.header.swapped
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionHeader] {
        &self.sections
    }

    /// The first section with the given name.
    #[must_use]
    pub fn find_section(&self, name: &str) -> Option<&SectionHeader> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn file(&self) -> Result<&File> {
        self.file.as_ref().ok_or(ElfError::Closed)
    }

    /// Build the symbol table from `.symtab` / `.strtab`.
    pub fn parse_symbols(&self) -> Result<SymbolTable> {
        let symtab = self
            .find_section(".symtab")
            .ok_or(ElfError::MissingSection(".symtab"))?
            .clone();
        let strtab = self
            .find_section(".strtab")
            .ok_or(ElfError::MissingSection(".strtab"))?
            .clone();

        let symtab_bytes = self.read_section_bytes(&symtab)?;
        let strtab_bytes = self.read_section_bytes(&strtab)?;
        SymbolTable::parse(&symtab_bytes, &strtab_bytes, self.header.swapped)
    }

    /// Read a whole section into memory, streaming in bounded chunks.
    pub fn read_section_bytes(&self, section: &SectionHeader) -> Result<Vec<u8>> {
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(u64::from(section.sh_offset)))?;

        let size = section.sh_size as usize;
        let mut out = Vec::with_capacity(size);
        let mut chunk = vec![0u8; SECTION_CHUNK.min(size.max(1))];
        while out.len() < size {
            let want = chunk.len().min(size - out.len());
            let n = file.read(&mut chunk[..want])?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        Ok(out)
    }

    /// Read part of a section into `buf`, starting at target address `addr`.
    ///
    /// Reads at most `len` bytes, clamped to the buffer size. An address
    /// before the section start reads nothing.
    pub fn read_section_range(
        &self,
        section: &SectionHeader,
        buf: &mut [u8],
        addr: u32,
        len: usize,
    ) -> Result<usize> {
        let len = len.min(buf.len());
        if addr < section.sh_addr {
            return Ok(0);
        }
        let delta = u64::from(addr - section.sh_addr);

        let mut file = self.file()?;
        file.seek(SeekFrom::Start(u64::from(section.sh_offset) + delta))?;
        Ok(file.read(&mut buf[..len])?)
    }

    /// CRC-32 over a whole section's file bytes.
    pub fn section_crc(&self, section: &SectionHeader) -> Result<u32> {
        self.section_crc_range(section, section.sh_addr, section.sh_size)
    }

    /// CRC-32 over `length` bytes of a section starting at address `addr`.
    ///
    /// An address before the section start yields 0 without reading.
    pub fn section_crc_range(&self, section: &SectionHeader, addr: u32, length: u32) -> Result<u32> {
        if addr < section.sh_addr {
            return Ok(0);
        }
        let delta = u64::from(addr - section.sh_addr);

        let mut file = self.file()?;
        file.seek(SeekFrom::Start(u64::from(section.sh_offset) + delta))?;

        let mut crc = Crc32::new();
        let mut buf = [0u8; CRC_CHUNK];
        let mut rem = length as usize;
        while rem > 0 {
            let want = rem.min(buf.len());
            let n = file.read(&mut buf[..want])?;
            if n == 0 {
                break;
            }
            crc.update(&buf[..n]);
            rem -= n;
        }
        Ok(crc.value())
    }

    /// Find the target string at `addr`, scanning allocated sections.
    ///
    /// `addr` is an address as the target sees it. Results are cached per
    /// handle; the cache is dropped on `open`. Lookup failures return
    /// `None`, never an error.
    #[must_use]
    pub fn find_string(&self, addr: u32) -> Option<String> {
        if let Some(hit) = self.string_cache.borrow().get(&u64::from(addr)) {
            return Some(hit.clone());
        }

        let mut addr = u64::from(addr);
        if self.target.machine == EM_TI_C5500 {
            addr *= 2; // C55 data addresses are half of program addresses
        }

        for section in &self.sections {
            if !section.is_allocated() {
                continue;
            }
            let start = u64::from(section.sh_addr);
            let end = start + u64::from(section.sh_size);
            if addr >= start && addr < end {
                let offset =
                    u64::from(section.sh_offset) + u64::from(self.target.mausize) * (addr - start);
                let result = self.read_string_at(offset, self.target.charsize).ok()?;
                self.string_cache.borrow_mut().insert(addr, result.clone());
                return Some(result);
            }
        }
        None
    }

    /// Find the target string at `addr` within one named section. Uncached.
    #[must_use]
    pub fn find_string_in(&self, addr: u32, section_name: &str) -> Option<String> {
        let mut addr = u64::from(addr);
        if self.target.machine == EM_TI_C5500 {
            addr *= 2;
        }

        let section = self.find_section(section_name)?;
        if section.sh_size == 0 {
            return None;
        }
        let start = u64::from(section.sh_addr);
        let end = start + u64::from(section.sh_size);
        if addr < start || addr >= end {
            return None;
        }
        let offset = u64::from(section.sh_offset) + u64::from(self.target.mausize) * (addr - start);
        self.read_string_at(offset, self.target.charsize).ok()
    }

    /// Read a unit-terminated string from the file at `offset`.
    ///
    /// `charsize` bytes make up one character; multi-byte characters are
    /// decimated to the significant byte per the target's endianness.
    fn read_string_at(&self, offset: u64, charsize: u32) -> Result<String> {
        let mut file = self.file()?;
        file.seek(SeekFrom::Start(offset))?;

        let df = charsize as usize;
        let mut result = String::new();
        loop {
            let mut buf = [0u8; STRING_CHUNK];
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }

            let mut n = if df > 1 {
                decimate(&mut buf[..n], df, self.target.big_endian)
            } else {
                n
            };

            let mut done = false;
            if let Some(i) = buf[..n].iter().position(|&b| b == 0) {
                n = i;
                done = true;
            }
            result.push_str(&String::from_utf8_lossy(&buf[..n]));
            if done {
                break;
            }
        }
        Ok(result)
    }
}

/// Compact `df`-byte characters down to one byte each, in place.
/// Returns the decimated length.
fn decimate(buf: &mut [u8], df: usize, big_endian: bool) -> usize {
    let len = buf.len() / df;
    let pos = if big_endian { df - 1 } else { 0 };
    let start = usize::from(!big_endian);
    for i in start..len {
        buf[i] = buf[df * i + pos];
    }
    len
}

/// Read a NUL-terminated string from an in-memory table.
fn cstr_at(data: &[u8], offset: usize) -> String {
    if offset >= data.len() {
        return String::new();
    }
    let bytes = &data[offset..];
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        ELFDATA2LSB, ELFDATA2MSB, ELF_CLASS_32, ELF_MAGIC, EM_ARM, SHF_ALLOC, STB_GLOBAL,
        STT_OBJECT,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct SectionSpec {
        name: &'static str,
        flags: u32,
        addr: u32,
        data: Vec<u8>,
        file_offset: Option<u32>,
    }

    impl SectionSpec {
        fn new(name: &'static str, data: Vec<u8>) -> Self {
            Self {
                name,
                flags: 0,
                addr: 0,
                data,
                file_offset: None,
            }
        }

        fn alloc_at(mut self, addr: u32) -> Self {
            self.flags = SHF_ALLOC;
            self.addr = addr;
            self
        }

        fn at_offset(mut self, offset: u32) -> Self {
            self.file_offset = Some(offset);
            self
        }
    }

    /// Assemble a minimal ELF image. Sections get a null entry prepended
    /// and the section name table appended.
    fn build_elf(little: bool, machine: u16, specs: Vec<SectionSpec>) -> Vec<u8> {
        let w16 = |v: u16| if little { v.to_le_bytes() } else { v.to_be_bytes() };
        let w32 = |v: u32| if little { v.to_le_bytes() } else { v.to_be_bytes() };

        // Section name table: null name first, then one per section.
        let mut shstrtab = vec![0u8];
        let mut name_offsets = vec![0u32];
        for spec in &specs {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(spec.name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");

        let mut image = vec![0u8; FILE_HEADER_SIZE];

        // Place section payloads, honoring any fixed offsets.
        let mut placed = Vec::new(); // (offset, size) per spec
        for spec in &specs {
            if let Some(off) = spec.file_offset {
                assert!(image.len() <= off as usize, "offset overlaps prior data");
                image.resize(off as usize, 0);
            }
            placed.push((image.len() as u32, spec.data.len() as u32));
            image.extend_from_slice(&spec.data);
        }
        let shstrtab_offset = image.len() as u32;
        let shstrtab_len = shstrtab.len() as u32;
        image.extend_from_slice(&shstrtab);

        let e_shoff = image.len() as u32;
        let e_shnum = (specs.len() + 2) as u16;
        let e_shstrndx = e_shnum - 1;

        let push_section = |name: u32, flags: u32, addr: u32, offset: u32, size: u32| {
            let mut rec = Vec::with_capacity(SECTION_HEADER_SIZE);
            rec.extend_from_slice(&w32(name));
            rec.extend_from_slice(&w32(1)); // sh_type PROGBITS
            rec.extend_from_slice(&w32(flags));
            rec.extend_from_slice(&w32(addr));
            rec.extend_from_slice(&w32(offset));
            rec.extend_from_slice(&w32(size));
            rec.extend_from_slice(&w32(0)); // sh_link
            rec.extend_from_slice(&w32(0)); // sh_info
            rec.extend_from_slice(&w32(0)); // sh_addralign
            rec.extend_from_slice(&w32(0)); // sh_entsize
            rec
        };

        let mut table = push_section(0, 0, 0, 0, 0);
        for (spec, (name, (offset, size))) in specs
            .iter()
            .zip(name_offsets[1..].iter().zip(placed.iter()))
        {
            table.extend_from_slice(&push_section(*name, spec.flags, spec.addr, *offset, *size));
        }
        table.extend_from_slice(&push_section(
            shstrtab_name,
            0,
            0,
            shstrtab_offset,
            shstrtab_len,
        ));
        image.extend_from_slice(&table);

        // Fill in the file header last, now that e_shoff is known.
        image[..4].copy_from_slice(&ELF_MAGIC);
        image[crate::constants::EI_CLASS] = ELF_CLASS_32;
        image[crate::constants::EI_DATA] = if little { ELFDATA2LSB } else { ELFDATA2MSB };
        image[6] = 1; // EI_VERSION
        image[16..18].copy_from_slice(&w16(2)); // e_type
        image[18..20].copy_from_slice(&w16(machine));
        image[20..24].copy_from_slice(&w32(1)); // e_version
        image[32..36].copy_from_slice(&w32(e_shoff));
        image[40..42].copy_from_slice(&w16(FILE_HEADER_SIZE as u16));
        image[46..48].copy_from_slice(&w16(SECTION_HEADER_SIZE as u16));
        image[48..50].copy_from_slice(&w16(e_shnum));
        image[50..52].copy_from_slice(&w16(e_shstrndx));
        image
    }

    fn write_image(image: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(image).unwrap();
        file.flush().unwrap();
        file
    }

    fn symbol_record(name_off: u32, value: u32, info: u8, little: bool) -> Vec<u8> {
        let w32 = |v: u32| if little { v.to_le_bytes() } else { v.to_be_bytes() };
        let mut rec = Vec::new();
        rec.extend_from_slice(&w32(name_off));
        rec.extend_from_slice(&w32(value));
        rec.extend_from_slice(&w32(0));
        rec.push(info);
        rec.push(0);
        rec.extend_from_slice(&[0, 0]);
        rec
    }

    #[test]
    fn test_open_resolves_section_names() {
        for little in [false, true] {
            let image = build_elf(
                little,
                EM_ARM,
                vec![SectionSpec::new(".text", vec![0xAB; 8]).alloc_at(0x1000)],
            );
            let file = write_image(&image);
            let elf = ElfFile::open(file.path()).unwrap();

            assert_eq!(elf.swapped(), little);
            let text = elf.find_section(".text").unwrap();
            assert_eq!(text.sh_addr, 0x1000);
            assert_eq!(text.sh_size, 8);
            assert!(elf.find_section(".shstrtab").is_some());
            assert!(elf.find_section(".missing").is_none());
        }
    }

    #[test]
    fn test_unknown_machine_rejected() {
        let image = build_elf(true, 0xbeef, vec![]);
        let file = write_image(&image);
        assert!(matches!(
            ElfFile::open(file.path()),
            Err(ElfError::UnsupportedArchitecture { machine: 0xbeef })
        ));
    }

    #[test]
    fn test_find_string_at_address() {
        // Section spans [0x1000, 0x1010) at file offset 0x200; the string
        // "hi" sits 4 bytes in, so target address 0x1004 resolves to it.
        let mut data = vec![0u8; 16];
        data[4..7].copy_from_slice(b"hi\0");
        let image = build_elf(
            true,
            EM_ARM,
            vec![SectionSpec::new(".data", data).alloc_at(0x1000).at_offset(0x200)],
        );
        let file = write_image(&image);
        let elf = ElfFile::open(file.path()).unwrap();

        assert_eq!(elf.find_string(0x1004).as_deref(), Some("hi"));
        // Cached on repeat lookup.
        assert_eq!(elf.find_string(0x1004).as_deref(), Some("hi"));
        // Out of range for every allocated section.
        assert_eq!(elf.find_string(0x2000), None);

        assert_eq!(elf.find_string_in(0x1004, ".data").as_deref(), Some("hi"));
        assert_eq!(elf.find_string_in(0x1004, ".missing"), None);
    }

    #[test]
    fn test_section_crc() {
        let image = build_elf(
            true,
            EM_ARM,
            vec![SectionSpec::new(".const", b"123456789".to_vec()).alloc_at(0x3000)],
        );
        let file = write_image(&image);
        let elf = ElfFile::open(file.path()).unwrap();
        let section = elf.find_section(".const").unwrap().clone();

        assert_eq!(elf.section_crc(&section).unwrap(), 0xCBF4_3926);
        // Zero length streams no bytes.
        assert_eq!(elf.section_crc_range(&section, 0x3000, 0).unwrap(), 0);
        // Address before the section start reads nothing.
        assert_eq!(elf.section_crc_range(&section, 0x2000, 4).unwrap(), 0);
    }

    #[test]
    fn test_read_section_bytes_and_range() {
        let payload: Vec<u8> = (0..64).collect();
        let image = build_elf(
            true,
            EM_ARM,
            vec![SectionSpec::new(".data", payload.clone()).alloc_at(0x4000)],
        );
        let file = write_image(&image);
        let elf = ElfFile::open(file.path()).unwrap();
        let section = elf.find_section(".data").unwrap().clone();

        assert_eq!(elf.read_section_bytes(&section).unwrap(), payload);

        let mut buf = [0u8; 8];
        let n = elf
            .read_section_range(&section, &mut buf, 0x4010, 8)
            .unwrap();
        assert_eq!(n, 8);
        assert_eq!(&buf, &payload[16..24]);

        // Address below the section reads nothing.
        let n = elf.read_section_range(&section, &mut buf, 0x100, 8).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_close_and_reopen() {
        let image = build_elf(
            true,
            EM_ARM,
            vec![SectionSpec::new(".data", vec![1, 2, 3]).alloc_at(0x4000)],
        );
        let file = write_image(&image);
        let mut elf = ElfFile::open(file.path()).unwrap();
        let section = elf.find_section(".data").unwrap().clone();

        elf.close();
        assert!(elf.is_closed());
        assert!(matches!(
            elf.read_section_bytes(&section),
            Err(ElfError::Closed)
        ));

        elf.reopen().unwrap();
        assert_eq!(elf.read_section_bytes(&section).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_symbols_through_file() {
        let little = true;
        let mut strtab = vec![0u8];
        let counter_off = strtab.len() as u32;
        strtab.extend_from_slice(b"counter\0");

        let info = (STB_GLOBAL << 4) | STT_OBJECT;
        let symtab = symbol_record(counter_off, 0x1234, info, little);

        let image = build_elf(
            little,
            EM_ARM,
            vec![
                SectionSpec::new(".symtab", symtab),
                SectionSpec::new(".strtab", strtab),
            ],
        );
        let file = write_image(&image);
        let elf = ElfFile::open(file.path()).unwrap();

        let symbols = elf.parse_symbols().unwrap();
        assert_eq!(symbols.symbol_value("counter"), Some(0x1234));
        assert_eq!(symbols.data_symbols(0x1234).unwrap(), ["counter"]);
    }

    #[test]
    fn test_missing_symtab_is_error() {
        let image = build_elf(true, EM_ARM, vec![]);
        let file = write_image(&image);
        let elf = ElfFile::open(file.path()).unwrap();
        assert!(matches!(
            elf.parse_symbols(),
            Err(ElfError::MissingSection(".symtab"))
        ));
    }
}
