//! ELF specification constants.

// e_ident layout
pub const EI_CLASS: usize = 4;
pub const EI_DATA: usize = 5;
pub const EI_NIDENT: usize = 16;

pub const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
pub const ELF_CLASS_32: u8 = 1;

// Data encodings
pub const ELFDATA2LSB: u8 = 1;
pub const ELFDATA2MSB: u8 = 2;

// Machine identifiers
pub const EM_M32: u16 = 1; // AT&T WE 32100
pub const EM_SPARC: u16 = 2; // SPARC
pub const EM_386: u16 = 3; // Intel Architecture
pub const EM_68K: u16 = 4; // Motorola 68000
pub const EM_88K: u16 = 5; // Motorola 88000
pub const EM_860: u16 = 7; // Intel 80860
pub const EM_MIPS: u16 = 8; // MIPS RS3000 Big-Endian
pub const EM_ARM: u16 = 40; // Advanced RISC Machines ARM
pub const EM_MSP430: u16 = 105; // TI MSP430
pub const EM_TI_C6000: u16 = 140; // TI TMS320C6000 DSP family
pub const EM_TI_C2000: u16 = 141; // TI TMS320C2000 DSP family
pub const EM_TI_C5500: u16 = 142; // TI TMS320C55x DSP family
pub const EM_TI_T16: u16 = 143; // TI T16 family

// Section header flags
pub const SHF_WRITE: u32 = 1 << 0;
pub const SHF_ALLOC: u32 = 1 << 1; // Occupies memory at runtime
pub const SHF_EXECINSTR: u32 = 1 << 2;

// Symbol binding (upper 4 bits of st_info)
pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;
pub const STB_WEAK: u8 = 2;

// Symbol type (lower 4 bits of st_info)
pub const STT_NOTYPE: u8 = 0;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;
pub const STT_SECTION: u8 = 3;
pub const STT_FILE: u8 = 4;
pub const STT_COMMON: u8 = 5; // common data object (unallocated externals)

/// Size of one symbol table record on disk.
pub const SYMBOL_ENTRY_SIZE: u64 = 16;

/// Size of the fixed file header.
pub const FILE_HEADER_SIZE: usize = 52;

/// Size of one section header record on disk.
pub const SECTION_HEADER_SIZE: usize = 40;
