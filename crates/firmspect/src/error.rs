use thiserror::Error;

/// Inspector errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("container error: {0}")]
    Elf(#[from] firmspect_elf::ElfError),
    #[error("debug info error: {0}")]
    Dwarf(#[from] firmspect_dwarf::DwarfError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
