//! Raw data commands: target strings and section checksums.

use std::path::Path;

use firmspect::Inspector;
use tracing::error;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

pub fn cmd_string(input: &Path, addr: u32, section: Option<&str>) -> i32 {
    let inspector = match Inspector::open(input) {
        Ok(inspector) => inspector,
        Err(e) => {
            error!(error = %e, path = %input.display(), "failed to open object file");
            return EXIT_FAILURE;
        }
    };

    let found = match section {
        Some(name) => inspector.elf().find_string_in(addr, name),
        None => inspector.elf().find_string(addr),
    };
    match found {
        Some(text) => {
            println!("{text}");
            EXIT_SUCCESS
        }
        None => {
            error!(addr = %format_args!("0x{addr:x}"), "no string at address");
            EXIT_FAILURE
        }
    }
}

pub fn cmd_crc(input: &Path, section_name: &str) -> i32 {
    let inspector = match Inspector::open(input) {
        Ok(inspector) => inspector,
        Err(e) => {
            error!(error = %e, path = %input.display(), "failed to open object file");
            return EXIT_FAILURE;
        }
    };

    let Some(section) = inspector.elf().find_section(section_name) else {
        error!(section = section_name, "no such section");
        return EXIT_FAILURE;
    };
    match inspector.elf().section_crc(section) {
        Ok(crc) => {
            println!("0x{crc:08x}");
            EXIT_SUCCESS
        }
        Err(e) => {
            error!(error = %e, section = section_name, "failed to checksum section");
            EXIT_FAILURE
        }
    }
}
