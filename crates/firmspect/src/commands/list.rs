//! Listing commands: sections, symbols and typed globals.

use std::path::Path;

use firmspect::Inspector;
use tracing::error;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

fn open(input: &Path) -> Option<Inspector> {
    match Inspector::open(input) {
        Ok(inspector) => Some(inspector),
        Err(e) => {
            error!(error = %e, path = %input.display(), "failed to open object file");
            None
        }
    }
}

pub fn cmd_sections(input: &Path) -> i32 {
    let Some(inspector) = open(input) else {
        return EXIT_FAILURE;
    };

    println!("{}", inspector.elf().header());
    for section in inspector.elf().sections() {
        println!("{section}");
    }
    EXIT_SUCCESS
}

pub fn cmd_symbols(input: &Path) -> i32 {
    let Some(mut inspector) = open(input) else {
        return EXIT_FAILURE;
    };

    let symbols = match inspector.symbols() {
        Ok(table) => table,
        Err(e) => {
            error!(error = %e, "failed to parse symbol table");
            return EXIT_FAILURE;
        }
    };

    let mut entries: Vec<(&str, u32)> = symbols.iter().collect();
    entries.sort_unstable();
    for (name, value) in entries {
        println!("0x{value:08x} {name}");
    }
    EXIT_SUCCESS
}

pub fn cmd_vars(input: &Path, type_pattern: &str) -> i32 {
    let Some(mut inspector) = open(input) else {
        return EXIT_FAILURE;
    };

    let mut variables = match inspector.global_variables_by_type(type_pattern) {
        Ok(vars) => vars,
        Err(e) => {
            error!(error = %e, pattern = type_pattern, "failed to resolve typed globals");
            return EXIT_FAILURE;
        }
    };
    variables.sort_unstable_by(|a, b| a.name.cmp(&b.name));

    for var in &variables {
        let base = var.name.split('.').next().unwrap_or(&var.name);
        // The filter in global_variables_by_type guarantees the base symbol
        // exists; a miss here would mean the table changed underneath us.
        let addr = match inspector.symbols() {
            Ok(table) => table.symbol_value(base).map(|v| v + var.offset),
            Err(_) => None,
        };
        match addr {
            Some(addr) => println!("0x{addr:08x} {} : {}", var.name, var.type_name),
            None => println!("           {} : {}", var.name, var.type_name),
        }
    }
    EXIT_SUCCESS
}
