//! Command implementations.

mod data;
mod list;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Sections { .. } => handle_sections(cli),
        Commands::Symbols { .. } => handle_symbols(cli),
        Commands::Vars { .. } => handle_vars(cli),
        Commands::String { .. } => handle_string(cli),
        Commands::Crc { .. } => handle_crc(cli),
    }
}

fn handle_sections(cli: &Cli) -> i32 {
    let Commands::Sections { input } = &cli.command else {
        unreachable!("sections command variant mismatch");
    };
    list::cmd_sections(input)
}

fn handle_symbols(cli: &Cli) -> i32 {
    let Commands::Symbols { input } = &cli.command else {
        unreachable!("symbols command variant mismatch");
    };
    list::cmd_symbols(input)
}

fn handle_vars(cli: &Cli) -> i32 {
    let Commands::Vars {
        input,
        type_pattern,
    } = &cli.command
    else {
        unreachable!("vars command variant mismatch");
    };
    list::cmd_vars(input, type_pattern)
}

fn handle_string(cli: &Cli) -> i32 {
    let Commands::String {
        input,
        addr,
        section,
    } = &cli.command
    else {
        unreachable!("string command variant mismatch");
    };
    data::cmd_string(input, *addr, section.as_deref())
}

fn handle_crc(cli: &Cli) -> i32 {
    let Commands::Crc { input, section } = &cli.command else {
        unreachable!("crc command variant mismatch");
    };
    data::cmd_crc(input, section)
}
