//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "firmspect")]
#[command(about = "Firmware object inspector - sections, symbols and typed globals")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List section headers
    Sections {
        /// Input object file
        #[arg(value_name = "OBJECT")]
        input: PathBuf,
    },
    /// List global symbols with their addresses
    Symbols {
        /// Input object file
        #[arg(value_name = "OBJECT")]
        input: PathBuf,
    },
    /// List typed global variables resolved through debug info
    Vars {
        /// Input object file
        #[arg(value_name = "OBJECT")]
        input: PathBuf,

        /// Regular expression the resolved type name must match
        #[arg(short = 't', long = "type", value_name = "PATTERN", default_value = ".*")]
        type_pattern: String,
    },
    /// Read the C string at a target address
    String {
        /// Input object file
        #[arg(value_name = "OBJECT")]
        input: PathBuf,

        /// Target address (hex accepted with 0x prefix)
        #[arg(value_name = "ADDR", value_parser = parse_addr)]
        addr: u32,

        /// Restrict the search to one named section
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Compute the CRC-32 of a section's contents
    Crc {
        /// Input object file
        #[arg(value_name = "OBJECT")]
        input: PathBuf,

        /// Section name (e.g. .text)
        #[arg(value_name = "SECTION")]
        section: String,
    },
}

/// Parse a target address, accepting decimal or 0x-prefixed hex.
fn parse_addr(arg: &str) -> Result<u32, String> {
    let arg = arg.trim();
    let parsed = if let Some(hex) = arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        arg.parse()
    };
    parsed.map_err(|e| format!("invalid address '{arg}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addr() {
        assert_eq!(parse_addr("4096"), Ok(4096));
        assert_eq!(parse_addr("0x1000"), Ok(0x1000));
        assert_eq!(parse_addr("0X20"), Ok(0x20));
        assert!(parse_addr("xyz").is_err());
    }
}
