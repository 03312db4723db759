//! Symbol table built from `.symtab` / `.strtab`.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::constants::SYMBOL_ENTRY_SIZE;
use crate::header::{SymbolEntry, SymbolKind};
use crate::Result;

/// C identifiers, optionally followed by the `$<file number>` suffix that
/// program-level optimization appends to each static symbol.
static C_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*(\$[0-9]+)?$").unwrap());

/// Strip the `$<digits>` optimization suffix from a symbol name.
fn demangle(name: &str) -> &str {
    match name.find('$') {
        Some(k) => &name[..k],
        None => name,
    }
}

/// Name and address maps for the symbols of one object file.
///
/// Built by [`crate::ElfFile::parse_symbols`]. Data, code and absolute
/// symbols are kept in separate address-to-names maps so callers can pick
/// the class they care about; every retained symbol also lands in a single
/// name-to-address map.
#[derive(Debug, Default)]
pub struct SymbolTable {
    by_name: FxHashMap<String, u32>,
    data_by_value: FxHashMap<u32, Vec<String>>,
    code_by_value: FxHashMap<u32, Vec<String>>,
    abs_by_value: FxHashMap<u32, Vec<String>>,
}

impl SymbolTable {
    /// Build the table from the raw bytes of `.symtab` and `.strtab`.
    pub fn parse(symtab: &[u8], strtab: &[u8], swapped: bool) -> Result<Self> {
        let mut table = Self::default();
        let entry_size = SYMBOL_ENTRY_SIZE as usize;
        let count = symtab.len() / entry_size;

        for i in 0..count {
            let entry = SymbolEntry::parse(&symtab[i * entry_size..], swapped)?;
            let kind = entry.kind();
            if kind == SymbolKind::Ignored {
                continue;
            }

            let name = string_at(strtab, entry.st_name as usize);
            if name.is_empty() {
                continue;
            }

            // Local code and local absolute symbols include assembler
            // labels; keep only valid C identifiers.
            if matches!(kind, SymbolKind::LocalCode | SymbolKind::LocalAbsolute)
                && !C_IDENT.is_match(&name)
            {
                continue;
            }

            let value = entry.st_value;

            // A local data symbol never displaces a global of the same name.
            if kind != SymbolKind::LocalData || !table.by_name.contains_key(&name) {
                table.by_name.insert(name.clone(), value);
            }

            let by_value = match kind {
                SymbolKind::Data | SymbolKind::LocalData => &mut table.data_by_value,
                SymbolKind::Code | SymbolKind::LocalCode => &mut table.code_by_value,
                SymbolKind::Absolute | SymbolKind::LocalAbsolute => &mut table.abs_by_value,
                SymbolKind::Ignored => unreachable!(),
            };
            by_value
                .entry(value)
                .or_default()
                .push(demangle(&name).to_owned());
        }

        table.synthesize_aliases();

        debug!(
            symbols = table.by_name.len(),
            data = table.data_by_value.len(),
            code = table.code_by_value.len(),
            "symbol table parsed"
        );
        Ok(table)
    }

    /// The linker does not emit `__stack` / `__STACK_SIZE` directly; derive
    /// them from the toolchain-specific names when those are present.
    fn synthesize_aliases(&mut self) {
        let stack = self
            .by_name
            .get("_stack")
            .or_else(|| self.by_name.get("__TI_STACK_BASE"))
            .copied();
        if let Some(addr) = stack {
            self.by_name.insert("__stack".to_owned(), addr);
        }
        if let Some(size) = self.by_name.get("__TI_STACK_SIZE").copied() {
            self.by_name.insert("__STACK_SIZE".to_owned(), size);
        }
    }

    /// Address bound to `name`, if the symbol exists.
    #[must_use]
    pub fn symbol_value(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// Data symbol names bound at `value`. Falls back to absolute symbols
    /// so ROM-resident data still resolves.
    #[must_use]
    pub fn data_symbols(&self, value: u32) -> Option<&[String]> {
        self.data_by_value
            .get(&value)
            .or_else(|| self.abs_by_value.get(&value))
            .map(Vec::as_slice)
    }

    /// Function names bound at `value`, with the same ROM fallback.
    #[must_use]
    pub fn func_names(&self, value: u32) -> Option<&[String]> {
        self.code_by_value
            .get(&value)
            .or_else(|| self.abs_by_value.get(&value))
            .map(Vec::as_slice)
    }

    /// Absolute symbol names bound at `value`.
    #[must_use]
    pub fn absolute_symbols(&self, value: u32) -> Option<&[String]> {
        self.abs_by_value.get(&value).map(Vec::as_slice)
    }

    /// Iterate all (name, address) pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.by_name.iter().map(|(name, &value)| (name.as_str(), value))
    }
}

/// Read a NUL-terminated string from a string table at `offset`.
fn string_at(strtab: &[u8], offset: usize) -> String {
    if offset >= strtab.len() {
        return String::new();
    }
    let bytes = &strtab[offset..];
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
