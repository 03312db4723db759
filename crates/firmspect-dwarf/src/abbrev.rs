//! Abbreviation table parsing and lookup.

use tracing::debug;

use crate::cursor::Cursor;
use crate::leb128;
use crate::{DwarfError, Result};

/// One (attribute, form) pair of an abbreviation record.
#[derive(Clone, Copy, Debug)]
pub struct AttrSpec {
    pub id: u32,
    pub form: u32,
}

/// One abbreviation record, keyed by its own byte offset in the section.
#[derive(Clone, Debug)]
pub struct Abbrev {
    pub offset: u32,
    pub code: u32,
    pub tag: u32,
    pub has_children: bool,
    pub attrs: Vec<AttrSpec>,
}

/// The fully parsed `.debug_abbrev` section.
///
/// Records are stored in file order, including the code-0 records that
/// terminate each offset group; compilation units address groups by the
/// byte offset of their first record.
#[derive(Debug)]
pub struct AbbrevTable {
    records: Vec<Abbrev>,
}

impl AbbrevTable {
    /// Parse the whole section. Byte order is irrelevant here, everything
    /// is LEB128 or single bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data, true);
        let mut records = Vec::new();

        while cursor.remaining() > 0 {
            let offset = cursor.position() as u32;
            let (code, _) = leb128::read_unsigned(&mut cursor)?;

            let mut record = Abbrev {
                offset,
                code,
                tag: 0,
                has_children: false,
                attrs: Vec::new(),
            };

            if code != 0 && cursor.remaining() > 0 {
                let (tag, _) = leb128::read_unsigned(&mut cursor)?;
                record.tag = tag;
                record.has_children = cursor.read_u8()? != 0;

                while cursor.remaining() > 0 {
                    let (id, _) = leb128::read_unsigned(&mut cursor)?;
                    let (form, _) = leb128::read_unsigned(&mut cursor)?;
                    if id == 0 && form == 0 {
                        break;
                    }
                    record.attrs.push(AttrSpec { id, form });
                }
            }
            records.push(record);
        }

        debug!(records = records.len(), "abbreviation table parsed");
        Ok(Self { records })
    }

    /// Start a lookup session. The session's cursor hint carries across
    /// lookups within one parse, nothing wider.
    #[must_use]
    pub fn session(&self) -> AbbrevCursor<'_> {
        AbbrevCursor {
            table: self,
            last_found: 0,
        }
    }
}

/// Lookup state for one parse of `.debug_info`.
///
/// Codes are requested in roughly non-decreasing order within a unit, and
/// units batch by offset, so the search resumes where the last one matched
/// and wraps around once before giving up.
#[derive(Debug)]
pub struct AbbrevCursor<'a> {
    table: &'a AbbrevTable,
    last_found: usize,
}

impl<'a> AbbrevCursor<'a> {
    /// Find the record with `code` in the group starting at `offset`.
    pub fn lookup(&mut self, offset: u32, code: u32) -> Result<&'a Abbrev> {
        let records = &self.table.records;
        let miss = || DwarfError::AbbreviationNotFound { code, offset };
        if records.is_empty() {
            return Err(miss());
        }

        let start = self.last_found.min(records.len() - 1);
        let mut i = start;
        loop {
            if records[i].offset == offset {
                self.last_found = i;
                // Scan forward within the group for the code.
                return records[i..]
                    .iter()
                    .find(|r| r.code == code)
                    .ok_or_else(miss);
            }
            i = if i < records.len() - 1 { i + 1 } else { 0 };
            if i == start {
                return Err(miss());
            }
        }
    }
}
