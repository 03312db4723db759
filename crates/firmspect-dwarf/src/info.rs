//! Compilation-unit decoding and the DIE tree walk.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::abbrev::{Abbrev, AbbrevTable};
use crate::constants::*;
use crate::cursor::{cstr_at, Cursor};
use crate::leb128;
use crate::types::{TypeGraph, TypeNode};
use crate::{DwarfError, Result};

/// Fixed header at the start of each compilation unit.
struct UnitHeader {
    unit_length: u32,
    version: u16,
    abbrev_offset: u32,
    address_size: u8,
}

impl UnitHeader {
    fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            unit_length: cursor.read_u32()?,
            version: cursor.read_u16()?,
            abbrev_offset: cursor.read_u32()?,
            address_size: cursor.read_u8()?,
        })
    }
}

/// Level-spanning walk state.
///
/// A structure DIE is followed by a run of member DIEs, and an array DIE
/// by a subrange DIE carrying the element count. The pending aggregate
/// rides along as state payload and is committed on the first DIE that
/// breaks the run. A null DIE does not break a run.
enum WalkState {
    Idle,
    InStructureMembers {
        offset: u64,
        node: TypeNode,
    },
    InArraySubrange {
        offset: u64,
        node: TypeNode,
        total_size: u32,
        len: u32,
    },
}

/// One decoded attribute value.
///
/// `uint` holds numeric and reference values, `loc` the location offset
/// recovered from `DW_OP_plus_uconst` blocks (and from the one and two
/// byte data forms, which member offsets are commonly encoded with).
#[derive(Default)]
struct Decoded {
    text: Option<String>,
    uint: Option<u64>,
    loc: Option<u64>,
}

/// Type graph and global-variable map decoded from one `.debug_info`.
#[derive(Debug, Default)]
pub struct DwarfInfo {
    pub(crate) globals: FxHashMap<String, u64>,
    pub(crate) types: TypeGraph,
}

impl DwarfInfo {
    /// Decode every compilation unit in `info`.
    ///
    /// `strings` is the optional `.debug_str` payload; some toolchains do
    /// not emit it, which is an error only if a string-indirection form
    /// shows up. `big_endian` follows the container's swap decision.
    pub fn parse(
        info: &[u8],
        abbrev: &[u8],
        strings: Option<&[u8]>,
        big_endian: bool,
    ) -> Result<Self> {
        let table = AbbrevTable::parse(abbrev)?;
        let mut session = table.session();
        let mut cursor = Cursor::new(info, big_endian);
        let mut out = Self::default();

        while cursor.remaining() > 0 {
            let cu_offset = cursor.position();
            let header = UnitHeader::read(&mut cursor)?;
            let address_size = usize::from(header.address_size);
            debug!(
                offset = cu_offset,
                version = header.version,
                length = header.unit_length,
                "compilation unit"
            );

            // The compilation-unit DIE carries nothing we need; advance
            // past its attributes.
            let (code, _) = leb128::read_unsigned(&mut cursor)?;
            let unit_rec = session.lookup(header.abbrev_offset, code)?;
            skip_unit_attributes(&mut cursor, unit_rec, address_size)?;

            let end = cu_offset + header.unit_length as usize + 4;
            let mut level: u32 = 1;
            let mut state = WalkState::Idle;

            while cursor.position() < end {
                let die_offset = cursor.position() as u64;
                let (code, _) = leb128::read_unsigned(&mut cursor)?;
                if code == 0 {
                    // Null DIE: closes one nesting level, leaves any
                    // pending aggregate in place.
                    if level > 1 {
                        level -= 1;
                    }
                    continue;
                }
                let rec = session.lookup(header.abbrev_offset, code)?;
                trace!(offset = die_offset, tag = %tag_name(rec.tag), level, "die");

                // Commit a pending aggregate when its run of child DIEs
                // ends.
                state = match state {
                    WalkState::InStructureMembers { offset, node }
                        if rec.tag != DW_TAG_MEMBER =>
                    {
                        out.types.insert(offset, node);
                        WalkState::Idle
                    }
                    WalkState::InArraySubrange {
                        offset, node, len, ..
                    } if rec.tag != DW_TAG_SUBRANGE_TYPE => {
                        if len != 0 {
                            out.types.insert(offset, node);
                        }
                        WalkState::Idle
                    }
                    other => other,
                };

                let is_var = rec.tag == DW_TAG_VARIABLE;
                let is_struct = rec.tag == DW_TAG_STRUCTURE_TYPE;
                let is_array = rec.tag == DW_TAG_ARRAY_TYPE;
                let is_plain_type = !is_struct && !is_array && is_type_tag(rec.tag);

                let mut name = String::new();
                let mut base: u64 = 0;
                let mut member_offset: u64 = 0;
                let mut byte_size: u64 = 0;

                for attr in &rec.attrs {
                    let decoded = decode_attr(
                        &mut cursor,
                        attr.form,
                        cu_offset as u64,
                        address_size,
                        strings,
                    )?;
                    match attr.id {
                        DW_AT_NAME => {
                            if let Some(text) = decoded.text {
                                name = text;
                            }
                        }
                        DW_AT_TYPE => base = decoded.uint.unwrap_or(0),
                        DW_AT_UPPER_BOUND => {
                            if let WalkState::InArraySubrange { len, .. } = &mut state {
                                if let Some(bound) = decoded.uint {
                                    *len = bound.wrapping_add(1) as u32;
                                }
                            }
                        }
                        DW_AT_DATA_MEMBER_LOCATION => {
                            if matches!(state, WalkState::InStructureMembers { .. }) {
                                member_offset = decoded.loc.unwrap_or(0);
                            }
                        }
                        DW_AT_BYTE_SIZE => byte_size = decoded.uint.unwrap_or(0),
                        _ => {}
                    }
                }

                if rec.has_children {
                    level += 1;
                }

                // Globals sit directly under the compilation unit.
                if is_var && level == 1 && !name.is_empty() {
                    out.globals.insert(name.clone(), base);
                }

                if let WalkState::InStructureMembers { node, .. } = &mut state {
                    if base != 0 {
                        if let Some(members) = &mut node.members {
                            members.insert(member_offset, base);
                        }
                    }
                } else if let WalkState::InArraySubrange {
                    node, total_size, len, ..
                } = &mut state
                {
                    node.elem_count = *len;
                    if *len != 0 {
                        node.elem_size = *total_size / *len;
                    }
                } else if is_plain_type {
                    out.types.insert(
                        die_offset,
                        TypeNode {
                            name,
                            base,
                            ..TypeNode::default()
                        },
                    );
                } else if is_array {
                    state = WalkState::InArraySubrange {
                        offset: die_offset,
                        node: TypeNode {
                            name,
                            base,
                            elem_size: byte_size as u32,
                            ..TypeNode::default()
                        },
                        total_size: byte_size as u32,
                        len: 0,
                    };
                } else if is_struct {
                    state = WalkState::InStructureMembers {
                        offset: die_offset,
                        node: TypeNode {
                            name,
                            base,
                            members: Some(FxHashMap::default()),
                            elem_size: byte_size as u32,
                            ..TypeNode::default()
                        },
                    };
                }
            }
            // An aggregate still pending at the unit boundary is dropped.
        }

        debug!(
            globals = out.globals.len(),
            types = out.types.len(),
            "debug info parsed"
        );
        Ok(out)
    }

    #[must_use]
    pub fn globals(&self) -> &FxHashMap<String, u64> {
        &self.globals
    }

    #[must_use]
    pub fn types(&self) -> &TypeGraph {
        &self.types
    }
}

/// Advance past the compilation-unit DIE's attribute values.
///
/// The handful of string-class unit attributes historically consumed a
/// fixed 4 bytes here regardless of declared width; keep that.
fn skip_unit_attributes(
    cursor: &mut Cursor<'_>,
    rec: &Abbrev,
    address_size: usize,
) -> Result<()> {
    for attr in &rec.attrs {
        match form_width(attr.form, address_size) {
            FormWidth::Fixed(size) => {
                if matches!(attr.id, DW_AT_COMP_DIR | DW_AT_NAME | DW_AT_STMT_LIST) {
                    cursor.read_u32()?;
                } else {
                    cursor.skip(size)?;
                }
            }
            FormWidth::Zero => {
                if attr.form == DW_FORM_STRING {
                    cursor.read_cstr()?;
                } else {
                    leb128::read_unsigned(cursor)?;
                }
            }
            FormWidth::Invalid => return Err(DwarfError::UnsupportedForm { form: attr.form }),
        }
    }
    Ok(())
}

/// Decode one attribute value by form.
fn decode_attr(
    cursor: &mut Cursor<'_>,
    form: u32,
    cu_offset: u64,
    address_size: usize,
    strings: Option<&[u8]>,
) -> Result<Decoded> {
    let mut decoded = Decoded::default();

    match form_width(form, address_size) {
        FormWidth::Fixed(size) => match form {
            DW_FORM_STRP => {
                let strings = strings.ok_or(DwarfError::MissingStringSection)?;
                let offset = cursor.read_u32()? as usize;
                decoded.text = Some(cstr_at(strings, offset)?);
            }
            DW_FORM_REF1 => decoded.uint = Some(cu_offset + u64::from(cursor.read_u8()?)),
            DW_FORM_REF2 => decoded.uint = Some(cu_offset + u64::from(cursor.read_u16()?)),
            DW_FORM_REF4 => decoded.uint = Some(cu_offset + u64::from(cursor.read_u32()?)),
            DW_FORM_REF8 => {
                decoded.uint = Some(cu_offset.wrapping_add(cursor.read_u64()?));
            }
            DW_FORM_REF_ADDR | DW_FORM_SEC_OFFSET => {
                decoded.uint = Some(u64::from(cursor.read_u32()?));
            }
            _ => {
                let value = match size {
                    1 => u64::from(cursor.read_u8()?),
                    2 => u64::from(cursor.read_u16()?),
                    4 => u64::from(cursor.read_u32()?),
                    _ => return Err(DwarfError::UnsupportedForm { form }),
                };
                match form {
                    // Member offsets commonly use the short data forms.
                    DW_FORM_DATA1 | DW_FORM_DATA2 => {
                        decoded.uint = Some(value);
                        decoded.loc = Some(value);
                    }
                    DW_FORM_BLOCK1 | DW_FORM_BLOCK2 | DW_FORM_BLOCK4 => {
                        decoded.loc = decode_block(cursor, value)?;
                    }
                    _ => decoded.uint = Some(value),
                }
            }
        },
        FormWidth::Zero => match form {
            DW_FORM_FLAG_PRESENT => {}
            DW_FORM_STRING => decoded.text = Some(cursor.read_cstr()?),
            DW_FORM_BLOCK | DW_FORM_EXPRLOC => {
                let (len, _) = leb128::read_unsigned(cursor)?;
                decoded.loc = decode_block(cursor, u64::from(len))?;
            }
            DW_FORM_SDATA => {
                let (value, _) = leb128::read_signed(cursor)?;
                decoded.uint = Some(i64::from(value) as u64);
            }
            _ => {
                let (value, _) = leb128::read_unsigned(cursor)?;
                decoded.uint = Some(if form == DW_FORM_UDATA {
                    u64::from(value)
                } else {
                    cu_offset + u64::from(value)
                });
            }
        },
        FormWidth::Invalid => {
            debug!(form = %form_name(form), "unsupported attribute form");
            return Err(DwarfError::UnsupportedForm { form });
        }
    }
    Ok(decoded)
}

/// Decode a location block of `len` bytes.
///
/// Only `DW_OP_plus_uconst` is interpreted; its ULEB128 operand is the
/// member byte offset. Any other opcode skips the rest of the block.
fn decode_block(cursor: &mut Cursor<'_>, len: u64) -> Result<Option<u64>> {
    if len == 0 {
        return Ok(None);
    }
    let opcode = cursor.read_u8()?;
    if opcode == DW_OP_PLUS_UCONST {
        let (operand, _) = leb128::read_unsigned(cursor)?;
        Ok(Some(u64::from(operand)))
    } else {
        cursor.skip(len.saturating_sub(1) as usize)?;
        Ok(None)
    }
}
