//! DWARF tag, attribute and form constants.
//!
//! Dispatch is on these integers; the name functions exist for diagnostics
//! only.

// Tags
pub const DW_TAG_ARRAY_TYPE: u32 = 0x01;
pub const DW_TAG_CLASS_TYPE: u32 = 0x02;
pub const DW_TAG_ENUMERATION_TYPE: u32 = 0x04;
pub const DW_TAG_MEMBER: u32 = 0x0d;
pub const DW_TAG_POINTER_TYPE: u32 = 0x0f;
pub const DW_TAG_REFERENCE_TYPE: u32 = 0x10;
pub const DW_TAG_COMPILE_UNIT: u32 = 0x11;
pub const DW_TAG_STRING_TYPE: u32 = 0x12;
pub const DW_TAG_STRUCTURE_TYPE: u32 = 0x13;
pub const DW_TAG_SUBROUTINE_TYPE: u32 = 0x15;
pub const DW_TAG_TYPEDEF: u32 = 0x16;
pub const DW_TAG_UNION_TYPE: u32 = 0x17;
pub const DW_TAG_PTR_TO_MEMBER_TYPE: u32 = 0x1f;
pub const DW_TAG_SET_TYPE: u32 = 0x20;
pub const DW_TAG_SUBRANGE_TYPE: u32 = 0x21;
pub const DW_TAG_BASE_TYPE: u32 = 0x24;
pub const DW_TAG_CONST_TYPE: u32 = 0x26;
pub const DW_TAG_FILE_TYPE: u32 = 0x29;
pub const DW_TAG_PACKED_TYPE: u32 = 0x2d;
pub const DW_TAG_SUBPROGRAM: u32 = 0x2e;
pub const DW_TAG_TEMPLATE_TYPE_PARAMETER: u32 = 0x2f;
pub const DW_TAG_THROWN_TYPE: u32 = 0x31;
pub const DW_TAG_VARIABLE: u32 = 0x34;
pub const DW_TAG_VOLATILE_TYPE: u32 = 0x35;
pub const DW_TAG_RESTRICT_TYPE: u32 = 0x37;
pub const DW_TAG_INTERFACE_TYPE: u32 = 0x38;
pub const DW_TAG_UNSPECIFIED_TYPE: u32 = 0x3b;
pub const DW_TAG_SHARED_TYPE: u32 = 0x40;
pub const DW_TAG_TYPE_UNIT: u32 = 0x41;
pub const DW_TAG_RVALUE_REFERENCE_TYPE: u32 = 0x42;

// Attributes
pub const DW_AT_NAME: u32 = 0x03;
pub const DW_AT_BYTE_SIZE: u32 = 0x0b;
pub const DW_AT_STMT_LIST: u32 = 0x10;
pub const DW_AT_COMP_DIR: u32 = 0x1b;
pub const DW_AT_UPPER_BOUND: u32 = 0x2f;
pub const DW_AT_DATA_MEMBER_LOCATION: u32 = 0x38;
pub const DW_AT_TYPE: u32 = 0x49;

// Forms
pub const DW_FORM_ADDR: u32 = 0x01;
pub const DW_FORM_BLOCK2: u32 = 0x03;
pub const DW_FORM_BLOCK4: u32 = 0x04;
pub const DW_FORM_DATA2: u32 = 0x05;
pub const DW_FORM_DATA4: u32 = 0x06;
pub const DW_FORM_DATA8: u32 = 0x07;
pub const DW_FORM_STRING: u32 = 0x08;
pub const DW_FORM_BLOCK: u32 = 0x09;
pub const DW_FORM_BLOCK1: u32 = 0x0a;
pub const DW_FORM_DATA1: u32 = 0x0b;
pub const DW_FORM_FLAG: u32 = 0x0c;
pub const DW_FORM_SDATA: u32 = 0x0d;
pub const DW_FORM_STRP: u32 = 0x0e;
pub const DW_FORM_UDATA: u32 = 0x0f;
pub const DW_FORM_REF_ADDR: u32 = 0x10;
pub const DW_FORM_REF1: u32 = 0x11;
pub const DW_FORM_REF2: u32 = 0x12;
pub const DW_FORM_REF4: u32 = 0x13;
pub const DW_FORM_REF8: u32 = 0x14;
pub const DW_FORM_REF_UDATA: u32 = 0x15;
pub const DW_FORM_INDIRECT: u32 = 0x16;
pub const DW_FORM_SEC_OFFSET: u32 = 0x17;
pub const DW_FORM_EXPRLOC: u32 = 0x18;
pub const DW_FORM_FLAG_PRESENT: u32 = 0x19;
pub const DW_FORM_REF_SIG8: u32 = 0x20;

/// `DW_OP_plus_uconst`, the one location opcode interpreted in blocks.
pub const DW_OP_PLUS_UCONST: u8 = 35;

/// On-disk width class of an attribute form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormWidth {
    /// Fixed byte count.
    Fixed(usize),
    /// Self-describing (LEB128, inline string, block with encoded length).
    Zero,
    /// Not a form this decoder knows.
    Invalid,
}

/// Width class for `form`. The `addr` form's width comes from the current
/// compilation unit's address size.
#[must_use]
pub fn form_width(form: u32, address_size: usize) -> FormWidth {
    match form {
        DW_FORM_ADDR => FormWidth::Fixed(address_size),
        DW_FORM_BLOCK1 | DW_FORM_DATA1 | DW_FORM_FLAG | DW_FORM_REF1 => FormWidth::Fixed(1),
        DW_FORM_BLOCK2 | DW_FORM_DATA2 | DW_FORM_REF2 => FormWidth::Fixed(2),
        DW_FORM_BLOCK4 | DW_FORM_DATA4 | DW_FORM_STRP | DW_FORM_REF_ADDR | DW_FORM_REF4
        | DW_FORM_SEC_OFFSET => FormWidth::Fixed(4),
        DW_FORM_DATA8 | DW_FORM_REF8 => FormWidth::Fixed(8),
        DW_FORM_STRING | DW_FORM_BLOCK | DW_FORM_SDATA | DW_FORM_UDATA | DW_FORM_REF_UDATA
        | DW_FORM_INDIRECT | DW_FORM_EXPRLOC | DW_FORM_FLAG_PRESENT | DW_FORM_REF_SIG8 => {
            FormWidth::Zero
        }
        _ => FormWidth::Invalid,
    }
}

/// Whether `tag` describes a type DIE (anything the type graph records).
#[must_use]
pub fn is_type_tag(tag: u32) -> bool {
    matches!(
        tag,
        DW_TAG_ARRAY_TYPE
            | DW_TAG_CLASS_TYPE
            | DW_TAG_ENUMERATION_TYPE
            | DW_TAG_POINTER_TYPE
            | DW_TAG_REFERENCE_TYPE
            | DW_TAG_STRING_TYPE
            | DW_TAG_STRUCTURE_TYPE
            | DW_TAG_SUBROUTINE_TYPE
            | DW_TAG_TYPEDEF
            | DW_TAG_UNION_TYPE
            | DW_TAG_PTR_TO_MEMBER_TYPE
            | DW_TAG_SET_TYPE
            | DW_TAG_SUBRANGE_TYPE
            | DW_TAG_BASE_TYPE
            | DW_TAG_CONST_TYPE
            | DW_TAG_FILE_TYPE
            | DW_TAG_PACKED_TYPE
            | DW_TAG_TEMPLATE_TYPE_PARAMETER
            | DW_TAG_THROWN_TYPE
            | DW_TAG_VOLATILE_TYPE
            | DW_TAG_RESTRICT_TYPE
            | DW_TAG_INTERFACE_TYPE
            | DW_TAG_UNSPECIFIED_TYPE
            | DW_TAG_SHARED_TYPE
            | DW_TAG_TYPE_UNIT
            | DW_TAG_RVALUE_REFERENCE_TYPE
    )
}

/// Diagnostic name for a tag.
#[must_use]
pub fn tag_name(tag: u32) -> String {
    let known = match tag {
        DW_TAG_ARRAY_TYPE => "DW_TAG_array_type",
        DW_TAG_MEMBER => "DW_TAG_member",
        DW_TAG_COMPILE_UNIT => "DW_TAG_compile_unit",
        DW_TAG_STRUCTURE_TYPE => "DW_TAG_structure_type",
        DW_TAG_TYPEDEF => "DW_TAG_typedef",
        DW_TAG_UNION_TYPE => "DW_TAG_union_type",
        DW_TAG_SUBRANGE_TYPE => "DW_TAG_subrange_type",
        DW_TAG_BASE_TYPE => "DW_TAG_base_type",
        DW_TAG_POINTER_TYPE => "DW_TAG_pointer_type",
        DW_TAG_SUBPROGRAM => "DW_TAG_subprogram",
        DW_TAG_VARIABLE => "DW_TAG_variable",
        _ => return format!("DW_TAG<0x{tag:x}>"),
    };
    known.to_owned()
}

/// Diagnostic name for a form.
#[must_use]
pub fn form_name(form: u32) -> String {
    let known = match form {
        DW_FORM_ADDR => "DW_FORM_addr",
        DW_FORM_DATA1 => "DW_FORM_data1",
        DW_FORM_DATA2 => "DW_FORM_data2",
        DW_FORM_DATA4 => "DW_FORM_data4",
        DW_FORM_DATA8 => "DW_FORM_data8",
        DW_FORM_STRING => "DW_FORM_string",
        DW_FORM_STRP => "DW_FORM_strp",
        DW_FORM_UDATA => "DW_FORM_udata",
        DW_FORM_SDATA => "DW_FORM_sdata",
        DW_FORM_REF4 => "DW_FORM_ref4",
        DW_FORM_EXPRLOC => "DW_FORM_exprloc",
        DW_FORM_FLAG_PRESENT => "DW_FORM_flag_present",
        _ => return format!("DW_FORM<0x{form:x}>"),
    };
    known.to_owned()
}
