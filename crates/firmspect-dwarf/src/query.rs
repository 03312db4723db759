//! Flattening query over the decoded type graph.

use std::sync::LazyLock;

use regex::Regex;

use crate::info::DwarfInfo;
use crate::types::TypeNode;
use crate::Result;

/// Member base-type names shaped like `..._<word>_Struct` get that word
/// spliced into the generated display name.
static STRUCT_MEMBER_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+_(\w*)_Struct$").unwrap());

/// Nested structures are expanded no deeper than this.
const MAX_DEPTH: u32 = 3;

/// One flattened global variable instance.
///
/// A dotted `name` refers to an array element or structure member at
/// `offset` bytes from the variable's own address; the leading segment is
/// the symbol-table name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub type_name: String,
    pub offset: u32,
}

impl DwarfInfo {
    /// Flatten all globals whose resolved type name matches `pattern`.
    ///
    /// The pattern must match the whole type name. Array globals expand
    /// into one entry per element; structure globals are searched member
    /// by member for matching base types.
    pub fn global_variables_by_type(&self, pattern: &str) -> Result<Vec<Variable>> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        let mut out = Vec::new();

        for (var_name, &type_offset) in &self.globals {
            // Not every referenced type makes it into the graph; skip
            // variables whose type DIE was never recorded.
            let Some(direct) = self.types.get(type_offset) else {
                continue;
            };
            let Some(base) = self.types.resolve_base(type_offset)? else {
                continue;
            };

            let mut counter: u32 = 1;
            let mut stride: u32 = 0;
            if direct.elem_count > 0 {
                counter = direct.elem_count;
                stride = direct.elem_size;
                if counter > 1 && stride == 0 && base.elem_size > 0 {
                    // The array DIE carried no size; the aggregate it
                    // references may still know its own.
                    stride = base.elem_size;
                }
            }

            for i in 0..counter {
                let name = if stride > 0 {
                    format!("{var_name}.{i}")
                } else {
                    var_name.clone()
                };
                self.collect_matching(&regex, base, name, i * stride, &mut out, 0)?;
            }
        }
        Ok(out)
    }

    /// Walk structure members recursively, emitting every one whose base
    /// type name matches.
    fn collect_matching(
        &self,
        regex: &Regex,
        node: &TypeNode,
        name: String,
        offset: u32,
        out: &mut Vec<Variable>,
        depth: u32,
    ) -> Result<()> {
        if depth >= MAX_DEPTH {
            return Ok(());
        }
        if regex.is_match(&node.name) {
            out.push(Variable {
                name,
                type_name: node.name.clone(),
                offset,
            });
        } else if let Some(members) = &node.members {
            for (&member_offset, &member_type) in members {
                let Some(member_base) = self.types.resolve_base(member_type)? else {
                    return Ok(());
                };
                let next_offset = offset + member_offset as u32;
                let mut member_name = name.clone();
                if let Some(caps) = STRUCT_MEMBER_SHAPE.captures(&member_base.name) {
                    member_name = format!("{member_name}.{}_{next_offset}", &caps[1]);
                }
                self.collect_matching(regex, member_base, member_name, next_offset, out, depth + 1)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_shape_pattern() {
        let caps = STRUCT_MEMBER_SHAPE.captures("ti_sysbios_Task_Struct").unwrap();
        assert_eq!(&caps[1], "Task");
        assert!(STRUCT_MEMBER_SHAPE.captures("_Struct").is_none());
        assert!(STRUCT_MEMBER_SHAPE.captures("Task_Struct_extra").is_none());
    }
}
