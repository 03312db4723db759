//! Type graph built from the DIE walk.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{DwarfError, Result};

/// One type DIE, keyed in the graph by its byte offset in `.debug_info`.
///
/// `members` is present only for structure-like aggregates and maps a
/// member's byte offset to the member type's DIE offset. `elem_count` and
/// `elem_size` are meaningful for arrays; both are 0 for scalars.
#[derive(Clone, Debug, Default)]
pub struct TypeNode {
    pub name: String,
    /// DIE offset of the underlying type; 0 means none.
    pub base: u64,
    pub members: Option<FxHashMap<u64, u64>>,
    pub elem_count: u32,
    pub elem_size: u32,
}

/// Flat offset-keyed map of every type DIE seen during a parse.
#[derive(Debug, Default)]
pub struct TypeGraph {
    nodes: FxHashMap<u64, TypeNode>,
}

impl TypeGraph {
    pub fn insert(&mut self, offset: u64, node: TypeNode) {
        self.nodes.insert(offset, node);
    }

    #[must_use]
    pub fn get(&self, offset: u64) -> Option<&TypeNode> {
        self.nodes.get(&offset)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Follow the base-type chain from `offset` to its terminal node.
    ///
    /// The chain crosses typedefs, pointers and arrays; it terminates at
    /// the first node whose base offset is absent from the graph (0 is
    /// never present). Returns `None` if the starting offset itself is
    /// unknown. A revisited offset means the input encodes a cycle.
    pub fn resolve_base(&self, offset: u64) -> Result<Option<&TypeNode>> {
        let Some(mut current) = self.nodes.get(&offset) else {
            return Ok(None);
        };

        let mut visited = FxHashSet::default();
        visited.insert(offset);
        while let Some(next) = self.nodes.get(&current.base) {
            if !visited.insert(current.base) {
                return Err(DwarfError::CyclicTypeReference {
                    offset: current.base,
                });
            }
            current = next;
        }
        Ok(Some(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, base: u64) -> TypeNode {
        TypeNode {
            name: name.to_owned(),
            base,
            ..TypeNode::default()
        }
    }

    #[test]
    fn test_resolve_base_follows_chain() {
        let mut graph = TypeGraph::default();
        graph.insert(0x10, node("MyAlias", 0x20)); // typedef
        graph.insert(0x20, node("", 0x30)); // pointer
        graph.insert(0x30, node("Mod_Struct", 0));

        let terminal = graph.resolve_base(0x10).unwrap().unwrap();
        assert_eq!(terminal.name, "Mod_Struct");

        // A dangling base reference makes the holder terminal.
        let mut graph = TypeGraph::default();
        graph.insert(0x10, node("Alias", 0x999));
        let terminal = graph.resolve_base(0x10).unwrap().unwrap();
        assert_eq!(terminal.name, "Alias");
    }

    #[test]
    fn test_resolve_base_unknown_offset() {
        let graph = TypeGraph::default();
        assert!(graph.resolve_base(0x10).unwrap().is_none());
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = TypeGraph::default();
        graph.insert(0x10, node("a", 0x20));
        graph.insert(0x20, node("b", 0x10));

        assert!(matches!(
            graph.resolve_base(0x10),
            Err(DwarfError::CyclicTypeReference { .. })
        ));
    }
}
