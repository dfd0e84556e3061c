//! ASCII-tree rendering of a CFG, for debugging and test failure output.
//!
//! Grounded on `CFGNode.AsciiTree`/`CFGNode.Label`/`CFGNode.__repr__` in the
//! original engine: a depth-first walk from a root printing `+--` branches,
//! with already-visited nodes rendered as a bare back-reference line instead
//! of being expanded again, so a cyclic CFG still produces a finite tree.

use crate::ids::NodeId;
use crate::node::NodeData;
use rustc_hash::FxHashSet;
use std::fmt::Write as _;

/// Renders the CFG reachable from `root` as an indented ASCII tree.
pub(crate) fn ascii_tree(nodes: &[NodeData], root: NodeId) -> String {
    let mut out = String::new();
    let mut visited = FxHashSet::default();
    write_node(nodes, root, "", true, &mut visited, &mut out);
    out
}

fn write_node(
    nodes: &[NodeData],
    node: NodeId,
    prefix: &str,
    is_last: bool,
    visited: &mut FxHashSet<NodeId>,
    out: &mut String,
) {
    let branch = if is_last { "`--" } else { "|--" };
    let data = &nodes[node.index()];

    if !visited.insert(node) {
        let _ = writeln!(out, "{prefix}{branch} {} (seen)", data.label());
        return;
    }

    let _ = writeln!(out, "{prefix}{branch} {}", data.label());

    let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "|   " });
    let children: Vec<NodeId> = {
        let mut c: Vec<NodeId> = data.outgoing().collect();
        c.sort_unstable();
        c
    };

    for (i, &child) in children.iter().enumerate() {
        write_node(nodes, child, &child_prefix, i + 1 == children.len(), visited, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeId;

    fn chain(len: usize) -> Vec<NodeData> {
        let mut nodes = Vec::new();
        for i in 0..len {
            nodes.push(NodeData::new(NodeId::new(i), Some(format!("n{i}")), None));
        }
        for i in 1..len {
            let (prev, id) = (NodeId::new(i - 1), NodeId::new(i));
            nodes[i].incoming.insert(prev);
            nodes[i - 1].outgoing.insert(id);
        }
        nodes
    }

    #[test]
    fn renders_a_linear_chain_top_to_bottom() {
        let nodes = chain(3);
        let tree = ascii_tree(&nodes, NodeId::new(0));
        assert!(tree.contains("n0"));
        assert!(tree.contains("n1"));
        assert!(tree.contains("n2"));
    }

    #[test]
    fn marks_a_revisited_node_instead_of_recursing_forever() {
        let mut nodes = chain(3);
        // Back edge: 2 -> 0.
        nodes[2].outgoing.insert(NodeId::new(0));
        nodes[0].incoming.insert(NodeId::new(2));
        let tree = ascii_tree(&nodes, NodeId::new(0));
        assert!(tree.contains("(seen)"));
    }
}
