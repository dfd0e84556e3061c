//! CFG node storage.
//!
//! Nodes are arena-owned by [`Program`](crate::program::Program) and
//! referenced everywhere else by [`NodeId`]. This mirrors the surrounding
//! codebase's `ControlFlowGraph`, which keeps blocks in a map and exposes
//! operations as graph methods taking a `BlockId` rather than methods on a
//! block object.

use crate::ids::{BindingId, NodeId};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) id: NodeId,
    pub(crate) name: Option<String>,
    pub(crate) incoming: FxHashSet<NodeId>,
    pub(crate) outgoing: FxHashSet<NodeId>,
    /// Bindings assigned at this node (the "RegisterBinding" set).
    pub(crate) bindings: FxHashSet<BindingId>,
    /// Ancestors of this node, including itself. See `Program::connect_to`
    /// for the single-hop propagation rule and its known limitation.
    pub(crate) reachable_subset: FxHashSet<NodeId>,
    /// A binding of some other variable that guards this node, if any.
    pub(crate) condition: Option<BindingId>,
}

impl NodeData {
    pub(crate) fn new(id: NodeId, name: Option<String>, condition: Option<BindingId>) -> Self {
        let mut reachable_subset = FxHashSet::default();
        reachable_subset.insert(id);
        NodeData {
            id,
            name,
            incoming: FxHashSet::default(),
            outgoing: FxHashSet::default(),
            bindings: FxHashSet::default(),
            reachable_subset,
            condition,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn condition(&self) -> Option<BindingId> {
        self.condition
    }

    pub fn incoming(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming.iter().copied()
    }

    pub fn outgoing(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing.iter().copied()
    }

    pub fn assigned_bindings(&self) -> impl Iterator<Item = BindingId> + '_ {
        self.bindings.iter().copied()
    }

    pub fn reachable_subset(&self) -> &FxHashSet<NodeId> {
        &self.reachable_subset
    }

    pub fn is_ancestor_of(&self, other: &NodeData) -> bool {
        other.reachable_subset.contains(&self.id)
    }

    /// A human-readable label: the explicit name if one was given, else the
    /// numeric id. Used by `label()` / the ASCII tree debug renderer.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({})", self.id),
            None => self.id.to_string(),
        }
    }
}
