//! Variable storage: a bag of bindings for one logical storage slot.
//!
//! Like nodes and bindings, variables are arena-owned by
//! [`Program`](crate::program::Program); the actual `AddBinding` /
//! `PasteVariable` / `Bindings` algorithms live there since they need
//! simultaneous access to the node and binding arenas. This module only
//! holds the per-variable bookkeeping itself.

use crate::ids::{BindingId, NodeId, VariableId};
use rustc_hash::{FxHashMap, FxHashSet};

/// A callback invoked after a truly new binding is appended to a variable.
pub type ChangeListener = Box<dyn FnMut(BindingId)>;

/// Token returned by `register_change_listener`, used to unregister it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

pub struct VariableData<P> {
    pub(crate) id: VariableId,
    /// Payload-first-seen order.
    pub(crate) bindings: Vec<BindingId>,
    pub(crate) index_by_payload: FxHashMap<P, BindingId>,
    /// node -> subset of `bindings` assigned at that node.
    pub(crate) node_index: FxHashMap<NodeId, FxHashSet<BindingId>>,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener_id: usize,
}

impl<P: Eq + std::hash::Hash + Clone> VariableData<P> {
    pub(crate) fn new(id: VariableId) -> Self {
        VariableData {
            id,
            bindings: Vec::new(),
            index_by_payload: FxHashMap::default(),
            node_index: FxHashMap::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn bindings(&self) -> &[BindingId] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn binding_for_payload(&self, payload: &P) -> Option<BindingId> {
        self.index_by_payload.get(payload).copied()
    }

    pub fn bindings_at(&self, node: NodeId) -> impl Iterator<Item = BindingId> + '_ {
        self.node_index
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn assignment_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_index.keys().copied()
    }

    pub(crate) fn record_new_binding(&mut self, payload: P, binding: BindingId) {
        self.index_by_payload.insert(payload, binding);
        self.bindings.push(binding);
    }

    pub(crate) fn record_node_assignment(&mut self, node: NodeId, binding: BindingId) {
        self.node_index.entry(node).or_default().insert(binding);
    }

    pub fn register_change_listener(&mut self, listener: ChangeListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unregister_change_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    pub(crate) fn notify_listeners(&mut self, binding: BindingId) {
        for (_, listener) in &mut self.listeners {
            listener(binding);
        }
    }
}
