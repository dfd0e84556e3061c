//! Binding and Origin storage.
//!
//! A binding is the assertion "variable V carries abstract value D". An
//! origin attaches one binding to one CFG node and records the alternative
//! source sets that could have produced it there - `AddSourceSet` freezes
//! each alternative as it's added.

use crate::ids::{BindingId, NodeId, VariableId};
use crate::source_set::SourceSet;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct Origin {
    where_: NodeId,
    source_sets: Vec<SourceSet>,
}

impl Origin {
    fn new(where_: NodeId) -> Self {
        Origin {
            where_,
            source_sets: Vec::new(),
        }
    }

    pub fn where_(&self) -> NodeId {
        self.where_
    }

    pub fn source_sets(&self) -> &[SourceSet] {
        &self.source_sets
    }

    fn add_source_set(&mut self, source_set: SourceSet) {
        if !self.source_sets.contains(&source_set) {
            self.source_sets.push(source_set);
        }
    }
}

#[derive(Debug, Clone)]
pub struct BindingData<P> {
    pub(crate) id: BindingId,
    pub(crate) variable: VariableId,
    pub(crate) payload: P,
    origins: Vec<Origin>,
    origin_index: FxHashMap<NodeId, usize>,
}

impl<P> BindingData<P> {
    pub(crate) fn new(id: BindingId, variable: VariableId, payload: P) -> Self {
        BindingData {
            id,
            variable,
            payload,
            origins: Vec::new(),
            origin_index: FxHashMap::default(),
        }
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn variable(&self) -> VariableId {
        self.variable
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn origins(&self) -> &[Origin] {
        &self.origins
    }

    pub fn origin_at(&self, node: NodeId) -> Option<&Origin> {
        self.origin_index.get(&node).map(|&i| &self.origins[i])
    }

    /// Finds-or-creates the origin at `where_` and adds `source_set` to its
    /// alternatives. Returns `true` if this was the first origin ever
    /// created at that node for this binding (callers use this to decide
    /// whether to register the binding on the node/variable reverse index).
    pub(crate) fn add_origin(&mut self, where_: NodeId, source_set: SourceSet) -> bool {
        if let Some(&index) = self.origin_index.get(&where_) {
            self.origins[index].add_source_set(source_set);
            false
        } else {
            let mut origin = Origin::new(where_);
            origin.add_source_set(source_set);
            self.origin_index.insert(where_, self.origins.len());
            self.origins.push(origin);
            true
        }
    }
}
