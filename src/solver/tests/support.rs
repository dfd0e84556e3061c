//! Shared fixture builder for solver tests: a tiny standalone graph built
//! directly from the arena types, bypassing `Program` so each test can wire
//! up exactly the origins/source-sets it needs.

use crate::binding::BindingData;
use crate::ids::{BindingId, NodeId, VariableId};
use crate::node::NodeData;
use crate::source_set::SourceSet;
use crate::variable::VariableData;

#[derive(Default)]
pub(super) struct Fixture {
    pub(super) nodes: Vec<NodeData>,
    pub(super) bindings: Vec<BindingData<&'static str>>,
    pub(super) variables: Vec<VariableData<&'static str>>,
}

impl Fixture {
    pub(super) fn node(&mut self, name: &'static str) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData::new(id, Some(name.to_string()), None));
        id
    }

    pub(super) fn conditional_node(&mut self, name: &'static str, condition: BindingId) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData::new(id, Some(name.to_string()), Some(condition)));
        id
    }

    pub(super) fn edge(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from.index()].outgoing.insert(to);
        self.nodes[to.index()].incoming.insert(from);
    }

    pub(super) fn variable(&mut self) -> VariableId {
        let id = VariableId::new(self.variables.len());
        self.variables.push(VariableData::new(id));
        id
    }

    /// Creates a binding with a single origin at `where_` sourced from
    /// `sources`, registering it on the node and variable indexes the same
    /// way `Program::add_binding`/`add_origin` would.
    pub(super) fn binding(
        &mut self,
        variable: VariableId,
        payload: &'static str,
        where_: NodeId,
        sources: &[BindingId],
    ) -> BindingId {
        let id = BindingId::new(self.bindings.len());
        let mut data = BindingData::new(id, variable, payload);
        data.add_origin(where_, SourceSet::new(sources.iter().copied()));
        self.bindings.push(data);
        self.variables[variable.index()].record_new_binding(payload, id);
        self.variables[variable.index()].record_node_assignment(where_, id);
        self.nodes[where_.index()].bindings.insert(id);
        id
    }

    pub(super) fn graph(&self) -> super::super::Graph<'_, &'static str> {
        super::super::Graph {
            nodes: &self.nodes,
            bindings: &self.bindings,
            variables: &self.variables,
        }
    }
}
