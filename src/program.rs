//! [`Program`]: the root registry.
//!
//! Owns every node, variable and binding created during one analysis,
//! assigns their monotonic ids, and lazily builds/discards the solver.
//! There is exactly one `Program` per analysis; nothing it owns is ever
//! destroyed before it is, which is what lets bindings reference each
//! other cyclically through plain numeric handles instead of reference
//! counting (see the "Cyclic ownership" design note).

use crate::binding::BindingData;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph_log;
use crate::ids::{BindingId, NodeId, VariableId};
use crate::metrics::{EngineMetrics, NoopMetrics};
use crate::node::NodeData;
use crate::solver::{self, Graph, SolverCache};
use crate::source_set::SourceSet;
use crate::variable::{ChangeListener, ListenerId, VariableData};
use rustc_hash::FxHashSet;
use std::hash::Hash;

pub struct Program<P, M = NoopMetrics> {
    config: EngineConfig,
    metrics: M,
    nodes: Vec<NodeData>,
    variables: Vec<VariableData<P>>,
    bindings: Vec<BindingData<P>>,
    default_data: P,
    solver_cache: Option<SolverCache>,
}

impl<P: Eq + Hash + Clone> Program<P, NoopMetrics> {
    /// Creates a new program with the given sentinel payload and default
    /// tunables, discarding metrics (see [`Program::new_with`] to wire a
    /// real sink).
    pub fn new(default_data: P) -> Self {
        Self::new_with(default_data, EngineConfig::default(), NoopMetrics)
    }
}

impl<P: Eq + Hash + Clone, M: EngineMetrics> Program<P, M> {
    pub fn new_with(default_data: P, config: EngineConfig, metrics: M) -> Self {
        Program {
            config,
            metrics,
            nodes: Vec::new(),
            variables: Vec::new(),
            bindings: Vec::new(),
            default_data,
            solver_cache: None,
        }
    }

    pub fn default_data(&self) -> &P {
        &self.default_data
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    // ---------------------------------------------------------------
    // 4.1 Program
    // ---------------------------------------------------------------

    pub fn new_cfg_node(&mut self, name: Option<String>, condition: Option<BindingId>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData::new(id, name, condition));
        self.invalidate_solver();
        graph_log!(format!("new node {id}"));
        id
    }

    pub fn connect_new(
        &mut self,
        from: NodeId,
        name: Option<String>,
        condition: Option<BindingId>,
    ) -> NodeId {
        let to = self.new_cfg_node(name, condition);
        self.connect_to(from, to);
        to
    }

    pub fn new_variable(&mut self) -> VariableId {
        let id = VariableId::new(self.variables.len());
        self.variables.push(VariableData::new(id));
        id
    }

    /// `NewVariable(bindings, source_set, where)`: each payload becomes a
    /// binding sharing the single given origin.
    pub fn new_variable_with_bindings(
        &mut self,
        payloads: impl IntoIterator<Item = P>,
        source_set: SourceSet,
        where_: NodeId,
    ) -> VariableId {
        let variable = self.new_variable();
        for payload in payloads {
            self.add_binding(variable, payload, Some((source_set.clone(), where_)));
        }
        variable
    }

    pub fn merge_variables(&mut self, node: NodeId, vars: &[VariableId]) -> VariableId {
        match vars {
            [] => self.new_variable(),
            [only] => *only,
            _ if vars.iter().all(|v| *v == vars[0]) => vars[0],
            _ => {
                let merged = self.new_variable();
                for &var in vars {
                    self.paste_variable(merged, var, node);
                }
                merged
            }
        }
    }

    pub fn create_solver(&mut self) {
        if self.solver_cache.is_none() {
            self.solver_cache = Some(SolverCache::default());
        }
    }

    pub fn invalidate_solver(&mut self) {
        self.solver_cache = None;
    }

    pub fn has_solver(&self) -> bool {
        self.solver_cache.is_some()
    }

    // ---------------------------------------------------------------
    // 4.2 CFG node
    // ---------------------------------------------------------------

    pub fn node(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.index()]
    }

    /// Adds a directed edge and propagates `reachable_subset` to `to` in a
    /// single hop. See the "known limitation" in §4.2: if edges are added
    /// out of topological order, nodes beyond `to` are not retroactively
    /// updated (DESIGN.md records this as an accepted open question).
    pub fn connect_to(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from.index()].outgoing.insert(to);
        self.nodes[to.index()].incoming.insert(from);

        let ancestors = self.nodes[from.index()].reachable_subset.clone();
        self.nodes[to.index()].reachable_subset.extend(ancestors);

        self.invalidate_solver();
        graph_log!(format!("connect {from} -> {to}"));
    }

    /// Cheap over-approximation: strikes off goal bindings found while
    /// walking backward from `node`, ignoring conditions entirely.
    pub fn can_have_combination(&self, node: NodeId, bindings: &[BindingId]) -> bool {
        let mut remaining: FxHashSet<BindingId> = bindings.iter().copied().collect();
        if remaining.is_empty() {
            return true;
        }

        let mut visited = FxHashSet::default();
        let mut frontier = vec![node];
        while let Some(current) = frontier.pop() {
            if !visited.insert(current) {
                continue;
            }
            for binding in self.nodes[current.index()].assigned_bindings() {
                remaining.remove(&binding);
            }
            if remaining.is_empty() {
                return true;
            }
            for pred in self.nodes[current.index()].incoming() {
                frontier.push(pred);
            }
        }
        remaining.is_empty()
    }

    /// Precise answer via the solver: each binding individually first (fast
    /// rejection), then the full combination.
    pub fn has_combination(&mut self, node: NodeId, bindings: &[BindingId]) -> bool {
        for &binding in bindings {
            if !self.is_visible(binding, node) {
                return false;
            }
        }
        let goals = SourceSet::new(bindings.iter().copied());
        self.solve(goals, node)
    }

    pub fn register_binding(&mut self, node: NodeId, binding: BindingId) {
        self.nodes[node.index()].bindings.insert(binding);
    }

    // ---------------------------------------------------------------
    // 4.3 Variable
    // ---------------------------------------------------------------

    pub fn variable(&self, variable: VariableId) -> &VariableData<P> {
        &self.variables[variable.index()]
    }

    pub fn register_change_listener(
        &mut self,
        variable: VariableId,
        listener: ChangeListener,
    ) -> ListenerId {
        self.variables[variable.index()].register_change_listener(listener)
    }

    pub fn unregister_change_listener(&mut self, variable: VariableId, id: ListenerId) {
        self.variables[variable.index()].unregister_change_listener(id);
    }

    /// Idempotent on payload identity; enforces the `MAX_VAR_SIZE` cap by
    /// redirecting overflow payloads onto `default_data`.
    pub fn add_binding(
        &mut self,
        variable: VariableId,
        payload: P,
        origin: Option<(SourceSet, NodeId)>,
    ) -> BindingId {
        let binding = self.get_or_create_binding(variable, payload);
        if let Some((source_set, where_)) = origin {
            self.add_origin(binding, where_, source_set);
        }
        binding
    }

    fn get_or_create_binding(&mut self, variable: VariableId, payload: P) -> BindingId {
        if let Some(existing) = self.variables[variable.index()].binding_for_payload(&payload) {
            return existing;
        }

        let at_capacity = self.variables[variable.index()].len() >= self.config.max_var_size - 1;
        let payload = if at_capacity && payload != self.default_data {
            self.default_data.clone()
        } else {
            payload
        };

        if let Some(existing) = self.variables[variable.index()].binding_for_payload(&payload) {
            return existing;
        }

        let id = BindingId::new(self.bindings.len());
        self.bindings.push(BindingData::new(id, variable, payload.clone()));
        self.variables[variable.index()].record_new_binding(payload, id);
        self.variables[variable.index()].notify_listeners(id);
        self.metrics
            .record_variable_size(self.variables[variable.index()].len());
        self.invalidate_solver();
        graph_log!(format!("new binding {id} on variable {variable}"));
        id
    }

    /// For each binding in `source`: add an equivalent binding here, copying
    /// its source sets verbatim when every one of its origins already sits
    /// at `where_` (shortens the solver's origin chain), otherwise pointing
    /// a fresh single-element source set at the source binding.
    pub fn paste_variable(&mut self, dest: VariableId, source: VariableId, where_: NodeId) {
        let source_bindings = self.variables[source.index()].bindings().to_vec();
        for binding in source_bindings {
            let payload = self.bindings[binding.index()].payload().clone();
            let origins = self.bindings[binding.index()].origins().to_vec();
            let dest_binding = self.get_or_create_binding(dest, payload);

            let all_here = !origins.is_empty() && origins.iter().all(|o| o.where_() == where_);
            if all_here {
                for origin in &origins {
                    for source_set in origin.source_sets() {
                        self.add_origin(dest_binding, where_, source_set.clone());
                    }
                }
            } else {
                self.add_origin(dest_binding, where_, SourceSet::singleton(binding));
            }
        }
    }

    /// Copy semantics: a new variable with one origin per binding pointing
    /// back at the old binding.
    pub fn assign_to_new_variable(&mut self, source: VariableId, where_: NodeId) -> VariableId {
        let dest = self.new_variable();
        let source_bindings = self.variables[source.index()].bindings().to_vec();
        for binding in source_bindings {
            let payload = self.bindings[binding.index()].payload().clone();
            let dest_binding = self.get_or_create_binding(dest, payload);
            self.add_origin(dest_binding, where_, SourceSet::singleton(binding));
        }
        dest
    }

    /// `Binding.AssignToNewVariable`: a new single-binding variable with
    /// `binding` as its only source.
    pub fn binding_assign_to_new_variable(&mut self, binding: BindingId, where_: NodeId) -> VariableId {
        let variable = self.new_variable();
        let payload = self.bindings[binding.index()].payload().clone();
        let dest_binding = self.get_or_create_binding(variable, payload);
        self.add_origin(dest_binding, where_, SourceSet::singleton(binding));
        variable
    }

    /// CFG-only visibility filter (no origin chasing): see the fast path and
    /// shadowing rule in §4.3.
    pub fn bindings(&self, variable: VariableId, viewpoint: Option<NodeId>) -> FxHashSet<BindingId> {
        let var = &self.variables[variable.index()];
        let all: FxHashSet<BindingId> = var.bindings().iter().copied().collect();

        let Some(viewpoint) = viewpoint else {
            return all;
        };

        let assignment_nodes: Vec<NodeId> = var.assignment_nodes().collect();
        let single_site = var.len() <= 1 || assignment_nodes.len() <= 1;
        if single_site
            && assignment_nodes
                .iter()
                .any(|n| self.nodes[viewpoint.index()].reachable_subset().contains(n))
        {
            return all;
        }

        let mut result = FxHashSet::default();
        let mut visited = FxHashSet::default();
        let mut frontier = vec![viewpoint];
        while let Some(current) = frontier.pop() {
            if result.len() == all.len() {
                break;
            }
            if !visited.insert(current) {
                continue;
            }
            let at_node: Vec<BindingId> = var.bindings_at(current).collect();
            if !at_node.is_empty() {
                // A later assignment on this path shadows earlier ones: do
                // not expand further through this node.
                result.extend(at_node);
            } else {
                for pred in self.nodes[current.index()].incoming() {
                    frontier.push(pred);
                }
            }
        }
        result
    }

    pub fn data(&self, variable: VariableId, viewpoint: Option<NodeId>) -> Vec<&P> {
        self.bindings(variable, viewpoint)
            .into_iter()
            .map(|b| self.bindings[b.index()].payload())
            .collect()
    }

    /// Like [`Self::bindings`] but precise: keeps only bindings for which
    /// [`Self::is_visible`] holds.
    pub fn filter(&mut self, variable: VariableId, viewpoint: Option<NodeId>) -> FxHashSet<BindingId> {
        let candidates = self.bindings(variable, viewpoint);
        match viewpoint {
            None => candidates,
            Some(v) => candidates
                .into_iter()
                .filter(|&b| self.is_visible(b, v))
                .collect(),
        }
    }

    pub fn filtered_data(&mut self, variable: VariableId, viewpoint: Option<NodeId>) -> Vec<&P> {
        let mut ids: Vec<BindingId> = self.filter(variable, viewpoint).into_iter().collect();
        ids.sort_unstable();
        ids.into_iter().map(|b| self.bindings[b.index()].payload()).collect()
    }

    // ---------------------------------------------------------------
    // 4.4 Binding
    // ---------------------------------------------------------------

    pub fn binding(&self, binding: BindingId) -> &BindingData<P> {
        &self.bindings[binding.index()]
    }

    /// Finds-or-creates the origin of `binding` at `where_` and adds
    /// `source_set` as an alternative. On first creation, registers the
    /// binding on the node and on the variable's per-node reverse index.
    pub fn add_origin(&mut self, binding: BindingId, where_: NodeId, source_set: SourceSet) {
        let is_new = self.bindings[binding.index()].add_origin(where_, source_set);
        if is_new {
            let variable = self.bindings[binding.index()].variable();
            self.nodes[where_.index()].bindings.insert(binding);
            self.variables[variable.index()].record_node_assignment(where_, binding);
        }
        self.invalidate_solver();
        graph_log!(format!("origin for {binding} at {where_}"));
    }

    pub fn is_visible(&mut self, binding: BindingId, viewpoint: NodeId) -> bool {
        self.solve(SourceSet::singleton(binding), viewpoint)
    }

    /// Transitive "does `other` appear anywhere in my provenance" check,
    /// with an explicit visited set - the original's recursion has no cycle
    /// guard and would loop forever on self-supporting bindings (S6).
    pub fn has_source(&self, binding: BindingId, other: BindingId) -> bool {
        let mut visited = FxHashSet::default();
        self.has_source_rec(binding, other, &mut visited)
    }

    fn has_source_rec(&self, current: BindingId, target: BindingId, visited: &mut FxHashSet<BindingId>) -> bool {
        if !visited.insert(current) {
            return false;
        }
        for origin in self.bindings[current.index()].origins() {
            for source_set in origin.source_sets() {
                if source_set.contains(target) {
                    return true;
                }
                for member in source_set.iter() {
                    if self.has_source_rec(member, target, visited) {
                        return true;
                    }
                }
            }
        }
        false
    }

    // ---------------------------------------------------------------
    // Solver entry point
    // ---------------------------------------------------------------

    fn solve(&mut self, goals: SourceSet, node: NodeId) -> bool {
        self.create_solver();
        let graph = Graph {
            nodes: &self.nodes,
            bindings: &self.bindings,
            variables: &self.variables,
        };
        let cache = self.solver_cache.as_mut().expect("create_solver just ran");
        solver::solve(&graph, cache, &self.metrics, &self.config, goals, node)
    }

    // ---------------------------------------------------------------
    // Structural invariant checks (§3's Invariants column, exercised by
    // tests rather than on any hot path).
    // ---------------------------------------------------------------

    pub fn ascii_tree(&self, root: NodeId) -> String {
        crate::debug::ascii_tree(&self.nodes, root)
    }

    pub fn check_invariants(&self) -> EngineResult<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id().index() != index {
                return Err(EngineError::UnknownNode(node.id()));
            }
            if let Some(condition) = node.condition() {
                if self.bindings.get(condition.index()).is_none() {
                    return Err(EngineError::UnknownBinding(condition));
                }
            }
            for pred in node.incoming() {
                if !self.nodes[pred.index()].outgoing.contains(&node.id()) {
                    return Err(EngineError::UnknownNode(pred));
                }
            }
        }

        for (index, variable) in self.variables.iter().enumerate() {
            if variable.id().index() != index {
                return Err(EngineError::UnknownVariable(variable.id()));
            }
            for &binding in variable.bindings() {
                match self.bindings.get(binding.index()) {
                    Some(data) if data.variable() == variable.id() => {}
                    _ => return Err(EngineError::UnknownBinding(binding)),
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "program/tests/mod.rs"]
mod tests;
