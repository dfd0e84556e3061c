//! Goal-directed solver.
//!
//! `Solve(goals, node)` builds a `State(node, goals)` and recursively
//! proves it reachable, memoizing per-state answers with the optimistic
//! "install true before recursing" trick so cyclic provenance (see
//! scenario S6 on [`Program`](crate::program::Program)) terminates instead
//! of deadlocking.

mod path_finder;

use crate::binding::BindingData;
use crate::config::EngineConfig;
use crate::ids::{BindingId, NodeId, VariableId};
use crate::metrics::EngineMetrics;
use crate::node::NodeData;
use crate::solver_log;
use crate::source_set::SourceSet;
use crate::variable::VariableData;
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) use path_finder::PathFinderCache;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct State {
    pub(crate) pos: NodeId,
    pub(crate) goals: SourceSet,
}

#[derive(Debug, Default)]
pub(crate) struct SolverCache {
    memo: FxHashMap<State, bool>,
    paths: PathFinderCache,
}

/// Borrowed view of the three graph arenas the solver needs to read.
/// Solving never mutates the graph, only the caches in [`SolverCache`].
pub(crate) struct Graph<'a, P> {
    pub(crate) nodes: &'a [NodeData],
    pub(crate) bindings: &'a [BindingData<P>],
    pub(crate) variables: &'a [VariableData<P>],
}

pub(crate) fn solve<P: Eq + std::hash::Hash + Clone, M: EngineMetrics>(
    graph: &Graph<'_, P>,
    cache: &mut SolverCache,
    metrics: &M,
    _config: &EngineConfig,
    goals: SourceSet,
    pos: NodeId,
) -> bool {
    let state = State { pos, goals };
    recall_or_find_solution(graph, cache, metrics, state)
}

fn recall_or_find_solution<P: Eq + std::hash::Hash + Clone, M: EngineMetrics>(
    graph: &Graph<'_, P>,
    cache: &mut SolverCache,
    metrics: &M,
    state: State,
) -> bool {
    if let Some(&answer) = cache.memo.get(&state) {
        metrics.record_solver_cache(true);
        solver_log!(format!("memo hit {:?} -> {answer}", state));
        return answer;
    }
    metrics.record_solver_cache(false);

    // Optimistically assume this state is solvable before recursing, so a
    // cyclic dependency between two equally hard subgoals doesn't deadlock
    // as unsolvable. The real answer overwrites this once computed.
    cache.memo.insert(state.clone(), true);
    let answer = find_solution(graph, cache, metrics, &state);
    solver_log!(format!("solved {:?} -> {answer}", state));
    cache.memo.insert(state, answer);
    answer
}

fn find_solution<P: Eq + std::hash::Hash + Clone, M: EngineMetrics>(
    graph: &Graph<'_, P>,
    cache: &mut SolverCache,
    metrics: &M,
    state: &State,
) -> bool {
    if state.goals.is_empty() {
        return true;
    }

    if goals_conflict(graph.bindings, &state.goals) {
        return false;
    }

    metrics.record_goals_per_find(state.goals.len());

    let blocked = blocked_frontier(graph, state);

    for goal in state.goals.iter() {
        let Some(binding) = graph.bindings.get(goal.index()) else {
            continue;
        };
        for origin in binding.origins() {
            let path = path_finder::find_node_backwards(
                graph.nodes,
                &mut cache.paths,
                state.pos,
                origin.where_(),
                &blocked,
            );
            if !path.reachable {
                continue;
            }

            for source_set in origin.source_sets() {
                let mut new_goals = state.goals.clone();
                for &cond_node in &path.conditions {
                    if let Some(cond_binding) = graph.nodes[cond_node.index()].condition() {
                        new_goals = new_goals.with(cond_binding);
                    }
                }
                let introduced_condition_goal = new_goals.len() > state.goals.len();
                let where_ = if introduced_condition_goal {
                    path.conditions[0]
                } else {
                    origin.where_()
                };

                let mut candidate_goals = new_goals;
                if where_ == origin.where_() {
                    candidate_goals = candidate_goals.without(goal).union(source_set);
                }

                let (reduced_goals, removed) = remove_finished_goals(graph.bindings, where_, &candidate_goals);
                let removed_plus_goal = removed.with(goal);
                if goals_conflict(graph.bindings, &removed_plus_goal) {
                    return false;
                }

                let new_state = State {
                    pos: where_,
                    goals: reduced_goals,
                };
                if recall_or_find_solution(graph, cache, metrics, new_state) {
                    return true;
                }
            }
        }
    }

    false
}

/// True iff two distinct goals in `goals` target the same variable - a
/// variable cannot simultaneously hold two different bindings.
fn goals_conflict<P>(bindings: &[BindingData<P>], goals: &SourceSet) -> bool {
    let mut seen: FxHashMap<VariableId, BindingId> = FxHashMap::default();
    for goal in goals.iter() {
        let Some(binding) = bindings.get(goal.index()) else {
            continue;
        };
        match seen.get(&binding.variable()) {
            Some(&existing) if existing != goal => return true,
            _ => {
                seen.insert(binding.variable(), goal);
            }
        }
    }
    false
}

/// Union of nodes where any goal's variable is assigned, excluding `pos`
/// itself (a concurrent assignment at the current node does not shadow the
/// goal we're trying to prove there).
fn blocked_frontier<P: Eq + std::hash::Hash + Clone>(
    graph: &Graph<'_, P>,
    state: &State,
) -> FxHashSet<NodeId> {
    let mut blocked = FxHashSet::default();
    for goal in state.goals.iter() {
        let Some(binding) = graph.bindings.get(goal.index()) else {
            continue;
        };
        let Some(variable) = graph.variables.get(binding.variable().index()) else {
            continue;
        };
        for node in variable.assignment_nodes() {
            if node != state.pos {
                blocked.insert(node);
            }
        }
    }
    blocked
}

/// Cascaded trivial-fulfillment: a goal whose origin at `pos` has `<= 1`
/// source set is discharged in place, its sources becoming new goals. A
/// `seen` set guards against reprocessing the same goal - both bounding the
/// loop and making it idempotent on cyclic provenance - and is also checked
/// before a discharged goal's own sources are re-queued, so a mutually
/// trivial cycle (A's only source is {B}, B's only source is {A}) fully
/// resolves to nothing outstanding instead of leaving one of them stranded
/// back in `current` as unprocessable.
fn remove_finished_goals<P>(
    bindings: &[BindingData<P>],
    pos: NodeId,
    goals: &SourceSet,
) -> (SourceSet, SourceSet) {
    let mut current: Vec<BindingId> = goals.iter().collect();
    let mut seen: FxHashSet<BindingId> = FxHashSet::default();
    let mut removed: Vec<BindingId> = Vec::new();

    loop {
        let trivial = current.iter().copied().find(|goal| {
            if seen.contains(goal) {
                return false;
            }
            matches!(
                bindings.get(goal.index()).and_then(|b| b.origin_at(pos)),
                Some(origin) if origin.source_sets().len() <= 1
            )
        });

        let Some(goal) = trivial else {
            break;
        };

        seen.insert(goal);
        removed.push(goal);
        current.retain(|g| *g != goal);

        if let Some(source_set) = bindings[goal.index()]
            .origin_at(pos)
            .and_then(|origin| origin.source_sets().first())
        {
            for member in source_set.iter() {
                if !seen.contains(&member) && !current.contains(&member) {
                    current.push(member);
                }
            }
        }
    }

    (SourceSet::new(current), SourceSet::new(removed))
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
