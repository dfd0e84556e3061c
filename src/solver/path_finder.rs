//! Backward path finder.
//!
//! Given `(start, finish, blocked)`, determines whether the CFG can be
//! walked backward from `start` to `finish` without entering a blocked
//! node, and returns the condition-bearing nodes that lie on *every* such
//! path, ordered along one concrete witness path. `start` and `finish` are
//! never themselves treated as blocked.

use crate::ids::NodeId;
use crate::node::NodeData;
use crate::path_log;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PathKey {
    start: NodeId,
    finish: NodeId,
    blocked: Vec<NodeId>,
}

impl PathKey {
    fn new(start: NodeId, finish: NodeId, blocked: &FxHashSet<NodeId>) -> Self {
        let mut blocked: Vec<NodeId> = blocked.iter().copied().collect();
        blocked.sort_unstable();
        PathKey {
            start,
            finish,
            blocked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct PathResult {
    pub(crate) reachable: bool,
    /// Condition-bearing nodes common to every backward path, in witness
    /// (start -> finish) order. Empty when `reachable` is false.
    pub(crate) conditions: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub(crate) struct PathFinderCache {
    solved: FxHashMap<PathKey, PathResult>,
}

pub(crate) fn find_node_backwards(
    nodes: &[NodeData],
    cache: &mut PathFinderCache,
    start: NodeId,
    finish: NodeId,
    blocked: &FxHashSet<NodeId>,
) -> PathResult {
    let key = PathKey::new(start, finish, blocked);
    if let Some(cached) = cache.solved.get(&key) {
        path_log!(format!("path cache hit {start}->{finish}"));
        return cached.clone();
    }

    let result = if start == finish {
        let conditions = if nodes[start.index()].condition().is_some() {
            vec![start]
        } else {
            Vec::new()
        };
        PathResult {
            reachable: true,
            conditions,
        }
    } else if !has_backward_path(nodes, start, finish, blocked) {
        PathResult::default()
    } else {
        let (reachable, conditions) = find_node_backwards_impl(nodes, start, finish, blocked);
        PathResult {
            reachable,
            conditions,
        }
    };

    path_log!(format!(
        "path {start}->{finish}: reachable={}, conditions={:?}",
        result.reachable, result.conditions
    ));
    cache.solved.insert(key, result.clone());
    result
}

/// Cheap DFS probe ignoring conditions - used to short-circuit the more
/// expensive witness search when no backward path exists at all.
fn has_backward_path(
    nodes: &[NodeData],
    start: NodeId,
    finish: NodeId,
    blocked: &FxHashSet<NodeId>,
) -> bool {
    let mut visited = FxHashSet::default();
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(current) = stack.pop() {
        if current == finish {
            return true;
        }
        for pred in nodes[current.index()].incoming() {
            if pred != finish && blocked.contains(&pred) {
                continue;
            }
            if visited.insert(pred) {
                stack.push(pred);
            }
        }
    }

    false
}

fn sorted_incoming(nodes: &[NodeData], node: NodeId) -> Vec<NodeId> {
    let mut preds: Vec<NodeId> = nodes[node.index()].incoming().collect();
    preds.sort_unstable();
    preds
}

/// Iterative backward DFS enumerating every simple path (no repeated node)
/// from `start` to `finish`, intersecting the condition-bearing nodes seen
/// on each discovered path and remembering the first complete path as the
/// ordered witness. Short-circuits once the running intersection is empty,
/// since it can only shrink from there.
fn find_node_backwards_impl(
    nodes: &[NodeData],
    start: NodeId,
    finish: NodeId,
    blocked: &FxHashSet<NodeId>,
) -> (bool, Vec<NodeId>) {
    let mut path = vec![start];
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    seen.insert(start);
    let mut iter_stack: Vec<std::vec::IntoIter<NodeId>> =
        vec![sorted_incoming(nodes, start).into_iter()];

    let mut solution_set: Option<FxHashSet<NodeId>> = None;
    let mut one_path: Option<Vec<NodeId>> = None;

    while let Some(&current) = path.last() {
        if current == finish {
            let conditions_here: FxHashSet<NodeId> = path
                .iter()
                .copied()
                .filter(|n| nodes[n.index()].condition().is_some())
                .collect();
            solution_set = Some(match solution_set {
                None => conditions_here,
                Some(prev) => prev.intersection(&conditions_here).copied().collect(),
            });
            if one_path.is_none() {
                one_path = Some(path.clone());
            }

            seen.remove(&current);
            path.pop();
            iter_stack.pop();

            if solution_set.as_ref().is_some_and(|s| s.is_empty()) {
                break;
            }
            continue;
        }

        if solution_set.as_ref().is_some_and(|s| s.is_empty()) {
            break;
        }

        match iter_stack.last_mut().unwrap().next() {
            Some(next) => {
                if next != finish && blocked.contains(&next) {
                    continue;
                }
                if seen.contains(&next) {
                    continue;
                }
                seen.insert(next);
                path.push(next);
                iter_stack.push(sorted_incoming(nodes, next).into_iter());
            }
            None => {
                seen.remove(&current);
                path.pop();
                iter_stack.pop();
            }
        }
    }

    match (solution_set, one_path) {
        (Some(set), Some(witness)) => {
            let ordered = witness
                .into_iter()
                .filter(|n| nodes[n.index()].condition().is_some() && set.contains(n))
                .collect();
            (true, ordered)
        }
        _ => (false, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeData;

    fn chain(len: usize) -> Vec<NodeData> {
        let mut nodes = Vec::new();
        for i in 0..len {
            nodes.push(NodeData::new(NodeId::new(i), None, None));
        }
        for i in 1..len {
            let (prev, id) = (NodeId::new(i - 1), NodeId::new(i));
            nodes[i].incoming.insert(prev);
            nodes[i - 1].outgoing.insert(id);
        }
        nodes
    }

    #[test]
    fn start_equals_finish_is_trivially_reachable() {
        let nodes = chain(3);
        let mut cache = PathFinderCache::default();
        let result = find_node_backwards(
            &nodes,
            &mut cache,
            NodeId::new(1),
            NodeId::new(1),
            &FxHashSet::default(),
        );
        assert!(result.reachable);
        assert!(result.conditions.is_empty());
    }

    #[test]
    fn linear_chain_is_reachable_backwards() {
        let nodes = chain(3);
        let mut cache = PathFinderCache::default();
        let result = find_node_backwards(
            &nodes,
            &mut cache,
            NodeId::new(2),
            NodeId::new(0),
            &FxHashSet::default(),
        );
        assert!(result.reachable);
    }

    #[test]
    fn blocked_node_on_only_path_makes_it_unreachable() {
        let nodes = chain(3);
        let mut cache = PathFinderCache::default();
        let mut blocked = FxHashSet::default();
        blocked.insert(NodeId::new(1));
        let result = find_node_backwards(&nodes, &mut cache, NodeId::new(2), NodeId::new(0), &blocked);
        assert!(!result.reachable);
    }

    #[test]
    fn cache_is_stable_across_repeated_queries() {
        let nodes = chain(4);
        let mut cache = PathFinderCache::default();
        let first = find_node_backwards(
            &nodes,
            &mut cache,
            NodeId::new(3),
            NodeId::new(0),
            &FxHashSet::default(),
        );
        let second = find_node_backwards(
            &nodes,
            &mut cache,
            NodeId::new(3),
            NodeId::new(0),
            &FxHashSet::default(),
        );
        assert_eq!(first, second);
    }
}
