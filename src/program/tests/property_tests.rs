//! Property-style coverage for solver soundness over randomly generated
//! small linear CFGs: if any single goal is individually unreachable at a
//! node, the full goal set can never be reachable there either.

use crate::source_set::SourceSet;
use crate::Program;
use proptest::prelude::*;

proptest! {
    #[test]
    fn solving_a_goal_set_is_no_more_permissive_than_solving_each_goal_alone(
        (node_count, target_index, assignment_offsets) in (2usize..6).prop_flat_map(|node_count| {
            (
                Just(node_count),
                0..node_count,
                proptest::collection::vec(0..node_count, 1..5),
            )
        })
    ) {
        let mut program = Program::new("default");
        let mut nodes = Vec::with_capacity(node_count);
        let first = program.new_cfg_node(None, None);
        nodes.push(first);
        for _ in 1..node_count {
            let next = program.connect_new(*nodes.last().unwrap(), None, None);
            nodes.push(next);
        }
        let target = nodes[target_index];

        let mut goals = Vec::new();
        for &offset in &assignment_offsets {
            let var = program.new_variable();
            let binding = program.add_binding(var, "x", Some((SourceSet::empty(), nodes[offset])));
            goals.push(binding);
        }

        let any_individually_unreachable = goals.iter().any(|&b| !program.is_visible(b, target));
        if any_individually_unreachable {
            prop_assert!(!program.has_combination(target, &goals));
        }
    }
}
