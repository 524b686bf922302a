//! Fixed-point resolution driver.
//!
//! Each pass calls `resolve_step` on every slot of every node. The driver
//! stops after the first pass that changes nothing. Slots only ever rise in
//! the lattice and each can rise at most twice, so a pass limit of
//! `2 * slots + 1` is never reached by a well-formed graph.

use serde::Serialize;
use tracing::{info, trace};

use crate::axis::AxisSet;
use crate::error::ResolveError;
use crate::graph::CapabilityGraph;

/// Knobs for one resolution run.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Stop with [`ResolveError::NotConverged`] after this many passes.
    /// Defaults to the slot bound described in the module docs.
    pub max_passes: Option<usize>,
}

/// Outcome of a converged run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    /// Full passes executed, including the final pass with no changes.
    pub passes: usize,
    /// Total slot changes across all passes.
    pub changes: usize,
}

/// Upper bound on passes for `graph` over `axes`.
pub fn pass_bound(graph: &CapabilityGraph, axes: &AxisSet) -> usize {
    let slots: usize = graph
        .nodes()
        .filter_map(|(_, node)| node.state())
        .map(|state| state.slots(axes).len())
        .sum();
    2 * slots + 1
}

/// Run one full pass. Returns the number of slots that changed.
pub fn resolve_pass(graph: &mut CapabilityGraph, axes: &AxisSet) -> usize {
    let ids: Vec<_> = graph.node_ids().collect();
    ids.into_iter().map(|id| graph.resolve_node(id, axes)).sum()
}

/// Resolve `graph` to its fixed point with default options.
pub fn resolve(graph: &mut CapabilityGraph, axes: &AxisSet) -> Result<ResolveReport, ResolveError> {
    resolve_with(graph, axes, &ResolveOptions::default())
}

/// Resolve `graph` to its fixed point.
///
/// The graph is checked for acyclicity before the first pass.
pub fn resolve_with(
    graph: &mut CapabilityGraph,
    axes: &AxisSet,
    options: &ResolveOptions,
) -> Result<ResolveReport, ResolveError> {
    graph.topological_order()?;

    let max_passes = options
        .max_passes
        .unwrap_or_else(|| pass_bound(graph, axes));
    let mut report = ResolveReport {
        passes: 0,
        changes: 0,
    };

    loop {
        if report.passes >= max_passes {
            return Err(ResolveError::NotConverged {
                passes: report.passes,
            });
        }
        let changed = resolve_pass(graph, axes);
        report.passes += 1;
        report.changes += changed;
        trace!(pass = report.passes, changed, "resolution pass");
        if changed == 0 {
            break;
        }
    }

    info!(
        passes = report.passes,
        changes = report.changes,
        nodes = graph.len(),
        "capability graph resolved"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisTag::{self, *};
    use crate::graph::node::NodeId;
    use crate::graph::state::Arity;
    use crate::lattice::Lattice;
    use crate::seed;
    use primgen_settings::SettingsTree;

    fn chain(len: usize, arity: Arity) -> (CapabilityGraph, Vec<NodeId>) {
        let mut graph = CapabilityGraph::new();
        let ids: Vec<NodeId> = (0..len)
            .map(|i| graph.add_module(&format!("M{i}"), arity).unwrap())
            .collect();
        for pair in ids.windows(2) {
            graph.add_child(pair[0], pair[1]).unwrap();
        }
        (graph, ids)
    }

    fn snapshot(graph: &CapabilityGraph, axes: &AxisSet) -> Vec<Lattice> {
        graph
            .node_ids()
            .flat_map(|id| axes.pairs().map(move |(k, v)| (id, k, v)))
            .map(|(id, k, v)| graph.get_state(id, k, v))
            .collect()
    }

    #[test]
    fn empty_graph_converges_immediately() {
        let mut graph = CapabilityGraph::new();
        let report = resolve(&mut graph, &AxisSet::all()).unwrap();
        assert_eq!(report, ResolveReport { passes: 1, changes: 0 });
    }

    #[test]
    fn disabled_root_reaches_every_descendant() {
        let (mut graph, ids) = chain(5, Arity::Single);
        graph.seed(ids[0], Int, Int, Lattice::Disabled).unwrap();
        resolve(&mut graph, &AxisSet::all()).unwrap();
        for id in &ids {
            assert_eq!(graph.get_state(*id, Int, Int), Lattice::Disabled);
            assert_eq!(graph.get_state(*id, Long, Long), Lattice::Unknown);
        }
    }

    #[test]
    fn enabled_leaf_reaches_every_ancestor() {
        let (mut graph, ids) = chain(5, Arity::Pair);
        graph.seed(ids[4], Byte, Int, Lattice::Enabled).unwrap();
        resolve(&mut graph, &AxisSet::all()).unwrap();
        for id in &ids {
            assert!(graph.is_enabled(*id, Byte, Int));
            assert!(!graph.is_enabled(*id, Int, Byte));
        }
    }

    #[test]
    fn termination_within_twice_the_chain() {
        for len in 1..6 {
            let (mut graph, ids) = chain(len, Arity::Single);
            // Enabled evidence has to climb the whole chain, and disabled
            // evidence has to fall down it
            graph.seed(ids[len - 1], Int, Int, Lattice::Enabled).unwrap();
            graph.seed(ids[0], Long, Long, Lattice::Disabled).unwrap();
            let chain_len = graph.longest_chain().unwrap();

            let report = resolve(&mut graph, &AxisSet::all()).unwrap();
            assert!(
                report.passes <= 2 * chain_len + 1,
                "len {len}: {} passes",
                report.passes
            );
        }
    }

    #[test]
    fn idempotent_after_convergence() {
        let (mut graph, ids) = chain(4, Arity::Pair);
        graph.seed(ids[0], Int, Long, Lattice::Disabled).unwrap();
        graph.seed(ids[3], Byte, Byte, Lattice::Enabled).unwrap();
        let axes = AxisSet::all();
        resolve(&mut graph, &axes).unwrap();

        let before = snapshot(&graph, &axes);
        for id in ids.iter().copied() {
            for (k, v) in axes.pairs() {
                assert!(!graph.resolve_step(id, k, v));
            }
        }
        assert_eq!(resolve_pass(&mut graph, &axes), 0);
        assert_eq!(snapshot(&graph, &axes), before);

        let again = resolve(&mut graph, &axes).unwrap();
        assert_eq!(again.passes, 1);
        assert_eq!(again.changes, 0);
    }

    #[test]
    fn ranks_never_decrease() {
        // Diamond with conflicting evidence at the bottom and top
        let mut graph = CapabilityGraph::new();
        let top = graph.add_module("Top", Arity::Single).unwrap();
        let left = graph.add_module("Left", Arity::Single).unwrap();
        let right = graph.add_module("Right", Arity::Single).unwrap();
        let bottom = graph.add_module("Bottom", Arity::Single).unwrap();
        graph.add_child(top, left).unwrap();
        graph.add_child(top, right).unwrap();
        graph.add_child(left, bottom).unwrap();
        graph.add_child(right, bottom).unwrap();
        graph.seed(bottom, Char, Char, Lattice::Enabled).unwrap();
        graph.seed(right, Char, Char, Lattice::Disabled).unwrap();

        let axes = AxisSet::from_tags([Char]);
        let mut previous = snapshot(&graph, &axes);
        loop {
            let changed = resolve_pass(&mut graph, &axes);
            let current = snapshot(&graph, &axes);
            for (before, after) in previous.iter().zip(&current) {
                assert!(after.rank() >= before.rank());
            }
            previous = current;
            if changed == 0 {
                break;
            }
        }
        assert_eq!(graph.get_state(top, Char, Char), Lattice::Enabled);
        assert_eq!(graph.get_state(left, Char, Char), Lattice::Enabled);
        assert_eq!(graph.get_state(right, Char, Char), Lattice::Disabled);
        assert_eq!(graph.get_state(bottom, Char, Char), Lattice::Disabled);
    }

    #[test]
    fn pass_limit_reports_non_convergence() {
        let (mut graph, ids) = chain(3, Arity::Single);
        graph.seed(ids[0], Int, Int, Lattice::Disabled).unwrap();
        let options = ResolveOptions {
            max_passes: Some(1),
        };
        let err = resolve_with(&mut graph, &AxisSet::all(), &options).unwrap_err();
        assert!(matches!(err, ResolveError::NotConverged { passes: 1 }));
    }

    #[test]
    fn pass_bound_counts_slots() {
        let mut graph = CapabilityGraph::new();
        let single = graph.add_module("S", Arity::Single).unwrap();
        graph.add_module("P", Arity::Pair).unwrap();
        graph.add_type_view(single).unwrap();
        let axes = AxisSet::from_tags([Byte, Int]);
        assert_eq!(pass_bound(&graph, &axes), 2 * (2 + 4) + 1);
    }

    #[test]
    fn value_view_carries_value_axis_evidence() {
        let mut graph = CapabilityGraph::new();
        let collection = graph.add_module("Collection", Arity::Single).unwrap();
        let map = graph.add_module("Map", Arity::Pair).unwrap();
        let values = graph.add_value_view(collection).unwrap();
        graph.add_child(values, map).unwrap();

        graph.seed(collection, Object, Object, Lattice::Disabled).unwrap();
        graph.seed(map, Int, Object, Lattice::Enabled).unwrap();
        graph.seed(map, Object, Int, Lattice::Enabled).unwrap();
        resolve(&mut graph, &AxisSet::all()).unwrap();

        // Map(Int -> Object) needs Collection<Object>, which is off
        assert_eq!(graph.get_state(map, Int, Object), Lattice::Disabled);
        // Map(Object -> Int) only needs Collection<Int>
        assert_eq!(graph.get_state(map, Object, Int), Lattice::Enabled);
    }

    #[test]
    fn example_scenario() {
        let mut tree = SettingsTree::new();
        tree.set_bool(&["Sorted", "Enabled"], true).unwrap();
        tree.set_bool(&["Byte", "Sorted", "Enabled"], false).unwrap();

        let mut graph = CapabilityGraph::new();
        let single = graph.add_module("Sorted", Arity::Single).unwrap();
        let axes = AxisSet::from_tags([Byte, Int, Object]);
        seed::load(&mut graph, &tree, &axes).unwrap();
        resolve(&mut graph, &axes).unwrap();
        assert_eq!(graph.get_state(single, Byte, Byte), Lattice::Disabled);
        assert_eq!(graph.get_state(single, Int, Int), Lattice::Enabled);

        let mut pair_graph = CapabilityGraph::new();
        let pair = pair_graph.add_module("Sorted", Arity::Pair).unwrap();
        seed::load(&mut pair_graph, &tree, &axes).unwrap();
        resolve(&mut pair_graph, &axes).unwrap();
        assert_eq!(pair_graph.get_state(pair, Byte, Int), Lattice::Disabled);
        assert_eq!(pair_graph.get_state(pair, Int, Int), Lattice::Enabled);
        assert!(!pair_graph.is_enabled(pair, Byte, Int));
    }

    #[test]
    fn axes_outside_the_run_stay_unknown() {
        let (mut graph, ids) = chain(2, Arity::Single);
        graph.seed(ids[0], AxisTag::Float, AxisTag::Float, Lattice::Disabled).unwrap();
        resolve(&mut graph, &AxisSet::from_tags([Int])).unwrap();
        assert_eq!(graph.get_state(ids[1], Float, Float), Lattice::Unknown);
    }
}
