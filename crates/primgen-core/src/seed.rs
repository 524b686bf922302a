//! Seeding node state from the settings tree.
//!
//! Each slot is seeded from a chain of settings lookups ordered from the
//! broadest scope to the most specific one; every defined entry replaces
//! the value found so far. For a module `C` at key `K` (and value `V` for
//! two-axis modules):
//!
//! ```text
//! C.Enabled
//! K.Enabled
//! K.C.Enabled
//! K.V.Enabled
//! K.V.C.Enabled
//! ```
//!
//! A function `f` of module `C` uses `f` in place of the module-level
//! `Enabled` key (`C.f`, `K.C.f`, `K.V.C.f`) and shares the axis-level
//! switches. Seeding only reads the tree.

use std::fmt;

use primgen_settings::{SettingsTree, ENABLED_KEY};
use serde::Serialize;
use tracing::debug;

use crate::axis::{AxisSet, AxisTag};
use crate::graph::node::{NodeId, NodeKind};
use crate::graph::state::Arity;
use crate::graph::{CapabilityGraph, GraphError};
use crate::lattice::Lattice;

/// Settings paths consulted for one slot of `id`, broadest first.
///
/// Returns `None` for views and unknown ids.
pub fn seed_paths(
    graph: &CapabilityGraph,
    id: NodeId,
    key: AxisTag,
    value: AxisTag,
) -> Option<Vec<Vec<String>>> {
    let node = graph.node(id)?;
    let (module, leaf, arity) = match node.kind() {
        NodeKind::Module { state } => (node.name(), ENABLED_KEY, state.arity()),
        NodeKind::Function { module, state } => {
            (graph.node(*module)?.name(), node.name(), state.arity())
        }
        NodeKind::View { .. } => return None,
    };

    let k = key.path();
    let mut paths = vec![
        vec![module, leaf],
        vec![k, ENABLED_KEY],
        vec![k, module, leaf],
    ];
    if arity == Arity::Pair {
        let v = value.path();
        paths.push(vec![k, v, ENABLED_KEY]);
        paths.push(vec![k, v, module, leaf]);
    }
    Some(
        paths
            .into_iter()
            .map(|p| p.into_iter().map(str::to_string).collect())
            .collect(),
    )
}

fn lookup(settings: &SettingsTree, path: &[String]) -> Option<bool> {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    settings.boolean_at(&segments)
}

/// The seed for one slot: the most specific explicit setting, or `Unknown`.
pub fn seed_value(
    graph: &CapabilityGraph,
    settings: &SettingsTree,
    id: NodeId,
    key: AxisTag,
    value: AxisTag,
) -> Lattice {
    seed_paths(graph, id, key, value)
        .unwrap_or_default()
        .iter()
        .fold(Lattice::Unknown, |seed, path| {
            seed.replace_if_defined(lookup(settings, path).map(Lattice::of).unwrap_or_default())
        })
}

/// Seed every slot of `id` within `axes`. Returns the number of slots that
/// received an explicit value. Views are skipped.
pub fn load_node(
    graph: &mut CapabilityGraph,
    settings: &SettingsTree,
    id: NodeId,
    axes: &AxisSet,
) -> Result<usize, GraphError> {
    let node = graph.node(id).ok_or(GraphError::NodeNotFound(id))?;
    let Some(state) = node.state() else {
        return Ok(0);
    };
    let seeds: Vec<(AxisTag, AxisTag, Lattice)> = state
        .slots(axes)
        .into_iter()
        .map(|(k, v)| (k, v, seed_value(graph, settings, id, k, v)))
        .filter(|(_, _, seed)| seed.is_defined())
        .collect();

    for &(k, v, seed) in &seeds {
        graph.seed(id, k, v, seed)?;
    }
    Ok(seeds.len())
}

/// Seed every node of the graph. Returns the number of explicitly seeded
/// slots.
pub fn load(
    graph: &mut CapabilityGraph,
    settings: &SettingsTree,
    axes: &AxisSet,
) -> Result<usize, GraphError> {
    let ids: Vec<NodeId> = graph.node_ids().collect();
    let mut seeded = 0;
    for id in ids {
        let count = load_node(graph, settings, id, axes)?;
        if count > 0 {
            if let Some(node) = graph.node(id) {
                debug!(capability = node.label(), slots = count, "seeded from settings");
            }
        }
        seeded += count;
    }
    debug!(seeded, nodes = graph.len(), "settings loaded");
    Ok(seeded)
}

/// One lookup in a seed chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedStep {
    /// Dotted settings path.
    pub path: String,
    /// The boolean found there, if any.
    pub found: Option<bool>,
    /// Seed value after applying this step.
    pub running: Lattice,
}

/// Every lookup that produced the seed of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedTrace {
    pub label: String,
    pub key: AxisTag,
    /// Present only for two-axis capabilities.
    pub value: Option<AxisTag>,
    pub steps: Vec<SeedStep>,
    pub seed: Lattice,
}

/// Explain how the seed of `id` at (key, value) was derived.
pub fn explain_seed(
    graph: &CapabilityGraph,
    settings: &SettingsTree,
    id: NodeId,
    key: AxisTag,
    value: AxisTag,
) -> Option<SeedTrace> {
    let node = graph.node(id)?;
    let arity = node.arity()?;
    let paths = seed_paths(graph, id, key, value)?;

    let mut running = Lattice::Unknown;
    let steps = paths
        .iter()
        .map(|path| {
            let found = lookup(settings, path);
            running = running.replace_if_defined(found.map(Lattice::of).unwrap_or_default());
            SeedStep {
                path: path.join("."),
                found,
                running,
            }
        })
        .collect();

    Some(SeedTrace {
        label: node.label().to_string(),
        key,
        value: (arity == Arity::Pair).then_some(value),
        steps,
        seed: running,
    })
}

impl fmt::Display for SeedTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => writeln!(f, "{} at ({}, {}):", self.label, self.key, v)?,
            None => writeln!(f, "{} at {}:", self.label, self.key)?,
        }
        for step in &self.steps {
            let found = match step.found {
                Some(b) => b.to_string(),
                None => "-".to_string(),
            };
            writeln!(f, "  {:<40} {:<6} -> {}", step.path, found, step.running)?;
        }
        write!(f, "  seed: {}", self.seed)
    }
}
