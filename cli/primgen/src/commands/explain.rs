//! `primgen explain` — show how one capability slot got its state.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use primgen_core::{explain_seed, resolve, seed, Arity, AxisTag, Lattice, SeedTrace};

use super::load_inputs;
use crate::manifest::PrimgenManifest;

/// Seed trace plus the state after resolution.
pub struct Explanation {
    pub trace: SeedTrace,
    pub resolved: Lattice,
    pub enabled: bool,
}

pub fn explain(
    project_dir: &Path,
    manifest: Option<&PrimgenManifest>,
    capability: &str,
    key: &str,
    value: Option<&str>,
) -> Result<Explanation> {
    let inputs = load_inputs(project_dir, manifest, None, None)?;
    let mut graph = inputs.catalog.build_graph().context("building capability graph")?;

    let id = graph
        .find(capability)
        .ok_or_else(|| anyhow!("unknown capability '{capability}'"))?;
    let arity = graph
        .node(id)
        .and_then(|n| n.arity())
        .ok_or_else(|| anyhow!("'{capability}' is a view and has no state of its own"))?;

    let key: AxisTag = key.parse()?;
    let value: AxisTag = match (value, arity) {
        (Some(v), _) => v.parse()?,
        (None, Arity::Single) => key,
        (None, Arity::Pair) => bail!("'{capability}' spans two axes; pass --value"),
    };

    let trace = explain_seed(&graph, &inputs.settings, id, key, value)
        .ok_or_else(|| anyhow!("no seed chain for '{capability}'"))?;

    seed::load(&mut graph, &inputs.settings, &inputs.axes)?;
    resolve::resolve(&mut graph, &inputs.axes)?;

    Ok(Explanation {
        trace,
        resolved: graph.get_state(id, key, value),
        enabled: graph.is_enabled(id, key, value),
    })
}

pub fn run(
    project_dir: &Path,
    manifest: Option<&PrimgenManifest>,
    capability: &str,
    key: &str,
    value: Option<&str>,
) -> Result<()> {
    let explanation = explain(project_dir, manifest, capability, key, value)?;
    println!("{}", explanation.trace);
    println!("  resolved: {}", explanation.resolved);
    println!(
        "  generated: {}",
        if explanation.enabled { "yes" } else { "no" }
    );
    Ok(())
}
