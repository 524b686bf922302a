//! `primgen check` — validate the catalog and the graph it builds.

use std::path::Path;

use anyhow::{bail, Context, Result};
use primgen_core::resolve::pass_bound;

use super::load_inputs;
use crate::manifest::PrimgenManifest;

/// Summary of a healthy catalog.
#[derive(Debug)]
pub struct CheckReport {
    pub modules: usize,
    pub nodes: usize,
    pub edges: usize,
    pub longest_chain: usize,
    pub pass_bound: usize,
}

pub fn check(
    project_dir: &Path,
    manifest: Option<&PrimgenManifest>,
    catalog: Option<&str>,
) -> Result<CheckReport> {
    let inputs = load_inputs(project_dir, manifest, None, catalog)?;

    if let Err(issues) = inputs.catalog.validate() {
        for issue in &issues {
            eprintln!("  {issue}");
        }
        bail!("catalog has {} problem(s)", issues.len());
    }

    let graph = inputs.catalog.build_graph().context("building capability graph")?;
    let longest_chain = graph.longest_chain()?;

    Ok(CheckReport {
        modules: inputs.catalog.modules.len(),
        nodes: graph.len(),
        edges: graph.edge_count(),
        longest_chain,
        pass_bound: pass_bound(&graph, &inputs.axes),
    })
}

pub fn run(
    project_dir: &Path,
    manifest: Option<&PrimgenManifest>,
    catalog: Option<&str>,
) -> Result<()> {
    let report = check(project_dir, manifest, catalog)?;
    println!("Catalog OK");
    println!("  Modules:       {}", report.modules);
    println!("  Nodes:         {}", report.nodes);
    println!("  Edges:         {}", report.edges);
    println!("  Longest chain: {}", report.longest_chain);
    println!("  Pass bound:    {}", report.pass_bound);
    Ok(())
}
