//! `primgen resolve` — seed, resolve, and emit the enablement matrix.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use primgen_core::{resolve, seed, EnablementMatrix};
use primgen_settings::hash_hex;
use tracing::info;

use super::{load_inputs, Inputs};
use crate::manifest::PrimgenManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_format(format: Option<&str>) -> Result<OutputFormat> {
    match format.unwrap_or("text") {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => bail!("unknown format '{other}' (expected text or json)"),
    }
}

/// Seed and resolve the graph described by `inputs`.
pub fn build_matrix(inputs: &Inputs) -> Result<EnablementMatrix> {
    let mut graph = inputs.catalog.build_graph().context("building capability graph")?;
    seed::load(&mut graph, &inputs.settings, &inputs.axes)?;
    resolve::resolve(&mut graph, &inputs.axes)?;

    let fingerprint = inputs
        .settings
        .fingerprint()
        .context("fingerprinting settings")?;
    Ok(EnablementMatrix::collect(&graph, &inputs.axes).with_fingerprint(hash_hex(&fingerprint)))
}

/// Resolve and print or write the matrix.
///
/// The destination is `output`, else the manifest's `[paths] output` when
/// writing JSON, else stdout.
pub fn run(
    project_dir: &Path,
    manifest: Option<&PrimgenManifest>,
    settings: Option<&str>,
    catalog: Option<&str>,
    format: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let format = parse_format(format)?;
    let inputs = load_inputs(project_dir, manifest, settings, catalog)?;
    if let Some(path) = &inputs.settings_path {
        info!(path = %path.display(), "resolving with settings file");
    }
    let matrix = build_matrix(&inputs)?;

    let rendered = match format {
        OutputFormat::Text => matrix.to_string(),
        OutputFormat::Json => matrix.to_json().context("serializing matrix")?,
    };

    let destination = match output {
        Some(path) => Some(PathBuf::from(path)),
        None if format == OutputFormat::Json => {
            manifest.and_then(|m| m.output_path(project_dir))
        }
        None => None,
    };

    match destination {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(&path, rendered + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "Wrote {} ({} of {} combinations enabled)",
                path.display(),
                matrix.enabled_count(),
                matrix.entry_count()
            );
        }
        None => println!("{rendered}"),
    }

    let unresolved = matrix.unresolved().len();
    if unresolved > 0 {
        eprintln!("note: {unresolved} combinations were never decided and are treated as disabled");
    }
    Ok(())
}
