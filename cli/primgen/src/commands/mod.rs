//! CLI command implementations.

pub mod check;
pub mod explain;
pub mod init;
pub mod resolve;
pub mod scaffold;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use primgen_core::{load_catalog, AxisSet, Catalog};
use primgen_settings::{load_settings, SettingsTree};
use tracing::warn;

use crate::manifest::PrimgenManifest;

/// Everything a command needs to build and seed a graph.
pub struct Inputs {
    pub settings: SettingsTree,
    /// Where the settings came from, if a file was read.
    pub settings_path: Option<PathBuf>,
    pub catalog: Catalog,
    pub axes: AxisSet,
}

/// Resolve command-line overrides against the manifest and load inputs.
///
/// An explicit `--settings` file must exist; the manifest's settings file
/// may be missing, in which case an empty tree is used.
pub fn load_inputs(
    project_dir: &Path,
    manifest: Option<&PrimgenManifest>,
    settings: Option<&str>,
    catalog: Option<&str>,
) -> Result<Inputs> {
    let (settings, settings_path) = match (settings, manifest) {
        (Some(path), _) => {
            let path = PathBuf::from(path);
            let tree = load_settings(&path)
                .with_context(|| format!("loading settings {}", path.display()))?;
            (tree, Some(path))
        }
        (None, Some(m)) => {
            let path = m.settings_path(project_dir);
            if path.is_file() {
                let tree = load_settings(&path)
                    .with_context(|| format!("loading settings {}", path.display()))?;
                (tree, Some(path))
            } else {
                warn!(path = %path.display(), "settings file missing, using empty settings");
                (SettingsTree::new(), None)
            }
        }
        (None, None) => (SettingsTree::new(), None),
    };

    let catalog_path = match catalog {
        Some(path) => Some(PathBuf::from(path)),
        None => manifest.and_then(|m| m.catalog_path(project_dir)),
    };
    let catalog = match catalog_path {
        Some(path) => load_catalog(&path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::standard(),
    };

    let axes = match manifest {
        Some(m) => m.axis_set()?,
        None => AxisSet::all(),
    };

    Ok(Inputs {
        settings,
        settings_path,
        catalog,
        axes,
    })
}
