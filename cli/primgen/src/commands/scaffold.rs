//! `primgen scaffold` — write a fully populated settings template.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use primgen_settings::save_settings;

use super::load_inputs;
use crate::manifest::PrimgenManifest;

/// Add every configurable scope to the project's settings and save them.
///
/// Existing values are kept. Writes to `output` if given, else back to the
/// file the settings came from.
pub fn run(
    project_dir: &Path,
    manifest: Option<&PrimgenManifest>,
    output: Option<&str>,
) -> Result<()> {
    let mut inputs = load_inputs(project_dir, manifest, None, None)?;
    let before = inputs.settings.leaf_count();

    inputs
        .catalog
        .scaffold(&mut inputs.settings, &inputs.axes)
        .context("scaffolding settings")?;

    let path = match (output, manifest) {
        (Some(path), _) => PathBuf::from(path),
        (None, Some(m)) => m.settings_path(project_dir),
        (None, None) => bail!("no primgen.toml found; pass --output to choose a file"),
    };
    save_settings(&path, &inputs.settings)
        .with_context(|| format!("writing {}", path.display()))?;

    println!(
        "Wrote {} ({} settings, {} added)",
        path.display(),
        inputs.settings.leaf_count(),
        inputs.settings.leaf_count() - before
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use primgen_settings::{load_settings, ENABLED_KEY};

    #[test]
    fn scaffold_without_manifest_needs_output() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(dir.path(), None, None).is_err());
    }

    #[test]
    fn scaffold_to_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("settings.json");
        run(dir.path(), None, Some(out.to_str().unwrap())).unwrap();

        let settings = load_settings(&out).unwrap();
        assert_eq!(settings.boolean_at(&["Map", ENABLED_KEY]), Some(true));
        assert_eq!(settings.boolean_at(&["Map", "TreeMap"]), Some(true));
        assert!(settings.subtree(&["Byte", "Queue"]).is_some());
    }

    #[test]
    fn scaffold_keeps_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("primgen.toml"),
            PrimgenManifest::template("keep"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("settings.toml"),
            "[Map]\nEnabled = false\nTreeMap = false\n",
        )
        .unwrap();
        let (manifest, project_dir) = PrimgenManifest::find_and_load(dir.path()).unwrap().unwrap();

        run(&project_dir, Some(&manifest), None).unwrap();

        let settings = load_settings(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings.boolean_at(&["Map", ENABLED_KEY]), Some(false));
        assert_eq!(settings.boolean_at(&["Map", "TreeMap"]), Some(false));
        assert_eq!(settings.boolean_at(&["Map", "HashMap"]), Some(true));
    }
}
