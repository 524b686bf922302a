//! `primgen init` — project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use primgen_core::{AxisSet, Catalog};
use primgen_settings::{save_settings, SettingsTree, ENABLED_KEY};

use crate::manifest::{PrimgenManifest, MANIFEST_FILE};

/// Create a new primgen project in directory `name` relative to cwd.
pub fn run(name: &str) -> Result<()> {
    let project_dir = Path::new(name);
    create_project(project_dir, name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir.join("out")).context("creating out/ directory")?;

    fs::write(
        project_dir.join(MANIFEST_FILE),
        PrimgenManifest::template(name),
    )
    .context("writing primgen.toml")?;

    // Every module starts enabled at the root; axis scopes are left for
    // the user to narrow.
    let catalog = Catalog::standard();
    let mut settings = SettingsTree::new();
    for module in &catalog.modules {
        settings.set_bool(&[module.name.as_str(), ENABLED_KEY], true)?;
    }
    catalog.scaffold(&mut settings, &AxisSet::all())?;
    save_settings(&project_dir.join("settings.toml"), &settings)
        .context("writing settings.toml")?;

    fs::write(project_dir.join(".gitignore"), "out/\n").context("writing .gitignore")?;

    println!("Created project '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/settings.toml ({} settings)", settings.leaf_count());
    println!("  {name}/out/");
    println!("  {name}/.gitignore");

    Ok(())
}
