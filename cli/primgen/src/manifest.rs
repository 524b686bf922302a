//! `primgen.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use primgen_core::AxisSet;
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "primgen.toml";

/// The top-level manifest structure for a primgen project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimgenManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Restricts generation to a subset of axis tags.
    #[serde(default)]
    pub axes: Option<AxesConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// File locations, relative to the manifest directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_settings")]
    pub settings: String,
    /// Capability catalog; the built-in catalog is used when absent.
    #[serde(default)]
    pub catalog: Option<String>,
    /// Where `primgen resolve` writes the enablement matrix.
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings: default_settings(),
            catalog: None,
            output: None,
        }
    }
}

fn default_settings() -> String {
    "settings.toml".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxesConfig {
    pub include: Vec<String>,
}

impl PrimgenManifest {
    /// Search upward from `start_dir` for a `primgen.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: PrimgenManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing primgen.toml")
    }

    pub fn settings_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.settings)
    }

    pub fn catalog_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.paths.catalog.as_ref().map(|c| project_dir.join(c))
    }

    pub fn output_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.paths.output.as_ref().map(|o| project_dir.join(o))
    }

    /// The axis set for this project; every tag unless `[axes]` narrows it.
    pub fn axis_set(&self) -> Result<AxisSet> {
        match &self.axes {
            Some(axes) => AxisSet::parse(&axes.include).context("parsing [axes] include"),
            None => Ok(AxisSet::all()),
        }
    }

    /// Generate the default template for `primgen init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"

[paths]
settings = "settings.toml"
output = "out/matrix.json"
"#
        )
    }
}
