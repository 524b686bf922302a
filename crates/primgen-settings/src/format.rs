//! Loading and saving settings trees as TOML or JSON.
//!
//! The format is chosen from the file extension. Both formats map onto the
//! same tree: booleans are leaves, tables nest.

use std::path::Path;

use tracing::debug;

use crate::error::{Result, SettingsError};
use crate::tree::SettingsTree;

/// On-disk representation of a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Json,
}

impl SettingsFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(SettingsFormat::Toml),
            Some("json") => Ok(SettingsFormat::Json),
            _ => Err(SettingsError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Parse a settings tree from a string in the given format.
pub fn parse_settings(content: &str, format: SettingsFormat) -> Result<SettingsTree> {
    let tree = match format {
        SettingsFormat::Toml => toml::from_str(content)?,
        SettingsFormat::Json => serde_json::from_str(content)?,
    };
    Ok(tree)
}

/// Render a settings tree in the given format.
pub fn settings_to_string(tree: &SettingsTree, format: SettingsFormat) -> Result<String> {
    let rendered = match format {
        SettingsFormat::Toml => toml::to_string_pretty(tree)?,
        SettingsFormat::Json => serde_json::to_string_pretty(tree)?,
    };
    Ok(rendered)
}

/// Load a settings file, picking the format from its extension.
pub fn load_settings(path: &Path) -> Result<SettingsTree> {
    if !path.exists() {
        return Err(SettingsError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let format = SettingsFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let tree = parse_settings(&content, format)?;
    debug!(path = %path.display(), leaves = tree.leaf_count(), "loaded settings");
    Ok(tree)
}

/// Write a settings tree to disk, picking the format from the extension.
pub fn save_settings(path: &Path, tree: &SettingsTree) -> Result<()> {
    let format = SettingsFormat::from_path(path)?;
    let rendered = settings_to_string(tree, format)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, rendered)?;
    debug!(path = %path.display(), "saved settings");
    Ok(())
}
