//! The settings tree: boolean leaves nested under string-keyed tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SettingsError};
use crate::hash::{content_hash, SettingsHash};

/// Key of the on/off switch inside a scope table.
pub const ENABLED_KEY: &str = "Enabled";

/// A table of settings entries, ordered by key.
pub type SettingsTable = BTreeMap<String, SettingsNode>;

/// A single settings entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingsNode {
    /// A boolean leaf.
    Bool(bool),
    /// A nested table.
    Table(SettingsTable),
}

impl SettingsNode {
    /// The boolean value, if this is a leaf.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingsNode::Bool(b) => Some(*b),
            SettingsNode::Table(_) => None,
        }
    }

    /// The nested table, if this is a table.
    pub fn as_table(&self) -> Option<&SettingsTable> {
        match self {
            SettingsNode::Table(t) => Some(t),
            SettingsNode::Bool(_) => None,
        }
    }
}

/// Root of a settings hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsTree {
    root: SettingsTable,
}

impl SettingsTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing root table.
    pub fn from_table(root: SettingsTable) -> Self {
        Self { root }
    }

    /// The root table.
    pub fn root(&self) -> &SettingsTable {
        &self.root
    }

    /// True if the root table has no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Follow `path` from the root through nested tables.
    ///
    /// Returns `None` if any segment is missing or is a boolean leaf.
    pub fn subtree(&self, path: &[&str]) -> Option<&SettingsTable> {
        let mut table = &self.root;
        for segment in path {
            table = table.get(*segment)?.as_table()?;
        }
        Some(table)
    }

    /// Look up the boolean at `path`, where the last segment is the leaf key.
    ///
    /// Missing tables, missing keys, and non-boolean entries all read as
    /// `None`. This never modifies the tree.
    pub fn boolean_at(&self, path: &[&str]) -> Option<bool> {
        let (key, parents) = path.split_last()?;
        self.subtree(parents)?.get(*key)?.as_bool()
    }

    /// Return the table at `path`, creating any missing tables on the way.
    ///
    /// When `create_with_default_enabled` is set, every table created by
    /// this call is seeded with `Enabled = true`. Existing tables are left
    /// untouched.
    pub fn get_or_create_subtree(
        &mut self,
        path: &[&str],
        create_with_default_enabled: bool,
    ) -> Result<&mut SettingsTable> {
        let mut table = &mut self.root;
        for (depth, segment) in path.iter().enumerate() {
            let entry = table.entry((*segment).to_string()).or_insert_with(|| {
                debug!(
                    path = %path[..=depth].join("."),
                    default_enabled = create_with_default_enabled,
                    "creating settings subtree"
                );
                let mut fresh = SettingsTable::new();
                if create_with_default_enabled {
                    fresh.insert(ENABLED_KEY.to_string(), SettingsNode::Bool(true));
                }
                SettingsNode::Table(fresh)
            });
            table = match entry {
                SettingsNode::Table(t) => t,
                SettingsNode::Bool(_) => {
                    return Err(SettingsError::NotATable {
                        path: path[..=depth].join("."),
                    })
                }
            };
        }
        Ok(table)
    }

    /// Set the boolean at `path`, creating parent tables as needed.
    pub fn set_bool(&mut self, path: &[&str], value: bool) -> Result<()> {
        let (key, parents) = path.split_last().ok_or(SettingsError::EmptyPath)?;
        let table = self.get_or_create_subtree(parents, false)?;
        table.insert((*key).to_string(), SettingsNode::Bool(value));
        Ok(())
    }

    /// Insert `default` at `path` unless a boolean is already there.
    ///
    /// Returns the value now stored at `path`.
    pub fn ensure_bool(&mut self, path: &[&str], default: bool) -> Result<bool> {
        let (key, parents) = path.split_last().ok_or(SettingsError::EmptyPath)?;
        let table = self.get_or_create_subtree(parents, false)?;
        match table.get(*key) {
            Some(SettingsNode::Bool(b)) => Ok(*b),
            Some(SettingsNode::Table(_)) => Err(SettingsError::NotATable {
                path: path.join("."),
            }),
            None => {
                debug!(path = %path.join("."), default, "adding settings leaf");
                table.insert((*key).to_string(), SettingsNode::Bool(default));
                Ok(default)
            }
        }
    }

    /// Total number of boolean leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        fn count(table: &SettingsTable) -> usize {
            table
                .values()
                .map(|node| match node {
                    SettingsNode::Bool(_) => 1,
                    SettingsNode::Table(t) => count(t),
                })
                .sum()
        }
        count(&self.root)
    }

    /// SHA-256 fingerprint of the tree contents.
    pub fn fingerprint(&self) -> Result<SettingsHash> {
        content_hash(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SettingsTree {
        let mut tree = SettingsTree::new();
        tree.set_bool(&["Sorted", ENABLED_KEY], true).unwrap();
        tree.set_bool(&["Byte", "Sorted", ENABLED_KEY], false).unwrap();
        tree
    }

    #[test]
    fn boolean_lookup() {
        let tree = sample();
        assert_eq!(tree.boolean_at(&["Sorted", ENABLED_KEY]), Some(true));
        assert_eq!(tree.boolean_at(&["Byte", "Sorted", ENABLED_KEY]), Some(false));
        assert_eq!(tree.boolean_at(&["Int", "Sorted", ENABLED_KEY]), None);
        assert_eq!(tree.boolean_at(&[]), None);
    }

    #[test]
    fn boolean_lookup_ignores_tables() {
        let tree = sample();
        // "Byte.Sorted" is a table, not a leaf
        assert_eq!(tree.boolean_at(&["Byte", "Sorted"]), None);
    }

    #[test]
    fn lookup_does_not_vivify() {
        let tree = sample();
        let before = tree.clone();
        let _ = tree.boolean_at(&["Long", "Map", ENABLED_KEY]);
        assert_eq!(tree, before);
    }

    #[test]
    fn vivify_with_default_enabled() {
        let mut tree = SettingsTree::new();
        tree.get_or_create_subtree(&["Int", "Long"], true).unwrap();
        assert_eq!(tree.boolean_at(&["Int", ENABLED_KEY]), Some(true));
        assert_eq!(tree.boolean_at(&["Int", "Long", ENABLED_KEY]), Some(true));
    }

    #[test]
    fn vivify_without_default_creates_empty_tables() {
        let mut tree = SettingsTree::new();
        let table = tree.get_or_create_subtree(&["Int", "Map"], false).unwrap();
        assert!(table.is_empty());
        assert!(tree.subtree(&["Int"]).is_some());
        assert_eq!(tree.boolean_at(&["Int", ENABLED_KEY]), None);
    }

    #[test]
    fn vivify_keeps_existing_entries() {
        let mut tree = sample();
        tree.get_or_create_subtree(&["Byte", "Sorted"], true).unwrap();
        // The existing explicit `false` survives
        assert_eq!(tree.boolean_at(&["Byte", "Sorted", ENABLED_KEY]), Some(false));
        // Byte already existed, so no default was added there
        assert_eq!(tree.boolean_at(&["Byte", ENABLED_KEY]), None);
    }

    #[test]
    fn vivify_is_idempotent() {
        let mut once = SettingsTree::new();
        once.get_or_create_subtree(&["Char", "Set"], true).unwrap();
        let mut twice = once.clone();
        twice.get_or_create_subtree(&["Char", "Set"], true).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn vivify_through_leaf_is_rejected() {
        let mut tree = sample();
        let err = tree
            .get_or_create_subtree(&["Sorted", ENABLED_KEY, "Deeper"], false)
            .unwrap_err();
        assert!(matches!(err, SettingsError::NotATable { ref path } if path == "Sorted.Enabled"));
    }

    #[test]
    fn ensure_bool_keeps_existing() {
        let mut tree = sample();
        assert!(!tree.ensure_bool(&["Byte", "Sorted", ENABLED_KEY], true).unwrap());
        assert!(tree.ensure_bool(&["Map", "Stream"], true).unwrap());
        assert_eq!(tree.boolean_at(&["Map", "Stream"]), Some(true));
    }

    #[test]
    fn empty_path_writes_rejected() {
        let mut tree = SettingsTree::new();
        assert!(matches!(tree.set_bool(&[], true), Err(SettingsError::EmptyPath)));
        assert!(matches!(tree.ensure_bool(&[], true), Err(SettingsError::EmptyPath)));
    }

    #[test]
    fn leaf_count_walks_tables() {
        assert_eq!(sample().leaf_count(), 2);
        assert_eq!(SettingsTree::new().leaf_count(), 0);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = sample();
        let b = sample();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

        let mut c = sample();
        c.set_bool(&["Int", ENABLED_KEY], false).unwrap();
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
    }
}
