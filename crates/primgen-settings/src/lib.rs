//! Hierarchical settings store for the primgen generator.
//!
//! Settings are a tree of string-keyed nodes, each either a boolean leaf or
//! a nested table. The resolver only ever reads the tree; writes
//! (auto-vivified subtrees, scaffolded defaults) go through explicit methods
//! that log every table they create.

pub mod error;
pub mod format;
pub mod hash;
pub mod tree;

pub use error::{Result, SettingsError};
pub use format::{
    load_settings, parse_settings, save_settings, settings_to_string, SettingsFormat,
};
pub use hash::{hash_hex, SettingsHash};
pub use tree::{SettingsNode, SettingsTable, SettingsTree, ENABLED_KEY};
