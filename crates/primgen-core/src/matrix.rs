//! The resolved enablement matrix handed to the emission stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::axis::{AxisSet, AxisTag};
use crate::graph::state::Arity;
use crate::graph::CapabilityGraph;
use crate::lattice::Lattice;

/// Final state of one capability at one axis combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub key: AxisTag,
    /// Present only for two-axis capabilities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AxisTag>,
    pub state: Lattice,
    pub enabled: bool,
}

/// Every entry for one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRow {
    /// Dotted label, e.g. `Map.HashMap.LinkedHashMap`.
    pub name: String,
    pub arity: Arity,
    pub entries: Vec<MatrixEntry>,
}

impl CapabilityRow {
    fn entry(&self, key: AxisTag, value: AxisTag) -> Option<&MatrixEntry> {
        self.entries.iter().find(|e| {
            e.key == key
                && match self.arity {
                    Arity::Single => true,
                    Arity::Pair => e.value == Some(value),
                }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnablementMatrix {
    /// Hex fingerprint of the settings the matrix was resolved from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_fingerprint: Option<String>,
    pub axes: Vec<AxisTag>,
    pub capabilities: Vec<CapabilityRow>,
}

impl EnablementMatrix {
    /// Read the final state of every module and function in `graph`.
    ///
    /// Views are skipped; they have no state of their own.
    pub fn collect(graph: &CapabilityGraph, axes: &AxisSet) -> Self {
        let capabilities = graph
            .nodes()
            .filter_map(|(id, node)| {
                let arity = node.arity()?;
                let entries = node
                    .state()?
                    .slots(axes)
                    .into_iter()
                    .map(|(key, value)| MatrixEntry {
                        key,
                        value: (arity == Arity::Pair).then_some(value),
                        state: graph.get_state(id, key, value),
                        enabled: graph.is_enabled(id, key, value),
                    })
                    .collect();
                Some(CapabilityRow {
                    name: node.label().to_string(),
                    arity,
                    entries,
                })
            })
            .collect();

        Self {
            settings_fingerprint: None,
            axes: axes.iter().collect(),
            capabilities,
        }
    }

    /// Builder: record the settings fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.settings_fingerprint = Some(fingerprint.into());
        self
    }

    pub fn row(&self, name: &str) -> Option<&CapabilityRow> {
        self.capabilities.iter().find(|r| r.name == name)
    }

    /// Whether `name` is generated at (key, value). `value` is ignored for
    /// single-axis capabilities. `None` if the capability or combination is
    /// not in the matrix.
    pub fn is_enabled(&self, name: &str, key: AxisTag, value: AxisTag) -> Option<bool> {
        Some(self.row(name)?.entry(key, value)?.enabled)
    }

    pub fn entry_count(&self) -> usize {
        self.capabilities.iter().map(|r| r.entries.len()).sum()
    }

    pub fn enabled_count(&self) -> usize {
        self.entries().filter(|(_, e)| e.enabled).count()
    }

    /// Entries no setting or neighbour ever decided.
    pub fn unresolved(&self) -> Vec<(&str, &MatrixEntry)> {
        self.entries()
            .filter(|(_, e)| e.state == Lattice::Unknown)
            .collect()
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &MatrixEntry)> {
        self.capabilities
            .iter()
            .flat_map(|r| r.entries.iter().map(move |e| (r.name.as_str(), e)))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for EnablementMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.capabilities {
            let enabled: Vec<String> = row
                .entries
                .iter()
                .filter(|e| e.enabled)
                .map(|e| match e.value {
                    Some(v) => format!("{}/{}", e.key, v),
                    None => e.key.to_string(),
                })
                .collect();
            writeln!(
                f,
                "{:<32} {:>3}/{:<3} {}",
                row.name,
                enabled.len(),
                row.entries.len(),
                enabled.join(" ")
            )?;
        }
        write!(
            f,
            "{} of {} combinations enabled",
            self.enabled_count(),
            self.entry_count()
        )
    }
}
