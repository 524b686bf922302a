//! Per-axis state tables held by module and function nodes.

use serde::{Deserialize, Serialize};

use crate::axis::{AxisSet, AxisTag};
use crate::lattice::Lattice;

/// How many axes a capability spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// Indexed by the key axis only.
    Single,
    /// Indexed by (key axis, value axis).
    Pair,
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Single => write!(f, "single"),
            Arity::Pair => write!(f, "pair"),
        }
    }
}

/// Lattice values for every axis slot of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateTable {
    Single([Lattice; AxisTag::COUNT]),
    Pair([[Lattice; AxisTag::COUNT]; AxisTag::COUNT]),
}

impl StateTable {
    /// A table of the given shape with every slot `Unknown`.
    pub fn new(arity: Arity) -> Self {
        match arity {
            Arity::Single => StateTable::Single([Lattice::Unknown; AxisTag::COUNT]),
            Arity::Pair => {
                StateTable::Pair([[Lattice::Unknown; AxisTag::COUNT]; AxisTag::COUNT])
            }
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            StateTable::Single(_) => Arity::Single,
            StateTable::Pair(_) => Arity::Pair,
        }
    }

    /// State at (key, value). Single tables ignore `value`.
    pub fn get(&self, key: AxisTag, value: AxisTag) -> Lattice {
        match self {
            StateTable::Single(slots) => slots[key.index()],
            StateTable::Pair(slots) => slots[key.index()][value.index()],
        }
    }

    pub fn set(&mut self, key: AxisTag, value: AxisTag, state: Lattice) {
        match self {
            StateTable::Single(slots) => slots[key.index()] = state,
            StateTable::Pair(slots) => slots[key.index()][value.index()] = state,
        }
    }

    /// The slots this table owns within `axes`.
    ///
    /// Single tables report `(key, key)` so the key doubles as the value
    /// when neighbours are queried.
    pub fn slots(&self, axes: &AxisSet) -> Vec<(AxisTag, AxisTag)> {
        match self {
            StateTable::Single(_) => axes.iter().map(|k| (k, k)).collect(),
            StateTable::Pair(_) => axes.pairs().collect(),
        }
    }
}
