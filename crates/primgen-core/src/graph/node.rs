//! Node types and the Node struct.
//!
//! A node is one capability (a module or a function inside a module) or a
//! read-only projected view of another node's state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::{Arity, StateTable};

/// Index of a node in its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which axis argument a projected view rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// `(a, b)` reads the owner at `(a, a)`.
    Type,
    /// `(a, b)` reads the owner at `(b, a)`.
    Value,
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Type => write!(f, "type"),
            Projection::Value => write!(f, "value"),
        }
    }
}

/// The variant-specific part of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A top-level capability seeded from its own settings scope.
    Module { state: StateTable },
    /// A named sub-capability seeded under its module's scope.
    Function { module: NodeId, state: StateTable },
    /// Zero-state alias of another node's state.
    View { owner: NodeId, projection: Projection },
}

/// A node in the capability graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Settings key of this node (module name or function name).
    pub(crate) name: String,
    /// Unique dotted label, e.g. `Map.Sorted`.
    pub(crate) label: String,
    pub(crate) kind: NodeKind,
    /// Nodes whose state can pull this one towards `Disabled`.
    pub(crate) parents: Vec<NodeId>,
    /// Nodes whose state can pull this one towards `Enabled`.
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_view(&self) -> bool {
        matches!(self.kind, NodeKind::View { .. })
    }

    /// The node's own state table; views have none.
    pub fn state(&self) -> Option<&StateTable> {
        match &self.kind {
            NodeKind::Module { state } | NodeKind::Function { state, .. } => Some(state),
            NodeKind::View { .. } => None,
        }
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut StateTable> {
        match &mut self.kind {
            NodeKind::Module { state } | NodeKind::Function { state, .. } => Some(state),
            NodeKind::View { .. } => None,
        }
    }

    /// Arity of the node's own state; views have none.
    pub fn arity(&self) -> Option<Arity> {
        self.state().map(StateTable::arity)
    }
}
