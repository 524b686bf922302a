//! The capability graph: an arena of nodes joined by parent/child edges.
//!
//! Edges point from a requirement (parent) to the capability that needs it
//! (child). Evidence travels both ways with different strength: a child
//! that is enabled pulls its parents towards `Enabled`, and a parent that
//! is disabled pulls its children towards `Disabled`. The graph is kept
//! acyclic: an edge that would close a cycle is rejected on insertion.

pub mod node;
pub mod state;

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use self::node::{Node, NodeId, NodeKind, Projection};
use self::state::{Arity, StateTable};

use crate::axis::{AxisSet, AxisTag};
use crate::lattice::Lattice;

/// Errors that can occur during graph construction.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("duplicate capability name: {0}")]
    DuplicateName(String),

    #[error("edge {parent} -> {child} would create a cycle")]
    CycleDetected { parent: String, child: String },

    #[error("node '{node}' is not a {expected}")]
    WrongKind { node: String, expected: &'static str },
}

/// Arena-backed capability graph.
#[derive(Debug, Clone, Default)]
pub struct CapabilityGraph {
    nodes: Vec<Node>,
    /// Index: label -> node
    by_label: HashMap<String, NodeId>,
}

impl CapabilityGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.by_label.contains_key(&node.label) {
            return Err(GraphError::DuplicateName(node.label));
        }
        let id = NodeId(self.nodes.len());
        self.by_label.insert(node.label.clone(), id);
        self.nodes.push(node);
        Ok(id)
    }

    fn require(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::NodeNotFound(id))
    }

    // --- Construction ---

    /// Add a top-level capability seeded from its own settings scope.
    pub fn add_module(&mut self, name: &str, arity: Arity) -> Result<NodeId, GraphError> {
        self.insert(Node::new(
            name,
            name,
            NodeKind::Module {
                state: StateTable::new(arity),
            },
        ))
    }

    /// Create a function under `module` and attach it as the module's child.
    pub fn create_function(&mut self, module: NodeId, name: &str) -> Result<NodeId, GraphError> {
        let owner = self.require(module)?;
        let arity = match &owner.kind {
            NodeKind::Module { state } => state.arity(),
            _ => {
                return Err(GraphError::WrongKind {
                    node: owner.label.clone(),
                    expected: "module",
                })
            }
        };
        self.attach_function(module, module, arity, name)
    }

    /// Create a function nested under another function.
    ///
    /// The nested function shares the owning module's settings scope.
    pub fn create_sub_function(
        &mut self,
        function: NodeId,
        name: &str,
    ) -> Result<NodeId, GraphError> {
        let owner = self.require(function)?;
        let (module, arity) = match &owner.kind {
            NodeKind::Function { module, state } => (*module, state.arity()),
            _ => {
                return Err(GraphError::WrongKind {
                    node: owner.label.clone(),
                    expected: "function",
                })
            }
        };
        self.attach_function(function, module, arity, name)
    }

    fn attach_function(
        &mut self,
        parent: NodeId,
        module: NodeId,
        arity: Arity,
        name: &str,
    ) -> Result<NodeId, GraphError> {
        let label = format!("{}.{}", self.require(parent)?.label, name);
        let id = self.insert(Node::new(
            name,
            label,
            NodeKind::Function {
                module,
                state: StateTable::new(arity),
            },
        ))?;
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Get (or create) the projected view of `owner`.
    ///
    /// Views are deduplicated per owner and projection.
    pub fn add_view(&mut self, owner: NodeId, projection: Projection) -> Result<NodeId, GraphError> {
        let target = self.require(owner)?;
        if target.is_view() {
            return Err(GraphError::WrongKind {
                node: target.label.clone(),
                expected: "module or function",
            });
        }
        let label = format!("{}@{}", target.label, projection);
        if let Some(&existing) = self.by_label.get(&label) {
            return Ok(existing);
        }
        let name = target.name.clone();
        self.insert(Node::new(name, label, NodeKind::View { owner, projection }))
    }

    /// `add_view(owner, Projection::Type)`.
    pub fn add_type_view(&mut self, owner: NodeId) -> Result<NodeId, GraphError> {
        self.add_view(owner, Projection::Type)
    }

    /// `add_view(owner, Projection::Value)`.
    pub fn add_value_view(&mut self, owner: NodeId) -> Result<NodeId, GraphError> {
        self.add_view(owner, Projection::Value)
    }

    /// Add the edge `parent -> child`, registering `parent` among the
    /// child's parents.
    ///
    /// Rejects self-edges and edges that would close a cycle. Adding an
    /// existing edge again is a no-op.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), GraphError> {
        let parent_label = self.require(parent)?.label.clone();
        let child_label = self.require(child)?.label.clone();

        if self.nodes[parent.0].children.contains(&child) {
            return Ok(());
        }
        if parent == child || self.reaches(child, parent) {
            return Err(GraphError::CycleDetected {
                parent: parent_label,
                child: child_label,
            });
        }

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parents.push(parent);
        Ok(())
    }

    /// True if `to` is reachable from `from` by following child edges.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if visited.insert(id) {
                stack.extend(self.nodes[id.0].children.iter().copied());
            }
        }
        false
    }

    /// Seed a slot before resolution. The seed is merged into the current
    /// value, so seeding never lowers a slot.
    pub fn seed(
        &mut self,
        id: NodeId,
        key: AxisTag,
        value: AxisTag,
        seed: Lattice,
    ) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(GraphError::NodeNotFound(id))?;
        let label = node.label.clone();
        let state = node.state_mut().ok_or(GraphError::WrongKind {
            node: label,
            expected: "module or function",
        })?;
        let current = state.get(key, value);
        state.set(key, value, current.merge(seed));
        Ok(())
    }

    // --- Lookup ---

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Look up a node by label (`Map`, `Map.Sorted`, `Collection@value`).
    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_ids(&self) -> impl DoubleEndedIterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    /// The module whose settings scope seeds `id`.
    pub fn module_of(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id)?.kind {
            NodeKind::Module { .. } => Some(id),
            NodeKind::Function { module, .. } => Some(module),
            NodeKind::View { .. } => None,
        }
    }

    // --- State queries ---

    /// State of `id` at (key, value).
    ///
    /// Views read their owner under the projected axis order. Unknown ids
    /// read as `Unknown`.
    pub fn get_state(&self, id: NodeId, key: AxisTag, value: AxisTag) -> Lattice {
        let Some(node) = self.node(id) else {
            return Lattice::Unknown;
        };
        match &node.kind {
            NodeKind::Module { state } | NodeKind::Function { state, .. } => state.get(key, value),
            NodeKind::View { owner, projection } => {
                let (k, v) = match projection {
                    Projection::Type => (key, key),
                    Projection::Value => (value, key),
                };
                match self.node(*owner).and_then(Node::state) {
                    Some(state) => state.get(k, v),
                    None => Lattice::Unknown,
                }
            }
        }
    }

    /// Whether `id` is enabled at (key, value).
    ///
    /// A value view answers with its owner's *untransposed* flag, unlike
    /// [`get_state`](Self::get_state) which transposes.
    pub fn is_enabled(&self, id: NodeId, key: AxisTag, value: AxisTag) -> bool {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::View {
                owner,
                projection: Projection::Value,
            }) => self.is_enabled(*owner, key, value),
            Some(_) => self.get_state(id, key, value) == Lattice::Enabled,
            None => false,
        }
    }

    /// Aggregate of the children's states: `Enabled` as soon as any child
    /// is enabled, otherwise `Unknown`.
    pub fn child_state(&self, id: NodeId, key: AxisTag, value: AxisTag) -> Lattice {
        let Some(node) = self.node(id) else {
            return Lattice::Unknown;
        };
        let mut state = Lattice::Unknown;
        for &child in &node.children {
            if state == Lattice::Enabled {
                return state;
            }
            state = state.merge_down(self.get_state(child, key, value));
        }
        state
    }

    /// Aggregate of the parents' states: `Disabled` as soon as any parent
    /// is disabled, otherwise `Unknown`.
    pub fn parent_state(&self, id: NodeId, key: AxisTag, value: AxisTag) -> Lattice {
        let Some(node) = self.node(id) else {
            return Lattice::Unknown;
        };
        let mut state = Lattice::Unknown;
        for &parent in &node.parents {
            if state == Lattice::Disabled {
                return state;
            }
            state = state.merge_up(self.get_state(parent, key, value));
        }
        state
    }

    // --- Resolution ---

    /// Recompute one slot from its neighbours. Returns true if it changed.
    ///
    /// Views never change.
    pub fn resolve_step(&mut self, id: NodeId, key: AxisTag, value: AxisTag) -> bool {
        let Some(own) = self.node(id).and_then(Node::state).map(|s| s.get(key, value)) else {
            return false;
        };
        let next = own
            .merge(self.child_state(id, key, value))
            .merge(self.parent_state(id, key, value));
        if next == own {
            return false;
        }
        if let Some(state) = self.nodes[id.0].state_mut() {
            state.set(key, value, next);
        }
        true
    }

    /// Run [`resolve_step`](Self::resolve_step) over every slot `id` owns
    /// within `axes`. Returns the number of slots that changed.
    pub fn resolve_node(&mut self, id: NodeId, axes: &AxisSet) -> usize {
        let slots = match self.node(id).and_then(Node::state) {
            Some(state) => state.slots(axes),
            None => return 0,
        };
        slots
            .into_iter()
            .filter(|&(k, v)| self.resolve_step(id, k, v))
            .count()
    }

    // --- Structure ---

    /// Order nodes so every parent precedes its children.
    ///
    /// The order is deterministic for a given insertion sequence.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.parents.len()).collect();
        let mut queue: Vec<NodeId> = self
            .node_ids()
            .filter(|id| in_degree[id.0] == 0)
            .rev()
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop() {
            order.push(id);
            let mut ready = Vec::new();
            for child in &self.nodes[id.0].children {
                in_degree[child.0] -= 1;
                if in_degree[child.0] == 0 {
                    ready.push(*child);
                }
            }
            ready.sort_by(|a, b| b.cmp(a));
            queue.extend(ready);
        }

        if order.len() != self.nodes.len() {
            let stuck = self
                .node_ids()
                .find(|id| in_degree[id.0] > 0)
                .map(|id| self.nodes[id.0].label.clone())
                .unwrap_or_default();
            return Err(GraphError::CycleDetected {
                parent: stuck.clone(),
                child: stuck,
            });
        }
        Ok(order)
    }

    /// Number of edges on the longest parent-to-child path.
    pub fn longest_chain(&self) -> Result<usize, GraphError> {
        let order = self.topological_order()?;
        let mut depth = vec![0usize; self.nodes.len()];
        for id in order {
            for child in &self.nodes[id.0].children {
                depth[child.0] = depth[child.0].max(depth[id.0] + 1);
            }
        }
        Ok(depth.into_iter().max().unwrap_or(0))
    }
}
