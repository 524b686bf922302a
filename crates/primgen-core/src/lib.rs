//! Capability resolution for the primgen code generator.
//!
//! Capabilities (modules, functions inside modules, and projected views of
//! either) form a directed acyclic graph whose edges point from a
//! requirement to the capability that depends on it. Every capability holds
//! one [`Lattice`] value per axis slot. Slots are seeded from a
//! [`primgen_settings::SettingsTree`] and then resolved to a fixed point:
//! an enabled dependent enables its requirements, a disabled requirement
//! disables its dependents.
//!
//! ```no_run
//! use primgen_core::{resolve, seed, AxisSet, Catalog, EnablementMatrix};
//! use primgen_settings::SettingsTree;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SettingsTree::new();
//! let axes = AxisSet::all();
//! let mut graph = Catalog::standard().build_graph()?;
//! seed::load(&mut graph, &settings, &axes)?;
//! resolve::resolve(&mut graph, &axes)?;
//! let matrix = EnablementMatrix::collect(&graph, &axes);
//! println!("{matrix}");
//! # Ok(())
//! # }
//! ```

pub mod axis;
pub mod catalog;
pub mod error;
pub mod graph;
pub mod lattice;
pub mod matrix;
pub mod resolve;
pub mod seed;

pub use axis::{AxisSet, AxisTag, ParseAxisError};
pub use catalog::{
    catalog_to_toml, load_catalog, parse_catalog, Catalog, FunctionDef, ModuleDef, Requirement,
};
pub use error::{CatalogError, ResolveError};
pub use graph::node::{Node, NodeId, NodeKind, Projection};
pub use graph::state::{Arity, StateTable};
pub use graph::{CapabilityGraph, GraphError};
pub use lattice::Lattice;
pub use matrix::{CapabilityRow, EnablementMatrix, MatrixEntry};
pub use resolve::{ResolveOptions, ResolveReport};
pub use seed::{explain_seed, SeedStep, SeedTrace};
