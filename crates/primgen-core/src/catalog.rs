//! Capability catalog: which modules exist, what functions they carry, and
//! what they require.
//!
//! A catalog is declared in TOML:
//!
//! ```toml
//! [[module]]
//! name = "Map"
//! arity = "pair"
//! requires = ["Function", { module = "Collection", projection = "value" }]
//!
//! [[module.functions]]
//! name = "LinkedHashMap"
//! requires = ["HashMap"]
//! ```
//!
//! A requirement becomes the parent of the capability that needs it. A
//! projected requirement is attached through a view of the required module.

use std::collections::HashSet;
use std::path::Path;

use primgen_settings::{SettingsError, SettingsTree, ENABLED_KEY};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::{AxisSet, AxisTag};
use crate::error::CatalogError;
use crate::graph::node::{NodeId, Projection};
use crate::graph::state::Arity;
use crate::graph::CapabilityGraph;

/// A module's dependency on another module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RequirementRepr")]
pub struct Requirement {
    pub module: String,
    /// Read the required module through a projected view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequirementRepr {
    Name(String),
    Full {
        module: String,
        #[serde(default)]
        projection: Option<Projection>,
    },
}

impl From<RequirementRepr> for Requirement {
    fn from(repr: RequirementRepr) -> Self {
        match repr {
            RequirementRepr::Name(module) => Requirement {
                module,
                projection: None,
            },
            RequirementRepr::Full { module, projection } => Requirement { module, projection },
        }
    }
}

impl Requirement {
    pub fn direct(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            projection: None,
        }
    }

    pub fn projected(module: impl Into<String>, projection: Projection) -> Self {
        Self {
            module: module.into(),
            projection: Some(projection),
        }
    }
}

/// A function inside a module; functions may nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    /// Sibling functions this one needs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDef>,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Builder: require a sibling function.
    pub fn requires(mut self, sibling: impl Into<String>) -> Self {
        self.requires.push(sibling.into());
        self
    }

    /// Builder: nest a function.
    pub fn with_function(mut self, function: FunctionDef) -> Self {
        self.functions.push(function);
        self
    }
}

/// A top-level capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDef {
    pub name: String,
    pub arity: Arity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDef>,
}

impl ModuleDef {
    pub fn new(name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            arity,
            requires: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Builder: add a requirement.
    pub fn requires(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }

    /// Builder: add a function.
    pub fn with_function(mut self, function: FunctionDef) -> Self {
        self.functions.push(function);
        self
    }
}

/// The full set of modules known to a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDef>,
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != ENABLED_KEY
        && !name.contains('.')
        && !name.contains('@')
        && AxisTag::from_path(name).is_none()
}

fn validate_functions(
    module: &str,
    functions: &[FunctionDef],
    issues: &mut Vec<CatalogError>,
) {
    let mut seen = HashSet::new();
    for function in functions {
        if !valid_name(&function.name) {
            issues.push(CatalogError::InvalidName(function.name.clone()));
        }
        if !seen.insert(function.name.as_str()) {
            issues.push(CatalogError::DuplicateFunction {
                module: module.to_string(),
                function: function.name.clone(),
            });
        }
    }
    for function in functions {
        for required in &function.requires {
            if !functions.iter().any(|f| &f.name == required) || required == &function.name {
                issues.push(CatalogError::UnknownFunction {
                    module: module.to_string(),
                    function: function.name.clone(),
                    required: required.clone(),
                });
            }
        }
        validate_functions(module, &function.functions, issues);
    }
}

impl Catalog {
    pub fn new(modules: Vec<ModuleDef>) -> Self {
        Self { modules }
    }

    /// The built-in module set.
    pub fn standard() -> Self {
        use Arity::*;
        let f = FunctionDef::new;
        Self::new(vec![
            ModuleDef::new("Function", Pair)
                .with_function(f("Consumer"))
                .with_function(f("Operator")),
            ModuleDef::new("Collection", Single)
                .with_function(f("Iterator"))
                .with_function(f("Stream").requires("Iterator"))
                .with_function(f("Splititerator").requires("Iterator"))
                .with_function(f("Strategy")),
            ModuleDef::new("List", Single)
                .requires(Requirement::direct("Collection"))
                .with_function(f("ArrayList"))
                .with_function(f("LinkedList"))
                .with_function(f("ImmutableList"))
                .with_function(f("CopyOnWriteList").requires("ArrayList")),
            ModuleDef::new("Set", Single)
                .requires(Requirement::direct("Collection"))
                .with_function(f("Sorted"))
                .with_function(f("HashSet").with_function(f("LinkedHashSet")))
                .with_function(f("TreeSet").requires("Sorted"))
                .with_function(f("ArraySet"))
                .with_function(f("ImmutableSet")),
            ModuleDef::new("Queue", Single)
                .requires(Requirement::direct("Collection"))
                .with_function(f("ArrayQueue"))
                .with_function(f("PriorityQueue")),
            ModuleDef::new("Map", Pair)
                .requires(Requirement::direct("Set"))
                .requires(Requirement::projected("Collection", Projection::Value))
                .requires(Requirement::projected("Function", Projection::Type))
                .with_function(f("Sorted"))
                .with_function(f("HashMap").with_function(f("LinkedHashMap")))
                .with_function(f("TreeMap").requires("Sorted"))
                .with_function(f("ConcurrentMap"))
                .with_function(f("ImmutableMap"))
                .with_function(f("EnumMap")),
            ModuleDef::new("Pair", Pair)
                .with_function(f("Mutable"))
                .with_function(f("Immutable")),
            ModuleDef::new("Async", Single).requires(Requirement::direct("Collection")),
        ])
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDef> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Check names and references. Returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<CatalogError>> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for module in &self.modules {
            if !valid_name(&module.name) {
                issues.push(CatalogError::InvalidName(module.name.clone()));
            }
            if !seen.insert(module.name.as_str()) {
                issues.push(CatalogError::DuplicateModule(module.name.clone()));
            }
        }

        for module in &self.modules {
            for requirement in &module.requires {
                if requirement.module == module.name {
                    issues.push(CatalogError::SelfRequirement(module.name.clone()));
                } else if self.module(&requirement.module).is_none() {
                    issues.push(CatalogError::UnknownModule {
                        module: module.name.clone(),
                        required: requirement.module.clone(),
                    });
                }
            }
            validate_functions(&module.name, &module.functions, &mut issues);
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Instantiate the capability graph.
    ///
    /// Fails with the first validation issue, or with a graph error if the
    /// requirements form a cycle.
    pub fn build_graph(&self) -> Result<CapabilityGraph, CatalogError> {
        if let Err(issues) = self.validate() {
            if let Some(first) = issues.into_iter().next() {
                return Err(first);
            }
        }

        let mut graph = CapabilityGraph::new();
        let mut module_ids = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            let id = graph.add_module(&module.name, module.arity)?;
            add_functions(&mut graph, id, true, &module.functions)?;
            module_ids.push(id);
        }

        for (module, &id) in self.modules.iter().zip(&module_ids) {
            for requirement in &module.requires {
                let required = graph
                    .find(&requirement.module)
                    .ok_or_else(|| CatalogError::UnknownModule {
                        module: module.name.clone(),
                        required: requirement.module.clone(),
                    })?;
                let parent = match requirement.projection {
                    None => required,
                    Some(projection) => graph.add_view(required, projection)?,
                };
                graph.add_child(parent, id)?;
            }
        }

        debug!(
            modules = self.modules.len(),
            nodes = graph.len(),
            edges = graph.edge_count(),
            "built capability graph"
        );
        Ok(graph)
    }

    /// Populate `settings` with every scope this catalog can be configured
    /// at, without changing any existing value.
    ///
    /// Module scopes at the root get `Enabled = true` and their function
    /// leaves default to `true`; per-axis scopes are created empty so they
    /// inherit until an override is written into them.
    pub fn scaffold(&self, settings: &mut SettingsTree, axes: &AxisSet) -> Result<(), SettingsError> {
        for module in &self.modules {
            settings.get_or_create_subtree(&[module.name.as_str()], true)?;
            scaffold_functions(settings, &module.name, &module.functions)?;
        }
        for key in axes.iter() {
            settings.get_or_create_subtree(&[key.path()], false)?;
            for module in &self.modules {
                match module.arity {
                    Arity::Single => {
                        settings.get_or_create_subtree(&[key.path(), module.name.as_str()], false)?;
                    }
                    Arity::Pair => {
                        for value in axes.iter() {
                            settings.get_or_create_subtree(
                                &[key.path(), value.path(), module.name.as_str()],
                                false,
                            )?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn add_functions(
    graph: &mut CapabilityGraph,
    parent: NodeId,
    parent_is_module: bool,
    functions: &[FunctionDef],
) -> Result<(), CatalogError> {
    let mut ids = Vec::with_capacity(functions.len());
    for function in functions {
        let id = if parent_is_module {
            graph.create_function(parent, &function.name)?
        } else {
            graph.create_sub_function(parent, &function.name)?
        };
        add_functions(graph, id, false, &function.functions)?;
        ids.push(id);
    }
    for (function, &id) in functions.iter().zip(&ids) {
        for required in &function.requires {
            if let Some(pos) = functions.iter().position(|f| &f.name == required) {
                graph.add_child(ids[pos], id)?;
            }
        }
    }
    Ok(())
}

fn scaffold_functions(
    settings: &mut SettingsTree,
    module: &str,
    functions: &[FunctionDef],
) -> Result<(), SettingsError> {
    for function in functions {
        settings.ensure_bool(&[module, function.name.as_str()], true)?;
        scaffold_functions(settings, module, &function.functions)?;
    }
    Ok(())
}

/// Parse a catalog from TOML.
pub fn parse_catalog(toml_str: &str) -> Result<Catalog, CatalogError> {
    Ok(toml::from_str(toml_str)?)
}

/// Load a catalog from a TOML file.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_catalog(&content)
}

/// Serialize a catalog to pretty TOML.
pub fn catalog_to_toml(catalog: &Catalog) -> Result<String, CatalogError> {
    Ok(toml::to_string_pretty(catalog)?)
}
