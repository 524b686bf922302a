//! Error types for resolution and catalog handling.

use std::path::PathBuf;

use crate::graph::GraphError;

/// Errors from the resolution driver.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("resolution did not converge within {passes} passes")]
    NotConverged { passes: usize },
}

/// Errors from loading, validating, or instantiating a capability catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("invalid capability name '{0}'")]
    InvalidName(String),

    #[error("duplicate module '{0}'")]
    DuplicateModule(String),

    #[error("duplicate function '{function}' in module '{module}'")]
    DuplicateFunction { module: String, function: String },

    #[error("module '{module}' requires unknown module '{required}'")]
    UnknownModule { module: String, required: String },

    #[error("module '{0}' requires itself")]
    SelfRequirement(String),

    #[error("function '{function}' in module '{module}' requires unknown sibling '{required}'")]
    UnknownFunction {
        module: String,
        function: String,
        required: String,
    },
}
