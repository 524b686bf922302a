//! Error types for settings operations.

use std::path::PathBuf;

/// Errors that can occur while loading, saving, or editing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading/writing settings files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file not found.
    #[error("settings file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// File extension is neither `.toml` nor `.json`.
    #[error("unsupported settings format: {}", path.display())]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,
    },

    /// A path segment names a boolean leaf where a table was required.
    #[error("settings entry '{path}' is a boolean, not a table")]
    NotATable {
        /// Dotted path of the conflicting entry.
        path: String,
    },

    /// A write was requested with an empty key path.
    #[error("empty settings path")]
    EmptyPath,
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
