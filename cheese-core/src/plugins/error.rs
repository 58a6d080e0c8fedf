//! Plugin host error types

use std::path::PathBuf;
use thiserror::Error;

use cheese_plugin_api::PluginError;

/// Errors that can occur in the plugin host
#[derive(Error, Debug)]
pub enum PluginHostError {
    /// Two plugins claim the same name
    #[error("Plugin '{name}' is already registered")]
    DuplicatePlugin { name: String },

    /// A plugin reported an empty or whitespace-padded name
    #[error("Plugin name '{name}' must be non-empty without surrounding whitespace")]
    InvalidName { name: String },

    /// Plugin not found
    #[error("Plugin '{name}' not found")]
    NotFound { name: String },

    /// The configuration flow failed
    #[error("Configuring '{name}' failed: {source}")]
    Configure {
        name: String,
        #[source]
        source: PluginError,
    },

    /// Configuration store error (parsing, saving, etc.)
    #[error("Configuration store error: {0}")]
    Store(String),

    /// Plugin directory not found
    #[error("Plugin directory not found: {path}")]
    PluginDirNotFound { path: PathBuf },

    /// Plugin library not found in directory
    #[error("Plugin library not found in {dir}")]
    LibraryNotFound { dir: PathBuf },

    /// API version mismatch between cheese and plugin
    #[error("API version mismatch: cheese expects {expected}, plugin has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// Failed to load dynamic library
    #[error("Failed to load plugin library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
