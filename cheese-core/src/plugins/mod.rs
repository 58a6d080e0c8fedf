//! Plugin system for cheese
//!
//! This module provides the infrastructure for hosting capture plugins:
//!
//! - [`PluginHost`]: Registers plugins and dispatches capture phases to them
//! - [`ConfigStore`]: Persisted configuration for every plugin
//! - [`PluginLoader`]: Opens plugins compiled as shared libraries
//! - [`PluginHostError`]: Error types for plugin operations
//!
//! # Plugin Discovery
//!
//! Besides plugins registered in code, dynamic plugins are discovered from
//! `~/.config/cheese/plugins/`. Each plugin directory should contain
//! `<name>.so` (or `lib<name>.so`, `.dylib`/`.dll`).
//!
//! # Example
//!
//! ```ignore
//! use cheese_core::plugins::{PluginHost, PluginHostConfig};
//!
//! let mut host = PluginHost::new(PluginHostConfig::default())?;
//! host.register(Box::new(MyPlugin::default()))?;
//! host.load_dynamic()?;
//!
//! let report = host.run_pre_capture(&capture);
//! ```

mod error;
mod host;
mod loader;
mod store;

pub use error::PluginHostError;
pub use host::{
    ConfigStatus, HookOutcome, HookStatus, PhaseCall, PhaseReport, PluginHost, PluginHostConfig,
    PluginInfo, PluginState,
};
pub use loader::{DynamicPlugin, PluginLoader};
pub use store::ConfigStore;
