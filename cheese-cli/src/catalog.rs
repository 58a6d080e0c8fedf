//! Plugins compiled into the cheese binary, and host construction

use anyhow::{Context, Result};
use std::path::PathBuf;

use cheese_core::{PluginHost, PluginHostConfig};
use cheese_plugin_api::Plugin;
use cheese_sample::SamplePlugin;

/// Plugins that ship with cheese, in registration order
pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
    vec![Box::new(SamplePlugin::new())]
}

/// Host configuration, with an optional store path override
pub fn host_config(store_override: Option<PathBuf>) -> PluginHostConfig {
    let mut config = PluginHostConfig::default();
    if let Some(path) = store_override {
        config.store_path = path;
    }
    config
}

/// Build a host with every built-in plugin plus the dynamic ones installed
/// in the plugin directory
pub fn build_host(config: PluginHostConfig) -> Result<PluginHost> {
    let store_path = config.store_path.clone();
    let mut host = PluginHost::new(config)
        .with_context(|| format!("Failed to load {}", store_path.display()))?;

    for plugin in builtin_plugins() {
        host.register(plugin)?;
    }

    let loaded = host.load_dynamic()?;
    tracing::debug!(builtin = host.plugin_count() - loaded, dynamic = loaded, "Plugins registered");

    Ok(host)
}
