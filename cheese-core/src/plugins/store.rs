//! Configuration store - persisted plugin configuration keyed by plugin name

use std::collections::BTreeMap;
use std::path::Path;

use cheese_plugin_api::PluginConfiguration;

use super::error::PluginHostError;

/// Every plugin's configuration, owned by the host.
///
/// Stored as TOML, one table per plugin name:
///
/// ```toml
/// [plugin-sample]
/// enabled = true
/// ```
///
/// Entries for plugins that are not currently installed are kept as-is.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigStore {
    plugins: BTreeMap<String, PluginConfiguration>,
}

impl ConfigStore {
    /// Load the store from a TOML file
    ///
    /// Returns an empty store if the file doesn't exist. Empty tables count
    /// as "never configured" and are dropped.
    pub fn load(path: &Path) -> Result<Self, PluginHostError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse store contents
    pub fn parse(content: &str) -> Result<Self, PluginHostError> {
        let document: toml::Table =
            toml::from_str(content).map_err(|e| PluginHostError::Store(e.to_string()))?;

        let mut store = Self::default();
        for (name, value) in document {
            let toml::Value::Table(table) = value else {
                return Err(PluginHostError::Store(format!(
                    "entry '{name}' must be a table"
                )));
            };
            let configuration = PluginConfiguration::from_table(&table)
                .map_err(|e| PluginHostError::Store(format!("{name}: {e}")))?;
            if let Some(configuration) = configuration {
                store.plugins.insert(name, configuration);
            }
        }
        Ok(store)
    }

    /// Save the store to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), PluginHostError> {
        let content = self.to_toml()?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Render the store as TOML
    pub fn to_toml(&self) -> Result<String, PluginHostError> {
        let document: toml::Table = self
            .plugins
            .iter()
            .map(|(name, configuration)| {
                (name.clone(), toml::Value::Table(configuration.to_table()))
            })
            .collect();
        toml::to_string_pretty(&document).map_err(|e| PluginHostError::Store(e.to_string()))
    }

    /// Configuration for a plugin, `None` if it was never configured
    pub fn get(&self, name: &str) -> Option<&PluginConfiguration> {
        self.plugins.get(name)
    }

    /// Replace a plugin's configuration wholesale, returning the old one
    pub fn set(
        &mut self,
        name: &str,
        configuration: PluginConfiguration,
    ) -> Option<PluginConfiguration> {
        self.plugins.insert(name.to_string(), configuration)
    }

    /// Forget a plugin's configuration (uninstall/reset)
    pub fn remove(&mut self, name: &str) -> Option<PluginConfiguration> {
        self.plugins.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Names with a stored configuration, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
