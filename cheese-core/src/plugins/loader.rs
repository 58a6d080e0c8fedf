//! Dynamic plugin loading from shared libraries
//!
//! Each plugin lives in its own directory under the plugin dir:
//! `<plugin_dir>/<name>/<name>.so` (or `lib<name>.so`, `.dylib`, `.dll`).

use libloading::Library;
use std::path::{Path, PathBuf};

use cheese_plugin_api::{API_VERSION, Plugin};

use super::error::PluginHostError;

/// A plugin instance together with the library its code lives in.
///
/// Field order matters: the instance must drop before the library.
pub struct DynamicPlugin {
    pub instance: Box<dyn Plugin>,
    pub library: Library,
    pub path: PathBuf,
}

impl std::fmt::Debug for DynamicPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicPlugin")
            .field("name", &self.instance.name())
            .field("path", &self.path)
            .finish()
    }
}

/// Finds and opens plugin libraries
#[derive(Debug, Clone)]
pub struct PluginLoader {
    plugin_dir: PathBuf,
}

impl PluginLoader {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }

    /// Discover plugin directories, sorted by name so registration order is
    /// stable between runs
    pub fn discover(&self) -> Result<Vec<PathBuf>, PluginHostError> {
        if !self.plugin_dir.exists() {
            tracing::debug!(dir = %self.plugin_dir.display(), "Plugin directory does not exist");
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.plugin_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }

    /// Load a single plugin from its directory
    pub fn load(&self, dir: &Path) -> Result<DynamicPlugin, PluginHostError> {
        let dir_name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PluginHostError::PluginDirNotFound {
                path: dir.to_path_buf(),
            })?;

        let lib_path = find_library(dir, dir_name)?;

        // SAFETY: the user installed this library into the plugin directory
        // and it is expected to follow the Plugin trait contract.
        let library = unsafe { Library::new(&lib_path)? };

        // SAFETY: calling a C function exported by the plugin.
        let api_version_fn: libloading::Symbol<extern "C" fn() -> u32> =
            unsafe { library.get(b"_cheese_plugin_api_version")? };

        let plugin_api_version = api_version_fn();
        if plugin_api_version != API_VERSION {
            return Err(PluginHostError::ApiVersionMismatch {
                expected: API_VERSION,
                found: plugin_api_version,
            });
        }

        // SAFETY: the create function returns a pointer produced by
        // Box::into_raw, which we take back ownership of.
        let create_fn: libloading::Symbol<extern "C" fn() -> *mut dyn Plugin> =
            unsafe { library.get(b"_cheese_plugin_create")? };
        let instance = unsafe { Box::from_raw(create_fn()) };

        if instance.name() != dir_name {
            tracing::warn!(
                dir = %dir.display(),
                plugin = %instance.name(),
                "Plugin name differs from its directory name"
            );
        }

        Ok(DynamicPlugin {
            instance,
            library,
            path: lib_path,
        })
    }
}

/// Find the library file in a plugin directory
fn find_library(dir: &Path, name: &str) -> Result<PathBuf, PluginHostError> {
    let extensions: &[&str] = if cfg!(target_os = "macos") {
        &["dylib", "so"]
    } else if cfg!(target_os = "windows") {
        &["dll"]
    } else {
        &["so"]
    };

    for ext in extensions {
        let lib_path = dir.join(format!("{name}.{ext}"));
        if lib_path.exists() {
            return Ok(lib_path);
        }

        // Cargo names cdylibs lib<crate>.<ext>
        let lib_path = dir.join(format!("lib{name}.{ext}"));
        if lib_path.exists() {
            return Ok(lib_path);
        }
    }

    Err(PluginHostError::LibraryNotFound {
        dir: dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let loader = PluginLoader::new("/nonexistent/cheese/plugins");
        assert!(loader.discover().unwrap().is_empty());
    }

    #[test]
    fn test_discover_only_lists_directories_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("zeta")).unwrap();
        std::fs::create_dir(dir.path().join("alpha")).unwrap();
        std::fs::write(dir.path().join("README"), "not a plugin").unwrap();

        let found = PluginLoader::new(dir.path()).discover().unwrap();
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_find_library_not_found() {
        let dir = TempDir::new().unwrap();
        let result = find_library(dir.path(), "nonexistent");
        assert!(matches!(
            result,
            Err(PluginHostError::LibraryNotFound { .. })
        ));
    }

    #[test]
    fn test_load_without_library_fails() {
        let dir = TempDir::new().unwrap();
        let plugin_dir = dir.path().join("plugin-sample");
        std::fs::create_dir(&plugin_dir).unwrap();

        let result = PluginLoader::new(dir.path()).load(&plugin_dir);
        assert!(matches!(
            result,
            Err(PluginHostError::LibraryNotFound { .. })
        ));
    }
}
