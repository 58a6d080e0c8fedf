//! XDG Base Directory paths for cheese.
//!
//! CLI tools should use XDG paths for cross-platform consistency,
//! not platform-native paths.

use std::path::PathBuf;

/// Get the cheese config directory.
///
/// Returns `$XDG_CONFIG_HOME/cheese` if set, otherwise `~/.config/cheese`.
/// The plugin configuration store and dynamic plugins live here.
///
/// # Examples
///
/// ```
/// use cheese_paths::config_dir;
///
/// let store = config_dir().join("plugins.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("cheese")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/cheese")
    } else {
        PathBuf::from(".config/cheese")
    }
}

/// Path of the plugin configuration store (`<config_dir>/plugins.toml`).
pub fn plugin_store_path() -> PathBuf {
    config_dir().join("plugins.toml")
}

/// Directory searched for dynamically loaded plugins (`<config_dir>/plugins`).
pub fn plugin_dir() -> PathBuf {
    config_dir().join("plugins")
}

/// Default directory for captured snapshots (`<config_dir>/captures`).
pub fn capture_dir() -> PathBuf {
    config_dir().join("captures")
}
