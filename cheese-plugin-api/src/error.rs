//! Error types for plugin authors

use thiserror::Error;

/// Errors that plugins can return
#[derive(Error, Debug)]
pub enum PluginError {
    /// The plugin has no persisted configuration yet
    #[error(
        "{plugin} has not been configured, configure it with: cheese plugin config {plugin}"
    )]
    NotConfigured { plugin: String },

    /// The plugin is configured but switched off
    #[error("{plugin} is disabled, enable it with: cheese plugin config {plugin}")]
    Disabled { plugin: String },

    /// The persisted configuration exists but is not usable
    #[error("{plugin} has an invalid configuration: {reason}")]
    InvalidConfiguration { plugin: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A hook could not complete
    #[error("Hook failed: {0}")]
    Hook(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl PluginError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a hook failure
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = PluginError::Config("missing key".to_string());
        assert_eq!(config_err.to_string(), "Configuration error: missing key");

        let hook_err = PluginError::Hook("upload refused".to_string());
        assert_eq!(hook_err.to_string(), "Hook failed: upload refused");

        let custom_err = PluginError::Custom("something happened".to_string());
        assert_eq!(custom_err.to_string(), "something happened");
    }

    #[test]
    fn test_not_configured_explains_how_to_configure() {
        let err = PluginError::NotConfigured {
            plugin: "plugin-sample".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("has not been configured"));
        assert!(msg.contains("cheese plugin config plugin-sample"));
    }

    #[test]
    fn test_disabled_names_plugin() {
        let err = PluginError::Disabled {
            plugin: "uploader".into(),
        };
        assert!(err.to_string().starts_with("uploader is disabled"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let plugin_err: PluginError = io_err.into();

        assert!(matches!(plugin_err, PluginError::Io(_)));
        assert!(plugin_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(PluginError::custom("test"), PluginError::Custom(_)));
        assert!(matches!(PluginError::config("bad"), PluginError::Config(_)));
        assert!(matches!(PluginError::hook("boom"), PluginError::Hook(_)));
        assert!(matches!(
            PluginError::invalid_input("x"),
            PluginError::InvalidInput(_)
        ));
    }
}
