//! PluginContext - the read-only view of a capture handed to every hook

use std::io::Write;
use std::sync::Mutex;

use crate::config::PluginConfiguration;
use crate::types::CaptureInfo;

/// Destination for user-visible plugin output.
///
/// Hooks talk to the user through this rather than printing directly, so the
/// host decides where messages go.
pub trait Console: Send + Sync {
    /// Show one line to the user
    fn say(&self, message: &str);
}

/// Console writing to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn say(&self, message: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not take the capture down with it.
        let _ = writeln!(out, "{message}");
    }
}

/// Console that keeps every line in memory
#[derive(Debug, Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines said so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl Console for RecordingConsole {
    fn say(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

/// Per-call context passed into each hook.
///
/// Everything here is borrowed from the host and read-only: plugins can
/// inspect the current capture and their own configuration, but cannot
/// change either.
#[derive(Clone, Copy)]
pub struct PluginContext<'a> {
    plugin_name: &'a str,
    configuration: &'a PluginConfiguration,
    capture: &'a CaptureInfo,
    console: &'a dyn Console,
}

impl<'a> PluginContext<'a> {
    pub fn new(
        plugin_name: &'a str,
        configuration: &'a PluginConfiguration,
        capture: &'a CaptureInfo,
        console: &'a dyn Console,
    ) -> Self {
        Self {
            plugin_name,
            configuration,
            capture,
            console,
        }
    }

    /// Get the plugin's name
    pub fn plugin_name(&self) -> &'a str {
        self.plugin_name
    }

    /// The plugin's persisted configuration (admission guarantees it exists)
    pub fn configuration(&self) -> &'a PluginConfiguration {
        self.configuration
    }

    /// Run-scoped state of the capture in progress
    pub fn capture(&self) -> &'a CaptureInfo {
        self.capture
    }

    /// Shorthand for the commit sha being captured
    pub fn sha(&self) -> &'a str {
        &self.capture.sha
    }

    // ─── Output ──────────────────────────────────────────────────────

    /// Show a message to the user
    pub fn say(&self, message: &str) {
        self.console.say(message);
    }

    /// Log an info message (automatically prefixed with plugin name)
    pub fn log_info(&self, message: &str) {
        tracing::info!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log a warning message
    pub fn log_warn(&self, message: &str) {
        tracing::warn!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log an error message
    pub fn log_error(&self, message: &str) {
        tracing::error!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log a debug message
    pub fn log_debug(&self, message: &str) {
        tracing::debug!(plugin = %self.plugin_name, "{}", message);
    }
}

impl std::fmt::Debug for PluginContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin_name", &self.plugin_name)
            .field("configuration", &self.configuration)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}
