//! cheese-plugin-api - Plugin API for the cheese capture pipeline
//!
//! This crate provides the traits and types needed to write plugins for
//! cheese. A plugin declares which capture phases it takes part in, the
//! options it wants persisted, and implements any of three hooks:
//!
//! 1. `run_pre_capture` - before the camera produces a frame
//! 2. `run_post_capture` - right after, with mutable access to the frame
//! 3. `run_capture_ready` - once every plugin's post-capture hook finished
//!
//! The host only calls a hook after [`Plugin::valid_configuration`] admits
//! the plugin.
//!
//! # Example
//!
//! ```ignore
//! use cheese_plugin_api::{Phase, Plugin, PluginContext, PluginError, RunnerOrder, export_plugin};
//!
//! #[derive(Default)]
//! pub struct Shout;
//!
//! impl Plugin for Shout {
//!     fn name(&self) -> &str {
//!         "shout"
//!     }
//!
//!     fn runner_order(&self) -> RunnerOrder {
//!         RunnerOrder::new([Phase::PreCapture])
//!     }
//!
//!     fn run_pre_capture(&mut self, ctx: &PluginContext<'_>) -> Result<(), PluginError> {
//!         ctx.say("SMILE");
//!         Ok(())
//!     }
//! }
//!
//! export_plugin!(Shout);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod options;
pub mod types;

pub use config::{PluginConfiguration, Prompter, ScriptedPrompter, configure_with_schema};
pub use context::{Console, PluginContext, RecordingConsole, StdoutConsole};
pub use error::PluginError;
pub use options::{ENABLED_KEY, OptionKind, OptionSpec, OptionValue, parse_user_input};
pub use types::*;

/// Current plugin API version. Plugins must match this exactly.
/// This is checked when loading dynamic plugins to ensure compatibility.
pub const API_VERSION: u32 = 1;

/// The core plugin trait - implement this to create a cheese plugin.
///
/// Only `name` and `runner_order` are required. Hooks default to no-ops and
/// the admission predicates default to "configured and enabled".
pub trait Plugin: Send {
    /// Unique, stable identifier. Also the configuration store key.
    fn name(&self) -> &str;

    /// Phases this plugin takes part in. Read once at registration.
    fn runner_order(&self) -> RunnerOrder;

    /// Options persisted for this plugin, in prompt order.
    ///
    /// `enabled` is implied and always asked first.
    fn options(&self) -> Vec<OptionSpec> {
        Vec::new()
    }

    // ─── Admission ───────────────────────────────────────────────────

    /// Whether the configuration flow has been run for this plugin.
    ///
    /// Override to demand more than a persisted record.
    fn configured(&self, configuration: Option<&PluginConfiguration>) -> bool {
        configuration.is_some()
    }

    /// Whether the persisted `enabled` flag is set.
    fn enabled(&self, configuration: Option<&PluginConfiguration>) -> bool {
        configuration.is_some_and(|c| c.enabled)
    }

    /// Admission check run by the host immediately before every hook.
    ///
    /// The error text is shown to the user, so it should say how to fix the
    /// problem.
    fn valid_configuration(
        &self,
        configuration: Option<&PluginConfiguration>,
    ) -> Result<(), PluginError> {
        if !self.configured(configuration) {
            return Err(PluginError::NotConfigured {
                plugin: self.name().to_string(),
            });
        }
        if !self.enabled(configuration) {
            return Err(PluginError::Disabled {
                plugin: self.name().to_string(),
            });
        }
        if let Some(configuration) = configuration {
            let schema = self.options();
            let missing = configuration.missing_required(&schema);
            if !missing.is_empty() {
                return Err(PluginError::InvalidConfiguration {
                    plugin: self.name().to_string(),
                    reason: format!("missing {}", missing.join(", ")),
                });
            }
        }
        Ok(())
    }

    // ─── Configuration ───────────────────────────────────────────────

    /// Interactive setup. Returns the complete new configuration; the host
    /// persists it in place of whatever was stored before.
    fn configure_options(
        &self,
        prompter: &mut dyn Prompter,
    ) -> Result<PluginConfiguration, PluginError> {
        configure_with_schema(&self.options(), prompter)
    }

    // ─── Hooks (default no-ops) ──────────────────────────────────────

    /// Called before the capture device produces a frame
    fn run_pre_capture(&mut self, _ctx: &PluginContext<'_>) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called right after the frame is produced
    fn run_post_capture(
        &mut self,
        _ctx: &PluginContext<'_>,
        _snapshot: &mut Snapshot,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called after every plugin's post-capture hook has completed
    fn run_capture_ready(
        &mut self,
        _ctx: &PluginContext<'_>,
        _snapshot: &Snapshot,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Export a plugin type for dynamic loading.
///
/// This macro generates the C ABI entry points that cheese uses to load
/// and unload plugins dynamically.
///
/// # Usage
///
/// ```ignore
/// cheese_plugin_api::export_plugin!(MyPlugin);
/// ```
///
/// # Generated Functions
///
/// - `_cheese_plugin_create()`: Creates a new plugin instance
/// - `_cheese_plugin_api_version()`: Returns the API version
/// - `_cheese_plugin_destroy()`: Destroys a plugin instance
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _cheese_plugin_create() -> *mut dyn $crate::Plugin {
            let plugin: Box<dyn $crate::Plugin> = Box::new(<$plugin_type>::default());
            Box::into_raw(plugin)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _cheese_plugin_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _cheese_plugin_destroy(ptr: *mut dyn $crate::Plugin) {
            if !ptr.is_null() {
                unsafe {
                    drop(Box::from_raw(ptr));
                }
            }
        }
    };
}
