//! Sample plugin - shows every hook a cheese plugin may implement
//!
//! It participates in all three phases and only prints short messages. The
//! single persisted option is the implied `enabled` flag.
//!
//! This plugin is compiled into the `cheese` binary, so it needs no
//! installing; `cheese plugin config plugin-sample` turns it on.
//!
//! ## Shipping your own plugin
//!
//! The crate also builds as a `cdylib` and can serve as a template for an
//! out-of-tree plugin. Copy it, give [`NAME`] a new value, and install the
//! library into a directory named after the plugin. The library file must be
//! renamed to `<name>.so` (or `lib<name>.so`) to be found. A plugin named
//! `plugin-sample` would clash with the built-in one and stop cheese from
//! starting.
//!
//! ```bash
//! cargo build --release -p my-plugin
//! mkdir -p ~/.config/cheese/plugins/my-plugin
//! cp target/release/libmy_plugin.so ~/.config/cheese/plugins/my-plugin/my-plugin.so
//! cheese plugin config my-plugin
//! ```

use cheese_plugin_api::{
    Phase, Plugin, PluginContext, PluginError, RunnerOrder, Snapshot, export_plugin,
};

/// Name under which the sample plugin registers and is configured
pub const NAME: &str = "plugin-sample";

#[derive(Debug, Default)]
pub struct SamplePlugin;

impl SamplePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for SamplePlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn runner_order(&self) -> RunnerOrder {
        RunnerOrder::new([Phase::PreCapture, Phase::PostCapture, Phase::CaptureReady])
    }

    fn run_pre_capture(&mut self, ctx: &PluginContext<'_>) -> Result<(), PluginError> {
        ctx.say("✨  Say cheese 😁 !");
        Ok(())
    }

    fn run_post_capture(
        &mut self,
        ctx: &PluginContext<'_>,
        _snapshot: &mut Snapshot,
    ) -> Result<(), PluginError> {
        ctx.say("📸  Snap ");
        Ok(())
    }

    fn run_capture_ready(
        &mut self,
        ctx: &PluginContext<'_>,
        _snapshot: &Snapshot,
    ) -> Result<(), PluginError> {
        ctx.say(&format!(
            "✨  wow! {} is your best looking commit yet! 😘  💻",
            ctx.sha()
        ));
        Ok(())
    }
}

export_plugin!(SamplePlugin);
