//! cheese-core: plugin host and capture runner for cheese
//!
//! - **Plugin host** - [`PluginHost`] registers plugins, stores their
//!   configuration, and dispatches capture phases with failure isolation
//! - **Capture runner** - [`CaptureRunner`] drives one capture through
//!   pre-capture, the capture device, post-capture, and capture-ready

pub mod plugins;
pub mod runner;

pub use plugins::{
    ConfigStatus, ConfigStore, HookOutcome, HookStatus, PhaseReport, PluginHost, PluginHostConfig,
    PluginHostError, PluginInfo, PluginState,
};
pub use runner::{CaptureDevice, CaptureReport, CaptureRunner, RunnerError, StillImageDevice};
