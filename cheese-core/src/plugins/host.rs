//! PluginHost - manages plugin registration, configuration, and phase dispatch

use libloading::Library;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use cheese_plugin_api::{
    CaptureInfo, Console, Phase, Plugin, PluginConfiguration, PluginContext, PluginError,
    Prompter, RunnerOrder, Snapshot, StdoutConsole,
};

use super::error::PluginHostError;
use super::loader::{DynamicPlugin, PluginLoader};
use super::store::ConfigStore;

/// A registered plugin with its runtime state
struct RegisteredPlugin {
    /// Name captured at registration
    name: String,
    /// Phases captured at registration
    runner_order: RunnerOrder,
    /// Current plugin state
    state: PluginState,
    /// The plugin instance. Declared before `_library` so it drops first.
    instance: Box<dyn Plugin>,
    /// Keep the library loaded for dynamic plugins
    _library: Option<Library>,
}

/// Runtime state of a registered plugin
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Plugin is registered and may be dispatched to
    Loaded,
    /// Plugin panicked and is no longer dispatched to
    Failed { error: String },
}

/// Admission status of a plugin against its persisted configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigStatus {
    /// No configuration has been stored
    Unconfigured,
    /// Configured with `enabled = false`
    Disabled,
    /// Configured but rejected by the plugin's admission check
    Invalid { reason: String },
    /// Admitted: hooks will run
    Enabled,
}

/// Configuration for PluginHost
#[derive(Debug, Clone)]
pub struct PluginHostConfig {
    /// Configuration store file (~/.config/cheese/plugins.toml)
    pub store_path: PathBuf,
    /// Dynamic plugin directory (~/.config/cheese/plugins)
    pub plugin_dir: PathBuf,
}

impl Default for PluginHostConfig {
    fn default() -> Self {
        Self {
            store_path: cheese_paths::plugin_store_path(),
            plugin_dir: cheese_paths::plugin_dir(),
        }
    }
}

/// Information about a plugin
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    /// Plugin name
    pub name: String,
    /// Phases the plugin takes part in, in pipeline order
    pub runner_order: Vec<Phase>,
    /// Admission status
    pub status: ConfigStatus,
    /// Runtime state
    pub state: PluginState,
}

/// What happened to one plugin during one phase
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum HookStatus {
    /// The hook ran and returned Ok
    Ran,
    /// The hook was not called
    Skipped { reason: String },
    /// The hook returned an error
    Failed { error: String },
    /// The hook (or admission check) panicked
    Panicked,
}

/// A single plugin's outcome within a phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookOutcome {
    pub plugin: String,
    #[serde(flatten)]
    pub status: HookStatus,
}

/// Outcomes of every participating plugin for one phase, in dispatch order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub outcomes: Vec<HookOutcome>,
}

impl PhaseReport {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, plugin: &str, status: HookStatus) {
        self.outcomes.push(HookOutcome {
            plugin: plugin.to_string(),
            status,
        });
    }

    /// Plugins whose hook ran successfully
    pub fn ran(&self) -> Vec<&str> {
        self.names_where(|s| matches!(s, HookStatus::Ran))
    }

    /// Plugins that were not admitted
    pub fn skipped(&self) -> Vec<&str> {
        self.names_where(|s| matches!(s, HookStatus::Skipped { .. }))
    }

    /// Plugins whose hook errored or panicked
    pub fn failed(&self) -> Vec<&str> {
        self.names_where(|s| matches!(s, HookStatus::Failed { .. } | HookStatus::Panicked))
    }

    pub fn outcome(&self, plugin: &str) -> Option<&HookStatus> {
        self.outcomes
            .iter()
            .find(|o| o.plugin == plugin)
            .map(|o| &o.status)
    }

    fn names_where(&self, pred: impl Fn(&HookStatus) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| pred(&o.status))
            .map(|o| o.plugin.as_str())
            .collect()
    }
}

/// One phase invocation together with the data its hook receives
pub enum PhaseCall<'s> {
    PreCapture,
    PostCapture(&'s mut Snapshot),
    CaptureReady(&'s Snapshot),
}

impl PhaseCall<'_> {
    pub fn phase(&self) -> Phase {
        match self {
            Self::PreCapture => Phase::PreCapture,
            Self::PostCapture(_) => Phase::PostCapture,
            Self::CaptureReady(_) => Phase::CaptureReady,
        }
    }

    fn invoke(
        &mut self,
        plugin: &mut dyn Plugin,
        ctx: &PluginContext<'_>,
    ) -> Result<(), PluginError> {
        match self {
            Self::PreCapture => plugin.run_pre_capture(ctx),
            Self::PostCapture(snapshot) => plugin.run_post_capture(ctx, &mut **snapshot),
            Self::CaptureReady(snapshot) => plugin.run_capture_ready(ctx, *snapshot),
        }
    }
}

/// The plugin host owns every registered plugin and the configuration store,
/// and dispatches capture phases to admitted plugins in registration order.
pub struct PluginHost {
    /// Registered plugins in registration order
    plugins: Vec<RegisteredPlugin>,
    /// Persisted configuration for every plugin
    store: ConfigStore,
    /// Where the store is saved; `None` keeps it in memory
    store_path: Option<PathBuf>,
    /// Where dynamic plugins are discovered
    plugin_dir: Option<PathBuf>,
    /// Destination for user-visible messages
    console: Arc<dyn Console>,
}

impl std::fmt::Debug for PluginHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.plugins.iter().map(|p| p.name.as_str()).collect();
        f.debug_struct("PluginHost")
            .field("plugins", &names)
            .field("store_path", &self.store_path)
            .field("plugin_dir", &self.plugin_dir)
            .finish_non_exhaustive()
    }
}

impl PluginHost {
    /// Create a plugin host, loading the configuration store from disk
    pub fn new(config: PluginHostConfig) -> Result<Self, PluginHostError> {
        let store = ConfigStore::load(&config.store_path)?;
        tracing::debug!(
            path = %config.store_path.display(),
            configured = store.len(),
            "Loaded plugin configuration"
        );

        Ok(Self {
            plugins: Vec::new(),
            store,
            store_path: Some(config.store_path),
            plugin_dir: Some(config.plugin_dir),
            console: Arc::new(StdoutConsole),
        })
    }

    /// Create a host around an in-memory store that is never saved
    pub fn with_store(store: ConfigStore) -> Self {
        Self {
            plugins: Vec::new(),
            store,
            store_path: None,
            plugin_dir: None,
            console: Arc::new(StdoutConsole),
        }
    }

    /// Builder: route user-visible messages to `console`
    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    /// Register a plugin. Dispatch follows registration order.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginHostError> {
        self.check_name(plugin.name())?;
        self.push(plugin, None);
        Ok(())
    }

    /// Register a plugin loaded from a shared library.
    ///
    /// The name is checked while instance and library are still held
    /// together, so a rejected plugin drops its instance before the library
    /// is unloaded.
    pub fn register_dynamic(&mut self, dynamic: DynamicPlugin) -> Result<(), PluginHostError> {
        self.check_name(dynamic.instance.name())?;

        let DynamicPlugin {
            instance,
            library,
            path,
        } = dynamic;
        tracing::debug!(path = %path.display(), "Plugin library loaded");
        self.push(instance, Some(library));
        Ok(())
    }

    /// Names must be non-empty, free of surrounding whitespace, and unique
    fn check_name(&self, name: &str) -> Result<(), PluginHostError> {
        if name.is_empty() || name.trim() != name {
            return Err(PluginHostError::InvalidName {
                name: name.to_string(),
            });
        }
        if self.plugins.iter().any(|p| p.name == name) {
            return Err(PluginHostError::DuplicatePlugin {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn push(&mut self, instance: Box<dyn Plugin>, library: Option<Library>) {
        let name = instance.name().to_string();
        let runner_order = instance.runner_order();
        tracing::info!(plugin = %name, runner_order = %runner_order, "Plugin registered");

        self.plugins.push(RegisteredPlugin {
            name,
            runner_order,
            state: PluginState::Loaded,
            instance,
            _library: library,
        });
    }

    /// Discover and register every plugin in the plugin directory.
    ///
    /// A library that fails to load is logged and skipped; a name clash with
    /// an already registered plugin is an error. Returns how many plugins
    /// were registered.
    pub fn load_dynamic(&mut self) -> Result<usize, PluginHostError> {
        let Some(plugin_dir) = self.plugin_dir.clone() else {
            return Ok(0);
        };

        let loader = PluginLoader::new(plugin_dir);
        let mut loaded = 0;
        for dir in loader.discover()? {
            match loader.load(&dir) {
                Ok(dynamic) => {
                    self.register_dynamic(dynamic)?;
                    loaded += 1;
                }
                Err(e) => {
                    tracing::error!(dir = %dir.display(), error = %e, "Failed to load plugin");
                }
            }
        }
        Ok(loaded)
    }

    /// Run one phase across every participating plugin.
    ///
    /// Each plugin's admission check runs immediately before its hook. A
    /// plugin that is not admitted is skipped and told why on the console.
    /// A hook error is logged and the phase continues; a panic also marks
    /// the plugin failed for the rest of the process.
    pub fn dispatch(&mut self, mut call: PhaseCall<'_>, capture: &CaptureInfo) -> PhaseReport {
        let phase = call.phase();
        let mut report = PhaseReport::new(phase);
        let fallback = PluginConfiguration::default();

        let Self {
            plugins,
            store,
            console,
            ..
        } = self;

        for plugin in plugins.iter_mut() {
            if !plugin.runner_order.contains(phase) {
                continue;
            }

            let name = plugin.name.as_str();
            if let PluginState::Failed { error } = &plugin.state {
                tracing::debug!(plugin = %name, phase = %phase, "Plugin failed earlier, skipping");
                report.record(
                    name,
                    HookStatus::Skipped {
                        reason: format!("failed earlier: {error}"),
                    },
                );
                continue;
            }

            let configuration = store.get(name);
            let instance = &mut plugin.instance;
            let admission = std::panic::catch_unwind(AssertUnwindSafe(|| {
                instance.valid_configuration(configuration)
            }));

            match admission {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => {
                    tracing::warn!(plugin = %name, phase = %phase, reason = %reason, "Plugin not admitted, skipping");
                    console.say(&reason.to_string());
                    report.record(
                        name,
                        HookStatus::Skipped {
                            reason: reason.to_string(),
                        },
                    );
                    continue;
                }
                Err(_) => {
                    tracing::error!(plugin = %name, phase = %phase, "Plugin panicked in admission check, disabling");
                    plugin.state = PluginState::Failed {
                        error: "Plugin panicked in admission check".to_string(),
                    };
                    report.record(name, HookStatus::Panicked);
                    continue;
                }
            }

            let ctx = PluginContext::new(
                name,
                configuration.unwrap_or(&fallback),
                capture,
                &**console,
            );

            tracing::debug!(plugin = %name, phase = %phase, "Running hook");
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                call.invoke(&mut **instance, &ctx)
            }));

            match result {
                Ok(Ok(())) => report.record(name, HookStatus::Ran),
                Ok(Err(e)) => {
                    tracing::error!(plugin = %name, phase = %phase, error = %e, "Plugin hook error");
                    report.record(
                        name,
                        HookStatus::Failed {
                            error: e.to_string(),
                        },
                    );
                }
                Err(_) => {
                    tracing::error!(plugin = %name, phase = %phase, "Plugin panicked, disabling");
                    plugin.state = PluginState::Failed {
                        error: format!("Plugin panicked in {phase}"),
                    };
                    report.record(name, HookStatus::Panicked);
                }
            }
        }

        report
    }

    pub fn run_pre_capture(&mut self, capture: &CaptureInfo) -> PhaseReport {
        self.dispatch(PhaseCall::PreCapture, capture)
    }

    pub fn run_post_capture(&mut self, capture: &CaptureInfo, snapshot: &mut Snapshot) -> PhaseReport {
        self.dispatch(PhaseCall::PostCapture(snapshot), capture)
    }

    pub fn run_capture_ready(&mut self, capture: &CaptureInfo, snapshot: &Snapshot) -> PhaseReport {
        self.dispatch(PhaseCall::CaptureReady(snapshot), capture)
    }

    /// Run a plugin's configuration flow and replace its stored configuration
    /// with the result. The store is saved when the host has a store path.
    pub fn configure(
        &mut self,
        name: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<PluginConfiguration, PluginHostError> {
        let plugin = self.find(name)?;
        let configuration = plugin
            .instance
            .configure_options(prompter)
            .map_err(|source| PluginHostError::Configure {
                name: name.to_string(),
                source,
            })?;

        self.store.set(name, configuration.clone());
        self.save()?;
        tracing::info!(plugin = %name, enabled = configuration.enabled, "Plugin configured");
        Ok(configuration)
    }

    /// Forget a plugin's stored configuration. Returns whether one existed.
    pub fn reset(&mut self, name: &str) -> Result<bool, PluginHostError> {
        let removed = self.store.remove(name).is_some();
        if removed {
            self.save()?;
            tracing::info!(plugin = %name, "Plugin configuration reset");
        }
        Ok(removed)
    }

    /// Save the configuration store, if the host has a store path
    pub fn save(&self) -> Result<(), PluginHostError> {
        match &self.store_path {
            Some(path) => self.store.save(path),
            None => Ok(()),
        }
    }

    /// The stored configuration for a plugin
    pub fn configuration(&self, name: &str) -> Option<&PluginConfiguration> {
        self.store.get(name)
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// List all registered plugins in registration order
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugins.iter().map(|p| self.info(p)).collect()
    }

    /// Get information about a specific plugin
    pub fn get_plugin_info(&self, name: &str) -> Option<PluginInfo> {
        self.plugins
            .iter()
            .find(|p| p.name == name)
            .map(|p| self.info(p))
    }

    /// Names of plugins taking part in `phase`, in dispatch order
    pub fn plugins_for(&self, phase: Phase) -> Vec<&str> {
        self.plugins
            .iter()
            .filter(|p| p.runner_order.contains(phase))
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Get the number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    fn find(&self, name: &str) -> Result<&RegisteredPlugin, PluginHostError> {
        self.plugins
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PluginHostError::NotFound {
                name: name.to_string(),
            })
    }

    fn info(&self, plugin: &RegisteredPlugin) -> PluginInfo {
        let configuration = self.store.get(&plugin.name);
        let admission = std::panic::catch_unwind(AssertUnwindSafe(|| {
            plugin.instance.valid_configuration(configuration)
        }));

        let status = match admission {
            Ok(Ok(())) => ConfigStatus::Enabled,
            Ok(Err(PluginError::NotConfigured { .. })) => ConfigStatus::Unconfigured,
            Ok(Err(PluginError::Disabled { .. })) => ConfigStatus::Disabled,
            Ok(Err(e)) => ConfigStatus::Invalid {
                reason: e.to_string(),
            },
            Err(_) => ConfigStatus::Invalid {
                reason: "admission check panicked".to_string(),
            },
        };

        PluginInfo {
            name: plugin.name.clone(),
            runner_order: plugin.runner_order.iter().collect(),
            status,
            state: plugin.state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cheese_plugin_api::{OptionKind, OptionSpec, RecordingConsole, ScriptedPrompter};
    use std::sync::Mutex;
    use tempfile::TempDir;

    type Calls = Arc<Mutex<Vec<String>>>;

    #[derive(Default)]
    enum Behavior {
        #[default]
        Succeed,
        Fail,
        Panic,
    }

    struct Spy {
        name: String,
        order: RunnerOrder,
        calls: Calls,
        behavior: Behavior,
    }

    impl Spy {
        fn new(name: &str, order: RunnerOrder, calls: &Calls) -> Self {
            Self {
                name: name.to_string(),
                order,
                calls: calls.clone(),
                behavior: Behavior::Succeed,
            }
        }

        fn behaving(mut self, behavior: Behavior) -> Self {
            self.behavior = behavior;
            self
        }

        fn hit(&self, phase: Phase) -> Result<(), PluginError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, phase));
            match self.behavior {
                Behavior::Succeed => Ok(()),
                Behavior::Fail => Err(PluginError::hook("boom")),
                Behavior::Panic => panic!("spy panicked"),
            }
        }
    }

    impl Plugin for Spy {
        fn name(&self) -> &str {
            &self.name
        }

        fn runner_order(&self) -> RunnerOrder {
            self.order.clone()
        }

        fn run_pre_capture(&mut self, _ctx: &PluginContext<'_>) -> Result<(), PluginError> {
            self.hit(Phase::PreCapture)
        }

        fn run_post_capture(
            &mut self,
            _ctx: &PluginContext<'_>,
            _snapshot: &mut Snapshot,
        ) -> Result<(), PluginError> {
            self.hit(Phase::PostCapture)
        }

        fn run_capture_ready(
            &mut self,
            _ctx: &PluginContext<'_>,
            _snapshot: &Snapshot,
        ) -> Result<(), PluginError> {
            self.hit(Phase::CaptureReady)
        }
    }

    fn enabled_store(names: &[&str]) -> ConfigStore {
        let mut store = ConfigStore::default();
        for name in names {
            store.set(name, PluginConfiguration::new(true));
        }
        store
    }

    fn capture() -> CaptureInfo {
        CaptureInfo::new("abc1234def").with_message("initial commit")
    }

    #[test]
    fn test_plugin_host_config_default() {
        let config = PluginHostConfig::default();
        assert!(config.store_path.ends_with("cheese/plugins.toml"));
        assert!(config.plugin_dir.ends_with("cheese/plugins"));
    }

    #[test]
    fn test_plugin_host_new_missing_store() {
        let dir = TempDir::new().unwrap();
        let host = PluginHost::new(PluginHostConfig {
            store_path: dir.path().join("plugins.toml"),
            plugin_dir: dir.path().join("plugins"),
        })
        .unwrap();
        assert_eq!(host.plugin_count(), 0);
        assert!(host.store().is_empty());
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let calls = Calls::default();
        let mut host = PluginHost::with_store(ConfigStore::default());
        host.register(Box::new(Spy::new("dup", RunnerOrder::all(), &calls)))
            .unwrap();

        let err = host
            .register(Box::new(Spy::new("dup", RunnerOrder::none(), &calls)))
            .unwrap_err();
        assert!(matches!(err, PluginHostError::DuplicatePlugin { ref name } if name == "dup"));
        assert_eq!(host.plugin_count(), 1);
    }

    #[test]
    fn test_register_rejects_blank_or_padded_name() {
        let calls = Calls::default();
        let mut host = PluginHost::with_store(ConfigStore::default());
        for name in ["", "  ", " padded", "padded "] {
            let err = host
                .register(Box::new(Spy::new(name, RunnerOrder::all(), &calls)))
                .unwrap_err();
            assert!(matches!(err, PluginHostError::InvalidName { .. }), "{name:?}");
        }
        assert_eq!(host.plugin_count(), 0);
    }

    /// Records its own drop
    struct Tracked {
        name: &'static str,
        drops: Calls,
    }

    impl Plugin for Tracked {
        fn name(&self) -> &str {
            self.name
        }

        fn runner_order(&self) -> RunnerOrder {
            RunnerOrder::all()
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.lock().unwrap().push(self.name.to_string());
        }
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_register_dynamic_duplicate_is_an_error() {
        let calls = Calls::default();
        let drops = Calls::default();
        let mut host = PluginHost::with_store(ConfigStore::default());
        host.register(Box::new(Spy::new("twin", RunnerOrder::all(), &calls)))
            .unwrap();

        // Any shared library will do to stand in for the plugin's own
        let library = unsafe { Library::new("libc.so.6") }.unwrap();
        let dynamic = DynamicPlugin {
            instance: Box::new(Tracked {
                name: "twin",
                drops: drops.clone(),
            }),
            library,
            path: PathBuf::from("libc.so.6"),
        };

        let err = host.register_dynamic(dynamic).unwrap_err();
        assert!(matches!(err, PluginHostError::DuplicatePlugin { ref name } if name == "twin"));
        assert_eq!(*drops.lock().unwrap(), vec!["twin"]);
        assert_eq!(host.plugin_count(), 1);
    }

    #[test]
    fn test_rejected_plugin_is_dropped_before_returning() {
        let drops = Calls::default();
        let mut host = PluginHost::with_store(ConfigStore::default());
        host.register(Box::new(Tracked {
            name: "once",
            drops: drops.clone(),
        }))
        .unwrap();

        let err = host
            .register(Box::new(Tracked {
                name: "once",
                drops: drops.clone(),
            }))
            .unwrap_err();
        assert!(matches!(err, PluginHostError::DuplicatePlugin { .. }));
        assert_eq!(*drops.lock().unwrap(), vec!["once"]);
    }

    /// Counts as configured only once a token is stored
    struct Strict {
        calls: Calls,
    }

    impl Plugin for Strict {
        fn name(&self) -> &str {
            "strict"
        }

        fn runner_order(&self) -> RunnerOrder {
            RunnerOrder::new([Phase::PreCapture])
        }

        fn configured(&self, configuration: Option<&PluginConfiguration>) -> bool {
            configuration.is_some_and(|c| c.get_str("token").is_some())
        }

        fn run_pre_capture(&mut self, _ctx: &PluginContext<'_>) -> Result<(), PluginError> {
            self.calls.lock().unwrap().push("strict".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_stronger_configured_check_skips_enabled_plugin() {
        let calls = Calls::default();
        let console = Arc::new(RecordingConsole::new());
        let mut host = PluginHost::with_store(enabled_store(&["strict"])).with_console(console.clone());
        host.register(Box::new(Strict {
            calls: calls.clone(),
        }))
        .unwrap();

        let report = host.run_pre_capture(&capture());
        assert!(matches!(
            report.outcome("strict"),
            Some(HookStatus::Skipped { reason }) if reason.contains("has not been configured")
        ));
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(console.lines().len(), 1);
        assert_eq!(
            host.get_plugin_info("strict").unwrap().status,
            ConfigStatus::Unconfigured
        );
    }

    #[test]
    fn test_dispatch_only_participating_plugins() {
        let calls = Calls::default();
        let mut host = PluginHost::with_store(enabled_store(&["pre", "post"]))
            .with_console(Arc::new(RecordingConsole::new()));
        host.register(Box::new(Spy::new(
            "pre",
            RunnerOrder::new([Phase::PreCapture]),
            &calls,
        )))
        .unwrap();
        host.register(Box::new(Spy::new(
            "post",
            RunnerOrder::new([Phase::PostCapture]),
            &calls,
        )))
        .unwrap();

        let report = host.run_pre_capture(&capture());
        assert_eq!(report.ran(), vec!["pre"]);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(*calls.lock().unwrap(), vec!["pre:pre_capture"]);
        assert_eq!(host.plugins_for(Phase::PostCapture), vec!["post"]);
    }

    #[test]
    fn test_unconfigured_plugin_is_skipped_with_explanation() {
        let calls = Calls::default();
        let console = Arc::new(RecordingConsole::new());
        let mut host = PluginHost::with_store(ConfigStore::default()).with_console(console.clone());
        host.register(Box::new(Spy::new("lonely", RunnerOrder::all(), &calls)))
            .unwrap();

        let report = host.run_pre_capture(&capture());
        assert_eq!(report.skipped(), vec!["lonely"]);
        assert!(calls.lock().unwrap().is_empty());

        let lines = console.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("cheese plugin config lonely"));
    }

    #[test]
    fn test_disabled_plugin_is_skipped() {
        let calls = Calls::default();
        let mut store = ConfigStore::default();
        store.set("off", PluginConfiguration::new(false));
        let mut host =
            PluginHost::with_store(store).with_console(Arc::new(RecordingConsole::new()));
        host.register(Box::new(Spy::new("off", RunnerOrder::all(), &calls)))
            .unwrap();

        let report = host.run_pre_capture(&capture());
        assert!(matches!(
            report.outcome("off"),
            Some(HookStatus::Skipped { reason }) if reason.contains("disabled")
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_hook_error_keeps_plugin_eligible() {
        let calls = Calls::default();
        let mut host = PluginHost::with_store(enabled_store(&["flaky", "steady"]))
            .with_console(Arc::new(RecordingConsole::new()));
        host.register(Box::new(
            Spy::new("flaky", RunnerOrder::all(), &calls).behaving(Behavior::Fail),
        ))
        .unwrap();
        host.register(Box::new(Spy::new("steady", RunnerOrder::all(), &calls)))
            .unwrap();

        let first = host.run_pre_capture(&capture());
        assert_eq!(first.failed(), vec!["flaky"]);
        assert_eq!(first.ran(), vec!["steady"]);

        let second = host.run_pre_capture(&capture());
        assert_eq!(second.failed(), vec!["flaky"]);
        assert_eq!(calls.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_panicking_plugin_is_isolated_and_marked_failed() {
        let calls = Calls::default();
        let mut host = PluginHost::with_store(enabled_store(&["bomb", "steady"]))
            .with_console(Arc::new(RecordingConsole::new()));
        host.register(Box::new(
            Spy::new("bomb", RunnerOrder::all(), &calls).behaving(Behavior::Panic),
        ))
        .unwrap();
        host.register(Box::new(Spy::new("steady", RunnerOrder::all(), &calls)))
            .unwrap();

        let report = host.run_pre_capture(&capture());
        assert_eq!(report.outcome("bomb"), Some(&HookStatus::Panicked));
        assert_eq!(report.ran(), vec!["steady"]);

        let info = host.get_plugin_info("bomb").unwrap();
        assert!(matches!(info.state, PluginState::Failed { .. }));

        let mut snapshot = Snapshot::new("/tmp/cheese.jpg", vec![1, 2, 3]);
        let next = host.run_post_capture(&capture(), &mut snapshot);
        assert_eq!(next.skipped(), vec!["bomb"]);
        assert_eq!(next.ran(), vec!["steady"]);
    }

    struct Painter;

    impl Plugin for Painter {
        fn name(&self) -> &str {
            "painter"
        }

        fn runner_order(&self) -> RunnerOrder {
            RunnerOrder::new([Phase::PostCapture])
        }

        fn run_post_capture(
            &mut self,
            ctx: &PluginContext<'_>,
            snapshot: &mut Snapshot,
        ) -> Result<(), PluginError> {
            let colour = ctx.configuration().get_i64("colour").unwrap_or(0);
            snapshot.bytes_mut().push(colour as u8);
            Ok(())
        }
    }

    #[test]
    fn test_post_capture_can_mutate_snapshot() {
        let mut store = ConfigStore::default();
        store.set("painter", PluginConfiguration::new(true).with_option("colour", 7));
        let mut host = PluginHost::with_store(store);
        host.register(Box::new(Painter)).unwrap();

        let mut snapshot = Snapshot::new("/tmp/cheese.jpg", vec![1]);
        let report = host.run_post_capture(&capture(), &mut snapshot);
        assert_eq!(report.ran(), vec!["painter"]);
        assert_eq!(snapshot.bytes(), &[1, 7]);
    }

    struct Greeter;

    impl Plugin for Greeter {
        fn name(&self) -> &str {
            "greeter"
        }

        fn runner_order(&self) -> RunnerOrder {
            RunnerOrder::new([Phase::CaptureReady])
        }

        fn options(&self) -> Vec<OptionSpec> {
            vec![
                OptionSpec::new("greeting", OptionKind::Text).required(),
                OptionSpec::new("repeat", OptionKind::Integer),
            ]
        }
    }

    #[test]
    fn test_configure_replaces_previous_answers_and_persists() {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("plugins.toml");
        let mut host = PluginHost::new(PluginHostConfig {
            store_path: store_path.clone(),
            plugin_dir: dir.path().join("plugins"),
        })
        .unwrap();
        host.register(Box::new(Greeter)).unwrap();

        let mut first = ScriptedPrompter::new(["true", "hello", "3"]);
        host.configure("greeter", &mut first).unwrap();
        assert_eq!(host.configuration("greeter").unwrap().get_i64("repeat"), Some(3));

        let mut second = ScriptedPrompter::new(["true", "hi", ""]);
        host.configure("greeter", &mut second).unwrap();
        let configuration = host.configuration("greeter").unwrap();
        assert_eq!(configuration.get_str("greeting"), Some("hi"));
        assert_eq!(configuration.get("repeat"), None);

        let reloaded = ConfigStore::load(&store_path).unwrap();
        assert_eq!(reloaded.get("greeter"), Some(configuration));
    }

    #[test]
    fn test_configure_unknown_plugin() {
        let mut host = PluginHost::with_store(ConfigStore::default());
        let mut prompter = ScriptedPrompter::new(["true"]);
        let err = host.configure("ghost", &mut prompter).unwrap_err();
        assert!(matches!(err, PluginHostError::NotFound { .. }));
    }

    #[test]
    fn test_configure_invalid_enabled_answer_keeps_store() {
        let mut host = PluginHost::with_store(ConfigStore::default());
        host.register(Box::new(Greeter)).unwrap();

        let mut prompter = ScriptedPrompter::new(["maybe"]);
        let err = host.configure("greeter", &mut prompter).unwrap_err();
        assert!(matches!(err, PluginHostError::Configure { .. }));
        assert!(host.configuration("greeter").is_none());
    }

    #[test]
    fn test_list_plugins_reports_status() {
        let mut store = ConfigStore::default();
        store.set("greeter", PluginConfiguration::new(true));
        let calls = Calls::default();
        let mut host = PluginHost::with_store(store);
        host.register(Box::new(Greeter)).unwrap();
        host.register(Box::new(Spy::new("spy", RunnerOrder::none(), &calls)))
            .unwrap();

        let plugins = host.list_plugins();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[0].name, "greeter");
        assert!(matches!(plugins[0].status, ConfigStatus::Invalid { ref reason } if reason.contains("greeting")));
        assert_eq!(plugins[0].runner_order, vec![Phase::CaptureReady]);
        assert_eq!(plugins[1].status, ConfigStatus::Unconfigured);
        assert!(plugins[1].runner_order.is_empty());
    }

    #[test]
    fn test_reset_forgets_configuration() {
        let mut host = PluginHost::with_store(enabled_store(&["greeter"]));
        host.register(Box::new(Greeter)).unwrap();

        assert!(host.reset("greeter").unwrap());
        assert!(host.configuration("greeter").is_none());
        assert!(!host.reset("greeter").unwrap());
    }

    #[test]
    fn test_load_dynamic_empty_dir() {
        let dir = TempDir::new().unwrap();
        let mut host = PluginHost::new(PluginHostConfig {
            store_path: dir.path().join("plugins.toml"),
            plugin_dir: dir.path().join("plugins"),
        })
        .unwrap();
        assert_eq!(host.load_dynamic().unwrap(), 0);
        assert_eq!(host.plugin_count(), 0);
    }

    #[test]
    fn test_plugin_state_failed_serializes() {
        let state = PluginState::Failed {
            error: "Plugin panicked".to_string(),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("failed"));
    }
}
