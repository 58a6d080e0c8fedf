//! PluginConfiguration - a plugin's persisted settings, and the prompt-driven
//! flow that produces them

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

use crate::error::PluginError;
use crate::options::{ENABLED_KEY, OptionSpec, OptionValue};

/// Typed configuration record for one plugin.
///
/// Stored as a TOML table keyed by plugin name. `enabled` is a first-class
/// field; every other key lands in `options`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginConfiguration {
    /// Whether the plugin may run at all
    pub enabled: bool,
    /// Free-form options declared by the plugin's schema
    #[serde(flatten)]
    pub options: BTreeMap<String, OptionValue>,
}

impl PluginConfiguration {
    /// Create a configuration with no options
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            options: BTreeMap::new(),
        }
    }

    /// Builder: add an option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(OptionValue::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(OptionValue::as_i64)
    }

    /// Keys of required options that have no value
    pub fn missing_required<'a>(&self, schema: &'a [OptionSpec]) -> Vec<&'a str> {
        schema
            .iter()
            .filter(|spec| spec.required && spec.key != ENABLED_KEY)
            .filter(|spec| !self.options.contains_key(&spec.key))
            .map(|spec| spec.key.as_str())
            .collect()
    }

    /// Convert a persisted table into a configuration.
    ///
    /// An empty table means "never configured" and yields `Ok(None)`.
    pub fn from_table(table: &toml::Table) -> Result<Option<Self>, PluginError> {
        if table.is_empty() {
            return Ok(None);
        }

        let mut configuration = Self::default();
        for (key, value) in table {
            if key == ENABLED_KEY {
                configuration.enabled = value.as_bool().ok_or_else(|| {
                    PluginError::config(format!("'{ENABLED_KEY}' must be true or false"))
                })?;
                continue;
            }

            let value = match value {
                toml::Value::Boolean(b) => OptionValue::Boolean(*b),
                toml::Value::Integer(i) => OptionValue::Integer(*i),
                toml::Value::String(s) => OptionValue::Text(s.clone()),
                other => {
                    return Err(PluginError::config(format!(
                        "'{key}' has unsupported type {}",
                        other.type_str()
                    )));
                }
            };
            configuration.options.insert(key.clone(), value);
        }

        Ok(Some(configuration))
    }

    /// Convert into the table layout persisted by the host
    pub fn to_table(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert(ENABLED_KEY.to_string(), toml::Value::Boolean(self.enabled));
        for (key, value) in &self.options {
            let value = match value {
                OptionValue::Boolean(b) => toml::Value::Boolean(*b),
                OptionValue::Integer(i) => toml::Value::Integer(*i),
                OptionValue::Text(s) => toml::Value::String(s.clone()),
            };
            table.insert(key.clone(), value);
        }
        table
    }
}

/// Source of answers for the configuration flow.
///
/// The CLI implements this with interactive terminal prompts; tests and
/// scripted setups use [`ScriptedPrompter`].
pub trait Prompter {
    /// Ask for the raw answer to one option
    fn prompt(&mut self, spec: &OptionSpec) -> Result<String, PluginError>;

    /// Show an informational line during the session
    fn notify(&mut self, _message: &str) {}
}

/// Prompter that replays a fixed list of answers in order
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Keys that were prompted for, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, spec: &OptionSpec) -> Result<String, PluginError> {
        self.asked.push(spec.key.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| PluginError::invalid_input(format!("no answer for '{}'", spec.key)))
    }
}

/// Run the configuration flow for a schema.
///
/// Asks for `enabled` first; a `false` answer ends the session with a
/// disabled configuration. Otherwise every schema entry is asked in declared
/// order and blank optional answers are left out. The result is always a
/// fresh record, never merged with earlier answers.
pub fn configure_with_schema(
    schema: &[OptionSpec],
    prompter: &mut dyn Prompter,
) -> Result<PluginConfiguration, PluginError> {
    let enabled_spec = OptionSpec::enabled();
    let enabled = enabled_spec
        .parse(&prompter.prompt(&enabled_spec)?)?
        .and_then(|value| value.as_bool())
        .ok_or_else(|| {
            PluginError::invalid_input("please respond with 'true' or 'false'")
        })?;

    let mut configuration = PluginConfiguration::new(enabled);
    if !enabled {
        prompter.notify("Plugin disabled, skipping remaining options");
        return Ok(configuration);
    }

    for spec in schema.iter().filter(|spec| spec.key != ENABLED_KEY) {
        let answer = prompter.prompt(spec)?;
        if let Some(value) = spec.parse(&answer)? {
            configuration.options.insert(spec.key.clone(), value);
        }
    }

    Ok(configuration)
}
