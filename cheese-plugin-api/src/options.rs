//! Declarative option schema and the typed parsers behind configuration prompts

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// Reserved key under which the enabled flag is persisted
pub const ENABLED_KEY: &str = "enabled";

/// Expected type of a configuration option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// `true` or `false` (case-insensitive)
    Boolean,
    /// A signed whole number
    Integer,
    /// Free text, kept verbatim (trimmed)
    Text,
    /// Inferred from the input: booleans, then digits, then text
    Any,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Any => "any",
        }
    }
}

/// One entry of a plugin's option schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Key the value is persisted under
    pub key: String,
    /// Expected type of the answer
    pub kind: OptionKind,
    /// Whether a blank answer is rejected
    pub required: bool,
    /// Shown next to the prompt
    pub description: Option<String>,
}

impl OptionSpec {
    /// An optional option of the given kind
    pub fn new(key: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            key: key.into(),
            kind,
            required: false,
            description: None,
        }
    }

    /// The reserved enabled flag, always asked first by the configuration flow
    pub fn enabled() -> Self {
        Self::new(ENABLED_KEY, OptionKind::Boolean)
            .required()
            .with_description("Enable this plugin (true/false)")
    }

    /// Builder: reject blank answers
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Builder: attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parse a raw answer for this option.
    ///
    /// Returns `Ok(None)` for a blank answer to an optional key.
    pub fn parse(&self, raw: &str) -> Result<Option<OptionValue>, PluginError> {
        match parse_user_input(raw, self.kind)? {
            Some(value) => Ok(Some(value)),
            None if self.required => Err(PluginError::invalid_input(format!(
                "'{}' is required",
                self.key
            ))),
            None => Ok(None),
        }
    }
}

/// A parsed configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parse a line of user input into a typed value.
///
/// Blank input (after trimming) is `Ok(None)` for every kind.
pub fn parse_user_input(raw: &str, kind: OptionKind) -> Result<Option<OptionValue>, PluginError> {
    let input = raw.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let value = match kind {
        OptionKind::Boolean => OptionValue::Boolean(parse_bool(input).ok_or_else(|| {
            PluginError::invalid_input(format!(
                "'{input}' is not a boolean, please respond with 'true' or 'false'"
            ))
        })?),
        OptionKind::Integer => OptionValue::Integer(input.parse().map_err(|_| {
            PluginError::invalid_input(format!("'{input}' is not a whole number"))
        })?),
        OptionKind::Text => OptionValue::Text(input.to_string()),
        OptionKind::Any => infer(input),
    };

    Ok(Some(value))
}

fn parse_bool(input: &str) -> Option<bool> {
    if input.eq_ignore_ascii_case("true") {
        Some(true)
    } else if input.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn infer(input: &str) -> OptionValue {
    if let Some(b) = parse_bool(input) {
        return OptionValue::Boolean(b);
    }
    if input.bytes().all(|b| b.is_ascii_digit())
        && let Ok(i) = input.parse::<i64>()
    {
        return OptionValue::Integer(i);
    }
    OptionValue::Text(input.to_string())
}
