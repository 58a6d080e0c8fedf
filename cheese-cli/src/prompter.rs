//! Terminal prompts for the plugin configuration flow

use dialoguer::console::style;
use dialoguer::{Input, theme::ColorfulTheme};

use cheese_plugin_api::{OptionKind, OptionSpec, PluginError, Prompter};

/// Asks for each option on the terminal
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&mut self, spec: &OptionSpec) -> Result<String, PluginError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt_text(spec))
            .allow_empty(!spec.required)
            .interact_text()
            .map_err(|e| PluginError::custom(format!("prompt failed: {e}")))
    }

    fn notify(&mut self, message: &str) {
        println!("{}", style(message).dim());
    }
}

/// Prompt line for an option: `key (kind): description`
fn prompt_text(spec: &OptionSpec) -> String {
    let mut text = spec.key.clone();
    if spec.kind != OptionKind::Any {
        text.push_str(&format!(" ({})", spec.kind.as_str()));
    }
    if let Some(description) = &spec.description {
        text.push_str(&format!(": {description}"));
    }
    text
}
