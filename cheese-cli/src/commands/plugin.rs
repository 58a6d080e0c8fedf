//! Plugin management commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use dialoguer::console::style;

use cheese_core::{ConfigStatus, PluginHost, PluginHostConfig, PluginInfo, PluginState};
use cheese_plugin_api::RunnerOrder;

use crate::catalog;
use crate::prompter::TerminalPrompter;

/// Plugin management arguments
#[derive(Args)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginCommands,
}

/// Plugin subcommands
#[derive(Subcommand)]
pub enum PluginCommands {
    /// List registered plugins
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure a plugin interactively
    Config {
        /// Plugin name to configure
        name: String,
    },
    /// Show a plugin's stored configuration
    Show {
        /// Plugin name
        name: String,
    },
    /// Forget a plugin's stored configuration
    Reset {
        /// Plugin name to reset
        name: String,
    },
}

/// Run plugin command
pub fn run(args: PluginArgs, config: PluginHostConfig) -> Result<()> {
    let mut host = catalog::build_host(config)?;

    match args.command {
        PluginCommands::List { json } => list_plugins(&host, json),
        PluginCommands::Config { name } => configure_plugin(&mut host, &name),
        PluginCommands::Show { name } => show_plugin(&host, &name),
        PluginCommands::Reset { name } => reset_plugin(&mut host, &name),
    }
}

fn list_plugins(host: &PluginHost, json: bool) -> Result<()> {
    let plugins = host.list_plugins();

    if json {
        println!("{}", serde_json::to_string_pretty(&plugins)?);
        return Ok(());
    }

    if plugins.is_empty() {
        println!("No plugins registered");
        println!();
        println!("Plugin directory: {}", cheese_paths::plugin_dir().display());
        return Ok(());
    }

    for p in &plugins {
        println!("{} {:<24} {}", status_symbol(p), p.name, phases(p));
    }

    Ok(())
}

fn configure_plugin(host: &mut PluginHost, name: &str) -> Result<()> {
    if host.get_plugin_info(name).is_none() {
        bail!("Plugin '{name}' not found, run 'cheese plugin list' to see registered plugins");
    }

    println!("Configuring plugin: {}", style(name).bold());
    println!();

    let mut prompter = TerminalPrompter::new();
    let configuration = host.configure(name, &mut prompter)?;

    let state = if configuration.enabled {
        "enabled"
    } else {
        "disabled"
    };
    println!(
        "\n{} {}",
        style("✓").green().bold(),
        style(format!("Saved configuration for {name} ({state})")).green()
    );
    Ok(())
}

fn show_plugin(host: &PluginHost, name: &str) -> Result<()> {
    let info = host.get_plugin_info(name);
    let configuration = host.configuration(name);

    if info.is_none() && configuration.is_none() {
        bail!("Plugin '{name}' not found");
    }

    println!("Name:        {name}");
    if let Some(info) = &info {
        println!("Phases:      {}", phases(info));
        println!("Status:      {}", status_text(info));
    }

    match configuration {
        Some(configuration) => {
            println!();
            println!("enabled = {}", configuration.enabled);
            for (key, value) in &configuration.options {
                println!("{key} = {value}");
            }
        }
        None => {
            println!();
            println!("Not configured. Run 'cheese plugin config {name}' to set it up.");
        }
    }

    Ok(())
}

fn reset_plugin(host: &mut PluginHost, name: &str) -> Result<()> {
    if host.reset(name)? {
        println!("Reset configuration for {name}");
    } else {
        println!("{name} has no stored configuration");
    }
    Ok(())
}

fn phases(info: &PluginInfo) -> RunnerOrder {
    info.runner_order.iter().copied().collect()
}

fn status_symbol(info: &PluginInfo) -> &'static str {
    if matches!(info.state, PluginState::Failed { .. }) {
        return "✗";
    }
    match info.status {
        ConfigStatus::Enabled => "✓",
        ConfigStatus::Disabled => "○",
        ConfigStatus::Unconfigured => "?",
        ConfigStatus::Invalid { .. } => "!",
    }
}

fn status_text(info: &PluginInfo) -> String {
    if let PluginState::Failed { error } = &info.state {
        return format!("Failed ({error})");
    }
    match &info.status {
        ConfigStatus::Enabled => "Enabled".to_string(),
        ConfigStatus::Disabled => "Disabled".to_string(),
        ConfigStatus::Unconfigured => "Not configured".to_string(),
        ConfigStatus::Invalid { reason } => format!("Invalid ({reason})"),
    }
}
