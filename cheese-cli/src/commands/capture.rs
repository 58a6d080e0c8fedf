//! Capture command

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::console::style;
use std::path::PathBuf;

use cheese_core::{CaptureRunner, HookStatus, PhaseReport, PluginHostConfig, StillImageDevice};
use cheese_plugin_api::CaptureInfo;

use crate::catalog;

/// Capture arguments
#[derive(Args)]
pub struct CaptureArgs {
    /// Commit sha being captured
    #[arg(long)]
    pub sha: String,

    /// Commit message
    #[arg(long, short, default_value = "")]
    pub message: String,

    /// Branch the commit was made on
    #[arg(long)]
    pub branch: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Image to use as the captured frame
    #[arg(long)]
    pub image: PathBuf,

    /// Where the snapshot is written (defaults to ~/.config/cheese/captures/<repo>)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl CaptureArgs {
    fn capture_info(&self) -> CaptureInfo {
        let mut info = CaptureInfo::new(&self.sha).with_message(&self.message);
        if let Some(branch) = &self.branch {
            info = info.with_branch(branch);
        }
        if let Some(repo) = &self.repo {
            info = info.with_repository(repo);
        }
        info
    }

    fn output_dir(&self) -> PathBuf {
        match &self.output {
            Some(dir) => dir.clone(),
            None => cheese_paths::capture_dir().join(self.repo.as_deref().unwrap_or("default")),
        }
    }
}

/// Run capture command
pub fn run(args: CaptureArgs, config: PluginHostConfig) -> Result<()> {
    let host = catalog::build_host(config)?;
    let device = StillImageDevice::new(&args.image, args.output_dir());
    let mut runner = CaptureRunner::new(host, device);

    let report = match runner.run(args.capture_info()) {
        Ok(report) => report,
        Err(e) => {
            print_problems(e.completed_phases());
            return Err(e).with_context(|| format!("Capture of {} failed", args.sha));
        }
    };

    print_problems(&report.phases);
    println!("Snapshot saved to {}", report.snapshot.path().display());
    Ok(())
}

/// Mention every hook that errored or panicked
fn print_problems(phases: &[PhaseReport]) {
    for phase in phases {
        for outcome in &phase.outcomes {
            let detail = match &outcome.status {
                HookStatus::Failed { error } => error.clone(),
                HookStatus::Panicked => "panicked".to_string(),
                HookStatus::Ran | HookStatus::Skipped { .. } => continue,
            };
            eprintln!(
                "{} {} ({}): {}",
                style("✗").red().bold(),
                outcome.plugin,
                phase.phase,
                detail
            );
        }
    }
}
