//! CaptureRunner - drives one capture through every phase

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use cheese_plugin_api::{CaptureInfo, Snapshot};

use crate::plugins::{PhaseReport, PluginHost};

/// Errors that abort a capture
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The capture device could not produce or store a frame
    #[error("Capture device error: {0}")]
    Device(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The capture stopped part way; `completed` holds the phases that ran
    #[error("Capture aborted: {source}")]
    Aborted {
        #[source]
        source: Box<RunnerError>,
        completed: Vec<PhaseReport>,
    },
}

impl RunnerError {
    /// Reports of the phases that ran before the capture stopped
    pub fn completed_phases(&self) -> &[PhaseReport] {
        match self {
            Self::Aborted { completed, .. } => completed,
            _ => &[],
        }
    }

    fn aborted(source: RunnerError, completed: Vec<PhaseReport>) -> Self {
        Self::Aborted {
            source: Box::new(source),
            completed,
        }
    }
}

/// Something that produces the captured image
pub trait CaptureDevice {
    /// Produce a frame for this capture
    fn capture(&mut self, info: &CaptureInfo) -> Result<Snapshot, RunnerError>;

    /// Store the frame once post-capture hooks are done with it
    fn finish(&mut self, _snapshot: &Snapshot) -> Result<(), RunnerError> {
        Ok(())
    }
}

/// Device that "captures" an existing image file.
///
/// The frame is written to `<output_dir>/<short sha>.<ext>` after
/// post-capture hooks ran.
#[derive(Debug, Clone)]
pub struct StillImageDevice {
    source: PathBuf,
    output_dir: PathBuf,
}

impl StillImageDevice {
    pub fn new(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_dir: output_dir.into(),
        }
    }
}

impl CaptureDevice for StillImageDevice {
    fn capture(&mut self, info: &CaptureInfo) -> Result<Snapshot, RunnerError> {
        let bytes = std::fs::read(&self.source).map_err(|e| {
            RunnerError::Device(format!("cannot read {}: {e}", self.source.display()))
        })?;

        let ext = self
            .source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let path = self.output_dir.join(format!("{}.{ext}", info.short_sha()));

        Ok(Snapshot::new(path, bytes))
    }

    fn finish(&mut self, snapshot: &Snapshot) -> Result<(), RunnerError> {
        if let Some(parent) = snapshot.path().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(snapshot.path(), snapshot.bytes())?;
        tracing::debug!(path = %snapshot.path().display(), "Snapshot written");
        Ok(())
    }
}

/// Everything that happened during one capture
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    /// The final frame, after post-capture hooks
    #[serde(skip)]
    pub snapshot: Snapshot,
    /// One report per phase, in pipeline order
    pub phases: Vec<PhaseReport>,
}

/// Runs captures against a plugin host
pub struct CaptureRunner<D> {
    host: PluginHost,
    device: D,
}

impl<D: CaptureDevice> CaptureRunner<D> {
    pub fn new(host: PluginHost, device: D) -> Self {
        Self { host, device }
    }

    /// Run one capture.
    ///
    /// Pre-capture hooks run before the device is asked for a frame. If the
    /// device fails the capture stops there; hook failures never stop it.
    pub fn run(&mut self, info: CaptureInfo) -> Result<CaptureReport, RunnerError> {
        tracing::info!(sha = %info.short_sha(), "Starting capture");

        let pre = self.host.run_pre_capture(&info);

        let mut snapshot = match self.device.capture(&info) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(sha = %info.short_sha(), error = %e, "Capture device failed");
                return Err(RunnerError::aborted(e, vec![pre]));
            }
        };

        let post = self.host.run_post_capture(&info, &mut snapshot);
        if let Err(e) = self.device.finish(&snapshot) {
            tracing::error!(sha = %info.short_sha(), error = %e, "Storing snapshot failed");
            return Err(RunnerError::aborted(e, vec![pre, post]));
        }
        let ready = self.host.run_capture_ready(&info, &snapshot);

        tracing::info!(
            sha = %info.short_sha(),
            path = %snapshot.path().display(),
            "Capture complete"
        );

        Ok(CaptureReport {
            snapshot,
            phases: vec![pre, post, ready],
        })
    }
}
