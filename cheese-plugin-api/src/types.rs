//! Capture pipeline types shared by plugins and the host

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A named point in the capture pipeline where hooks may run.
///
/// Variants are declared in pipeline order, so `Ord` follows execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the capture device produces a frame
    PreCapture,
    /// Immediately after the frame is produced, image may be mutated
    PostCapture,
    /// After every post-capture hook of every plugin has completed
    CaptureReady,
}

impl Phase {
    /// All phases in pipeline order
    pub const ALL: [Phase; 3] = [Phase::PreCapture, Phase::PostCapture, Phase::CaptureReady];

    /// Returns the string name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreCapture => "pre_capture",
            Self::PostCapture => "post_capture",
            Self::CaptureReady => "capture_ready",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of phases a plugin participates in.
///
/// An empty order means the plugin is installed but never invoked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunnerOrder(BTreeSet<Phase>);

impl RunnerOrder {
    /// An order that never runs
    pub fn none() -> Self {
        Self::default()
    }

    /// Every phase
    pub fn all() -> Self {
        Self::new(Phase::ALL)
    }

    /// Build an order from any collection of phases; duplicates collapse.
    pub fn new(phases: impl IntoIterator<Item = Phase>) -> Self {
        Self(phases.into_iter().collect())
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.0.contains(&phase)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Phases in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = Phase> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Phase> for RunnerOrder {
    fn from_iter<I: IntoIterator<Item = Phase>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl std::fmt::Display for RunnerOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("(never runs)");
        }
        let names: Vec<&str> = self.iter().map(|p| p.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

/// Run-scoped state of the current capture, readable by every plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureInfo {
    /// Commit identifier being captured
    pub sha: String,
    /// Commit message
    pub message: String,
    /// Branch the commit was made on
    pub branch: Option<String>,
    /// Repository name
    pub repository: Option<String>,
    /// When the capture started
    pub captured_at: DateTime<Utc>,
}

impl CaptureInfo {
    /// Create capture info for a commit, timestamped now.
    pub fn new(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: String::new(),
            branch: None,
            repository: None,
            captured_at: Utc::now(),
        }
    }

    /// Builder: set the commit message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Builder: set the branch
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Builder: set the repository name
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Abbreviated sha (first 7 characters)
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(7)
            .map_or(self.sha.len(), |(i, _)| i);
        &self.sha[..end]
    }
}

/// A captured frame. Post-capture hooks may rewrite its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }

    /// Where the frame is (or will be) stored
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw encoded image bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable access for post-capture image processing
    pub fn bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }

    /// Replace the image bytes wholesale
    pub fn replace(&mut self, bytes: Vec<u8>) {
        self.bytes = bytes;
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
