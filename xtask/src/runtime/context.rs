//! Shared command context passed into command families.

use crate::runtime::artifacts::ArtifactManager;
use crate::runtime::error::{XtaskError, XtaskResult};
use crate::runtime::workflow::WorkflowRecorder;
use site_catalogue::BuildClock;
use std::env;
use std::path::{Path, PathBuf};

/// Overrides the workspace root the commands operate on.
pub const SITE_ROOT_ENV: &str = "SITE_ROOT";

/// Shared execution context for xtask command families.
///
/// The build clock is captured once here so every stage of one invocation shares the same
/// "now" fallback.
#[derive(Clone, Debug)]
pub struct CommandContext {
    root: PathBuf,
    artifacts: ArtifactManager,
    workflow: WorkflowRecorder,
    clock: BuildClock,
}

impl CommandContext {
    /// Create a context rooted at `SITE_ROOT` or the workspace containing xtask.
    pub fn new() -> XtaskResult<Self> {
        Ok(Self::with_root(workspace_root()?, BuildClock::capture()))
    }

    /// Create a context for an explicit root and clock.
    pub fn with_root(root: PathBuf, clock: BuildClock) -> Self {
        let artifacts = ArtifactManager::new(root.clone());
        let workflow = WorkflowRecorder::new(artifacts.clone());
        Self {
            root,
            artifacts,
            workflow,
            clock,
        }
    }

    /// Workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shared artifact manager.
    pub fn artifacts(&self) -> &ArtifactManager {
        &self.artifacts
    }

    /// Shared workflow recorder.
    pub fn workflow(&self) -> &WorkflowRecorder {
        &self.workflow
    }

    /// Build clock for this invocation.
    pub fn clock(&self) -> &BuildClock {
        &self.clock
    }
}

fn workspace_root() -> XtaskResult<PathBuf> {
    if let Ok(raw) = env::var(SITE_ROOT_ENV) {
        if raw.trim().is_empty() {
            return Err(XtaskError::environment(format!(
                "{SITE_ROOT_ENV} is set but empty; expected a directory path"
            )));
        }
        return Ok(PathBuf::from(raw));
    }
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            XtaskError::environment("xtask lives under workspace root")
                .with_hint(format!("set {SITE_ROOT_ENV} to the site directory"))
        })
}
