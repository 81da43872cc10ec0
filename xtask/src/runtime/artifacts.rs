//! Artifact path management for catalogue workflows.

use crate::runtime::error::{XtaskError, XtaskResult};
use std::fs;
use std::path::{Path, PathBuf};

const WORKFLOW_RUNS_DIR: &str = ".artifacts/catalogue/runs";
const SITEMAP_FILE: &str = "sitemap.xml";

/// Central artifact path policy for xtask.
///
/// Keeps workspace-relative output locations consistent across commands. Commands should resolve
/// configured paths through it instead of joining onto `ctx.root()` themselves.
#[derive(Clone, Debug)]
pub struct ArtifactManager {
    root: PathBuf,
}

impl ArtifactManager {
    /// Create an artifact manager rooted at the workspace.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Workspace root used for resolution.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a possibly-relative workspace path.
    ///
    /// Absolute paths are preserved, while relative paths are anchored to the workspace root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Run directory root used by [`WorkflowRecorder`](crate::runtime::workflow::WorkflowRecorder).
    pub fn workflow_runs_dir(&self) -> PathBuf {
        self.root.join(WORKFLOW_RUNS_DIR)
    }

    /// Sitemap location inside a (possibly relative) public directory.
    pub fn sitemap_path(&self, public_dir: &Path) -> PathBuf {
        self.resolve_path(public_dir).join(SITEMAP_FILE)
    }

    /// Ensure a directory exists. Succeeds when it already does.
    pub fn ensure_dir(&self, path: &Path) -> XtaskResult<()> {
        fs::create_dir_all(path).map_err(|err| {
            XtaskError::io(format!("failed to create {}: {err}", path.display())).with_path(path)
        })
    }

    /// Write a text artifact, creating its parent directory first.
    pub fn write_text(&self, path: &Path, contents: &str) -> XtaskResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.ensure_dir(parent)?;
        }
        fs::write(path, contents).map_err(|err| {
            XtaskError::io(format!("failed to write {}: {err}", path.display())).with_path(path)
        })
    }
}
