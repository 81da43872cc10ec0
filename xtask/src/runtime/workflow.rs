//! Workflow recording, stage timing, and run manifests.

use crate::runtime::artifacts::ArtifactManager;
use crate::runtime::error::{XtaskError, XtaskResult};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
struct StageRecord {
    name: String,
    started_at: String,
    duration_ms: u128,
    status: &'static str,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RunManifest {
    workflow: String,
    started_at: String,
    finished_at: String,
    duration_ms: u128,
    status: &'static str,
    error: Option<String>,
    command: String,
    stages: Vec<StageRecord>,
}

#[derive(Debug)]
struct ActiveRun {
    workflow: String,
    started_at: String,
    started_instant: Instant,
    manifest_path: PathBuf,
    command: String,
    stages: Vec<StageRecord>,
}

/// Shared workflow recorder service.
///
/// Multi-stage commands execute through [`with_workflow_run`](Self::with_workflow_run) and nest
/// each stage in [`run_timed_stage`](Self::run_timed_stage). Stages run outside a workflow are
/// still timed and logged but leave no manifest. The active run lives in this instance and its
/// clones, so independent recorders never observe each other.
#[derive(Clone, Debug)]
pub struct WorkflowRecorder {
    artifacts: ArtifactManager,
    active: Arc<Mutex<Option<ActiveRun>>>,
}

impl WorkflowRecorder {
    /// Create a recorder service.
    pub fn new(artifacts: ArtifactManager) -> Self {
        Self {
            artifacts,
            active: Arc::new(Mutex::new(None)),
        }
    }

    fn lock(&self) -> XtaskResult<MutexGuard<'_, Option<ActiveRun>>> {
        self.active
            .lock()
            .map_err(|_| XtaskError::io("failed to lock workflow recorder"))
    }

    /// Run a workflow and write `manifest.json` under `.artifacts/catalogue/runs/<ms>-<workflow>/`.
    ///
    /// The manifest is written whether the action succeeds or fails; the action's result is
    /// returned unchanged.
    pub fn with_workflow_run<F>(&self, workflow: &str, action: F) -> XtaskResult<()>
    where
        F: FnOnce() -> XtaskResult<()>,
    {
        let started_unix_ms = unix_timestamp_millis();
        let run_dir = self
            .artifacts
            .workflow_runs_dir()
            .join(format!("{started_unix_ms}-{workflow}"));
        self.artifacts.ensure_dir(&run_dir)?;

        *self.lock()? = Some(ActiveRun {
            workflow: workflow.to_string(),
            started_at: now_iso(),
            started_instant: Instant::now(),
            manifest_path: run_dir.join("manifest.json"),
            command: env::args().collect::<Vec<_>>().join(" "),
            stages: Vec::new(),
        });
        info!(workflow, "workflow started");

        let result = action();
        self.finish(result.as_ref().err())?;
        result
    }

    fn finish(&self, error: Option<&XtaskError>) -> XtaskResult<()> {
        let Some(run) = self.lock()?.take() else {
            return Ok(());
        };

        let status = if error.is_none() { "ok" } else { "failed" };
        let duration = run.started_instant.elapsed();
        let manifest = RunManifest {
            workflow: run.workflow,
            started_at: run.started_at,
            finished_at: now_iso(),
            duration_ms: duration.as_millis(),
            status,
            error: error.map(ToString::to_string),
            command: run.command,
            stages: run.stages,
        };

        let manifest_json = serde_json::to_string_pretty(&manifest).map_err(|err| {
            XtaskError::io(format!("failed to serialize workflow manifest: {err}"))
        })?;
        self.artifacts
            .write_text(&run.manifest_path, &manifest_json)?;
        info!(
            workflow = %manifest.workflow,
            status,
            elapsed = %format_duration(duration),
            manifest = %run.manifest_path.display(),
            "workflow finished"
        );
        Ok(())
    }

    /// Time one stage and record it on the active run, if any.
    ///
    /// The stage result is returned unchanged.
    pub fn run_timed_stage<T, F>(&self, name: &str, action: F) -> XtaskResult<T>
    where
        F: FnOnce() -> XtaskResult<T>,
    {
        info!(stage = name, "stage started");
        let started_at = now_iso();
        let started = Instant::now();
        let result = action();
        let elapsed = started.elapsed();

        let (status, error) = match &result {
            Ok(_) => {
                info!(stage = name, elapsed = %format_duration(elapsed), "stage finished");
                ("ok", None)
            }
            Err(err) => {
                warn!(
                    stage = name,
                    elapsed = %format_duration(elapsed),
                    error = %err,
                    "stage failed"
                );
                ("failed", Some(err.to_string()))
            }
        };

        if let Some(run) = self.lock()?.as_mut() {
            run.stages.push(StageRecord {
                name: name.to_string(),
                started_at,
                duration_ms: elapsed.as_millis(),
                status,
                error,
            });
        }
        result
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a duration for human-readable terminal output.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    if secs >= 60 {
        let minutes = secs / 60;
        let rem_secs = secs % 60;
        format!("{minutes}m {rem_secs}.{millis:03}s")
    } else {
        format!("{secs}.{millis:03}s")
    }
}

/// Current unix timestamp in milliseconds.
pub fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
