//! The project creation worker
//!
//! Owns the lifecycle of exactly one run at a time: synchronous
//! validation, a background task driving the step pipeline, cooperative
//! cancellation at step boundaries (and between packages inside the
//! install step), and conditional rollback of the partial tree.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use pyforge_errors::{Error, StepError};
use pyforge_events::{
    AppEvent, EventEmitter, EventReceiver, EventSender, FailureContext, RunEvent, RunSummary,
};
use pyforge_types::{dedup_packages, InstalledPackage, ProjectSpec, StepId, VENV_DIR};

use crate::facilities::Facilities;
use crate::{pipeline, validation};

/// Terminal result of one run, mirrored by the last event on the channel.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunSummary),
    Failed {
        failure: FailureContext,
        completed_steps: Vec<StepId>,
        cleanup_performed: bool,
    },
    Cancelled {
        completed_steps: Vec<StepId>,
        cleanup_performed: bool,
    },
}

/// Handle to an in-flight (or finished) creation run
#[derive(Debug)]
pub struct RunHandle {
    run_id: Uuid,
    cancel_requested: Arc<AtomicBool>,
    events: EventReceiver,
    task: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Identifier of this run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Request cooperative cancellation. Observed by the worker before
    /// each step and after each package install; calling this after the
    /// run reached a terminal state is a no-op.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
    }

    /// Drain all events currently queued, without blocking.
    pub fn poll(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Await the next event; `None` once the run is finished and the
    /// channel is drained.
    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.events.recv().await
    }

    /// Whether the background task has reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to finish and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the worker task was aborted or
    /// panicked so hard even the panic guard was lost.
    pub async fn wait(self) -> Result<RunOutcome, Error> {
        self.task
            .await
            .map_err(|e| Error::internal(format!("worker task failed: {e}")))
    }
}

/// Creates projects; at most one run is active per worker instance.
pub struct ProjectWorker {
    active: Arc<AtomicBool>,
}

impl ProjectWorker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Validate `spec` and start a creation run on a background task.
    ///
    /// Validation happens synchronously here: a validation failure
    /// returns immediately, reaches neither the filesystem nor the event
    /// channel, and does not occupy the worker.
    ///
    /// # Errors
    ///
    /// Returns `Error::Busy` while a previous run is still active, or a
    /// `ValidationError` for a bad spec.
    pub fn start(&self, spec: ProjectSpec, facilities: Facilities) -> Result<RunHandle, Error> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }

        if let Err(err) = validation::validate(&spec) {
            self.active.store(false, Ordering::Release);
            return Err(err.into());
        }

        let run_id = Uuid::new_v4();
        let (tx, rx) = pyforge_events::channel();
        let cancel_requested = Arc::new(AtomicBool::new(false));

        let active = Arc::clone(&self.active);
        let cancel = Arc::clone(&cancel_requested);
        let project_dir = spec.project_dir();
        let cleanup_enabled = spec.options.cleanup_on_failure;
        debug!(%run_id, project = %project_dir.display(), "starting creation run");

        let task = tokio::spawn(async move {
            let current_step = AtomicUsize::new(0);
            // Shared with run_project so the panic guard can still report
            // how far the run got.
            let completed_steps = Mutex::new(Vec::new());
            let run = run_project(
                run_id,
                spec,
                facilities,
                tx.clone(),
                cancel.as_ref(),
                &current_step,
                &completed_steps,
            );
            let outcome = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => {
                    // A panic mid-step must still produce a well-formed
                    // trace: one StepFailed, one terminal run event.
                    tx.emit_error(format!("run {run_id} aborted by a panic inside a step"));
                    let failure =
                        FailureContext::new("project creation aborted unexpectedly");
                    tx.emit_step_failed(current_step.load(Ordering::Relaxed), failure.clone());
                    let cleanup_performed = if cleanup_enabled && project_dir.exists() {
                        cleanup_partial(&project_dir, &tx).await
                    } else {
                        false
                    };
                    let completed = lock_steps(&completed_steps).clone();
                    tx.emit(AppEvent::Run(RunEvent::Failed {
                        failure: failure.clone(),
                        completed_steps: completed.clone(),
                        cleanup_performed,
                    }));
                    RunOutcome::Failed {
                        failure,
                        completed_steps: completed,
                        cleanup_performed,
                    }
                }
            };
            active.store(false, Ordering::Release);
            outcome
        });

        Ok(RunHandle {
            run_id,
            cancel_requested,
            events: rx,
            task,
        })
    }
}

impl Default for ProjectWorker {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one executed step body.
enum StepStatus {
    Done,
    /// Cancellation observed inside the step, after a granular unit.
    Cancelled,
    Failed(StepError),
}

/// Lock the shared completed-steps slot, shrugging off poisoning: the
/// slot is plain data and a panicked run still needs to report it.
fn lock_steps(completed: &Mutex<Vec<StepId>>) -> MutexGuard<'_, Vec<StepId>> {
    completed.lock().unwrap_or_else(PoisonError::into_inner)
}

#[allow(clippy::too_many_lines)]
async fn run_project(
    run_id: Uuid,
    spec: ProjectSpec,
    facilities: Facilities,
    tx: EventSender,
    cancel: &AtomicBool,
    current_step: &AtomicUsize,
    completed: &Mutex<Vec<StepId>>,
) -> RunOutcome {
    let started_at = Utc::now();
    let start = Instant::now();
    let steps = pipeline::step_sequence(&spec.options);
    let project_dir = spec.project_dir();

    let mut created_paths: Vec<PathBuf> = Vec::new();
    let mut installed: Vec<InstalledPackage> = Vec::new();
    let mut venv_dir: Option<PathBuf> = None;
    let mut project_size: Option<u64> = None;
    let mut git_initialized = false;

    for (index, step) in steps.iter().enumerate() {
        // Pre-step cancellation checkpoint.
        if cancel.load(Ordering::Acquire) {
            let cleanup_performed =
                finish_interrupted(&spec, &project_dir, &created_paths, &tx).await;
            let completed_steps = lock_steps(completed).clone();
            let outcome = RunOutcome::Cancelled {
                completed_steps: completed_steps.clone(),
                cleanup_performed,
            };
            tx.emit(AppEvent::Run(RunEvent::Cancelled {
                completed_steps,
                cleanup_performed,
            }));
            return outcome;
        }

        current_step.store(index, Ordering::Relaxed);
        tx.emit_step_started(index, step.label);

        if !step.enabled {
            // Configured off: a skip, reported as success, not as "not run".
            tx.emit_step_succeeded(index);
            lock_steps(completed).push(step.id);
            continue;
        }

        let status = match step.id {
            StepId::Layout => {
                match pipeline::create_layout(&project_dir, &mut created_paths, &tx).await {
                    Ok(()) => StepStatus::Done,
                    Err(err) => StepStatus::Failed(err),
                }
            }
            StepId::Venv => {
                match facilities.env.create_env(&project_dir, &spec.name, &tx).await {
                    Ok(path) => {
                        created_paths.push(path.clone());
                        venv_dir = Some(path);
                        StepStatus::Done
                    }
                    Err(err) => StepStatus::Failed(err),
                }
            }
            StepId::Packages => {
                let env = venv_dir
                    .clone()
                    .unwrap_or_else(|| project_dir.join(VENV_DIR));
                install_packages(&spec, &env, &facilities, &tx, cancel, &mut installed).await
            }
            StepId::Manifest => {
                match pipeline::write_manifest(&project_dir, &installed, &tx).await {
                    Ok(()) => StepStatus::Done,
                    Err(err) => StepStatus::Failed(err),
                }
            }
            StepId::Readme => {
                match pipeline::write_readme(&project_dir, &spec.name, &installed, &tx).await {
                    Ok(()) => StepStatus::Done,
                    Err(err) => StepStatus::Failed(err),
                }
            }
            StepId::Git => match init_git(&facilities, &project_dir, &tx).await {
                Ok(initialized) => {
                    git_initialized = initialized;
                    StepStatus::Done
                }
                Err(err) => StepStatus::Failed(err),
            },
            StepId::Size => {
                project_size = pipeline::measure_size(&project_dir).await;
                match project_size {
                    Some(bytes) => tx.emit_step_output(format!(
                        "Project size: {}",
                        pyforge_types::human_size(bytes)
                    )),
                    // A measurement error degrades to "unknown", never to
                    // a failed run.
                    None => tx.emit_warning("could not measure project size"),
                }
                StepStatus::Done
            }
        };

        match status {
            StepStatus::Done => {
                tx.emit_step_succeeded(index);
                lock_steps(completed).push(step.id);
            }
            StepStatus::Cancelled => {
                let cleanup_performed =
                    finish_interrupted(&spec, &project_dir, &created_paths, &tx).await;
                let completed_steps = lock_steps(completed).clone();
                let outcome = RunOutcome::Cancelled {
                    completed_steps: completed_steps.clone(),
                    cleanup_performed,
                };
                tx.emit(AppEvent::Run(RunEvent::Cancelled {
                    completed_steps,
                    cleanup_performed,
                }));
                return outcome;
            }
            StepStatus::Failed(err) => {
                let failure = failure_context(&err);
                tx.emit_step_failed(index, failure.clone());
                let cleanup_performed =
                    finish_interrupted(&spec, &project_dir, &created_paths, &tx).await;
                let completed_steps = lock_steps(completed).clone();
                let outcome = RunOutcome::Failed {
                    failure: failure.clone(),
                    completed_steps: completed_steps.clone(),
                    cleanup_performed,
                };
                tx.emit(AppEvent::Run(RunEvent::Failed {
                    failure,
                    completed_steps,
                    cleanup_performed,
                }));
                return outcome;
            }
        }
    }

    let summary = RunSummary {
        run_id,
        project_path: project_dir,
        completed_steps: lock_steps(completed).clone(),
        installed_packages: installed,
        project_size,
        git_initialized,
        duration: start.elapsed(),
        started_at,
    };
    tx.emit(AppEvent::Run(RunEvent::Completed {
        summary: summary.clone(),
    }));
    RunOutcome::Completed(summary)
}

/// Step 3 body: install the de-duplicated package list one by one,
/// checking the cancellation flag after each package completes.
async fn install_packages(
    spec: &ProjectSpec,
    env_dir: &Path,
    facilities: &Facilities,
    tx: &EventSender,
    cancel: &AtomicBool,
    installed: &mut Vec<InstalledPackage>,
) -> StepStatus {
    let packages = dedup_packages(&spec.packages, spec.options.dedup);
    if packages.is_empty() {
        tx.emit_step_output("No packages to install");
        return StepStatus::Done;
    }

    let total = packages.len();
    for (position, package) in packages.iter().enumerate() {
        tx.emit_step_output(format!(
            "Installing [{}/{}]: {}",
            position + 1,
            total,
            package
        ));
        match facilities.installer.install(env_dir, package, tx).await {
            Ok(report) => installed.push(report),
            Err(err) => return StepStatus::Failed(err),
        }
        // Never interrupts an in-flight install; only prevents starting
        // the next one.
        if cancel.load(Ordering::Acquire) {
            return StepStatus::Cancelled;
        }
    }
    StepStatus::Done
}

/// Step 6 body: initialize version control, treating a missing git
/// binary as a warning and a skip rather than a failure.
async fn init_git(
    facilities: &Facilities,
    project_dir: &Path,
    tx: &EventSender,
) -> Result<bool, StepError> {
    if !facilities.vcs.is_available().await {
        tx.emit_warning("git not found on PATH; skipping repository initialization");
        return Ok(false);
    }
    facilities.vcs.init_repo(project_dir, tx).await?;
    Ok(true)
}

/// Conditional rollback after a failure or cancellation. Returns whether
/// the partial tree was actually removed.
async fn finish_interrupted(
    spec: &ProjectSpec,
    project_dir: &Path,
    created_paths: &[PathBuf],
    tx: &EventSender,
) -> bool {
    if created_paths.is_empty() {
        // Nothing was created; nothing to report or remove.
        return false;
    }
    if !spec.options.cleanup_on_failure {
        tx.emit_warning_with_context(
            format!(
                "partial project left on disk at {}",
                project_dir.display()
            ),
            format!("{} path(s) were created", created_paths.len()),
        );
        return false;
    }
    cleanup_partial(project_dir, tx).await
}

/// Best-effort recursive deletion of the partial tree. Deletion errors
/// are reported as warnings, never escalated into a second failure.
async fn cleanup_partial(project_dir: &Path, tx: &EventSender) -> bool {
    match tokio::fs::remove_dir_all(project_dir).await {
        Ok(()) => {
            tx.emit_debug(format!(
                "removed partial project tree at {}",
                project_dir.display()
            ));
            true
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
        Err(err) => {
            tx.emit_warning_with_context(
                format!(
                    "failed to remove partial project tree at {}",
                    project_dir.display()
                ),
                err.to_string(),
            );
            false
        }
    }
}

fn failure_context(err: &StepError) -> FailureContext {
    let mut failure = FailureContext::new(err.to_string());
    if err.is_retryable() {
        failure = failure.retryable();
    }
    match err {
        StepError::EnvCreationFailed { .. } | StepError::CommandSpawnFailed { .. } => {
            failure.with_hint("check that python3 is installed and on PATH")
        }
        StepError::InstallFailed { .. } => {
            failure.with_hint("check the package name and your network connection")
        }
        StepError::GitFailed { .. } => failure.with_hint("check your git installation"),
        _ => failure,
    }
}
