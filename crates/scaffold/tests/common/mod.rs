//! Shared test doubles for driving the worker without real tools

use async_trait::async_trait;
use pyforge_errors::StepError;
use pyforge_events::{AppEvent, EventEmitter, EventSender, RunEvent, StepEvent};
use pyforge_scaffold::{EnvProvisioner, Facilities, PackageInstaller, VcsFacility};
use pyforge_types::{InstalledPackage, PackageSpec, VersionOp};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Env provisioner that fakes a venv with a directory and a pyvenv.cfg.
/// An optional gate makes it block until the test releases it, which
/// pins the worker at a known point for deterministic cancellation.
pub struct FakeEnv {
    pub gate: Option<Arc<Notify>>,
}

#[async_trait]
impl EnvProvisioner for FakeEnv {
    async fn create_env(
        &self,
        project_dir: &Path,
        _prompt: &str,
        events: &EventSender,
    ) -> Result<PathBuf, StepError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let venv = project_dir.join("venv");
        tokio::fs::create_dir_all(&venv)
            .await
            .map_err(|e| StepError::filesystem("create_venv", &venv, &e))?;
        let cfg = venv.join("pyvenv.cfg");
        tokio::fs::write(&cfg, "home = /usr/bin\n")
            .await
            .map_err(|e| StepError::filesystem("write_pyvenv_cfg", &cfg, &e))?;
        events.emit_step_output("created virtual environment");
        Ok(venv)
    }
}

/// Installer that resolves `==` pins exactly and everything else to 1.0.0.
/// `fail_on` simulates an index failure for one package; `panic_on`
/// crashes outright mid-install; `gate` blocks inside the first install
/// until released.
pub struct FakeInstaller {
    pub fail_on: Option<String>,
    pub panic_on: Option<String>,
    pub gate: Option<Arc<Notify>>,
    pub calls: AtomicUsize,
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            panic_on: None,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PackageInstaller for FakeInstaller {
    async fn install(
        &self,
        _env_dir: &Path,
        package: &PackageSpec,
        events: &EventSender,
    ) -> Result<InstalledPackage, StepError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
        if self.panic_on.as_deref() == Some(package.name.as_str()) {
            panic!("simulated installer crash");
        }
        if self.fail_on.as_deref() == Some(package.name.as_str()) {
            return Err(StepError::InstallFailed {
                package: package.name.clone(),
                message: "simulated package index timeout".to_string(),
            });
        }
        events.emit_step_output(format!("installed {package}"));
        let resolved_version = match &package.constraint {
            Some(c) if c.op == VersionOp::Eq => Some(c.version.clone()),
            _ => Some("1.0.0".to_string()),
        };
        Ok(InstalledPackage {
            spec: package.clone(),
            resolved_version,
        })
    }
}

/// Vcs facility backed by plain filesystem markers.
pub struct FakeVcs {
    pub available: bool,
}

#[async_trait]
impl VcsFacility for FakeVcs {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn init_repo(&self, project_dir: &Path, events: &EventSender) -> Result<(), StepError> {
        let git_dir = project_dir.join(".git");
        tokio::fs::create_dir_all(&git_dir)
            .await
            .map_err(|e| StepError::filesystem("git_init", &git_dir, &e))?;
        let ignore = project_dir.join(".gitignore");
        tokio::fs::write(&ignore, "venv/\n")
            .await
            .map_err(|e| StepError::filesystem("write_gitignore", &ignore, &e))?;
        events.emit_step_output("initialized repository");
        Ok(())
    }
}

pub fn facilities() -> Facilities {
    Facilities {
        env: Arc::new(FakeEnv { gate: None }),
        installer: Arc::new(FakeInstaller::new()),
        vcs: Arc::new(FakeVcs { available: true }),
    }
}

pub fn facilities_with_failing_install(package: &str) -> Facilities {
    let mut installer = FakeInstaller::new();
    installer.fail_on = Some(package.to_string());
    Facilities {
        env: Arc::new(FakeEnv { gate: None }),
        installer: Arc::new(installer),
        vcs: Arc::new(FakeVcs { available: true }),
    }
}

pub fn facilities_with_panicking_install(package: &str) -> Facilities {
    let mut installer = FakeInstaller::new();
    installer.panic_on = Some(package.to_string());
    Facilities {
        env: Arc::new(FakeEnv { gate: None }),
        installer: Arc::new(installer),
        vcs: Arc::new(FakeVcs { available: true }),
    }
}

pub fn facilities_with_gated_env(gate: Arc<Notify>) -> Facilities {
    Facilities {
        env: Arc::new(FakeEnv { gate: Some(gate) }),
        installer: Arc::new(FakeInstaller::new()),
        vcs: Arc::new(FakeVcs { available: true }),
    }
}

pub fn facilities_with_gated_install(gate: Arc<Notify>) -> Facilities {
    let mut installer = FakeInstaller::new();
    installer.gate = Some(gate);
    Facilities {
        env: Arc::new(FakeEnv { gate: None }),
        installer: Arc::new(installer),
        vcs: Arc::new(FakeVcs { available: true }),
    }
}

/// Drain every event from a finished (or finishing) run handle.
pub async fn drain(handle: &mut pyforge_scaffold::RunHandle) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.recv().await {
        events.push(event);
    }
    events
}

/// Assert the event sequence is a well-formed trace of the worker state
/// machine: steps open and close in order, exactly one run-level
/// terminal event, and it comes last.
pub fn assert_well_formed_trace(events: &[AppEvent]) {
    let mut open: Option<usize> = None;
    let mut next_expected = 0usize;
    let mut run_events = 0usize;

    for (position, event) in events.iter().enumerate() {
        match event {
            AppEvent::Step(StepEvent::Started { index, .. }) => {
                assert_eq!(open, None, "step {index} started while another is open");
                assert_eq!(*index, next_expected, "steps started out of order");
                open = Some(*index);
            }
            AppEvent::Step(StepEvent::Succeeded { index }) => {
                assert_eq!(open, Some(*index), "step {index} succeeded without starting");
                open = None;
                next_expected = index + 1;
            }
            AppEvent::Step(StepEvent::Failed { index, .. }) => {
                assert_eq!(open, Some(*index), "step {index} failed without starting");
                open = None;
                next_expected = index + 1;
            }
            AppEvent::Step(StepEvent::Output { .. }) | AppEvent::General(_) => {}
            AppEvent::Run(_) => {
                run_events += 1;
                assert_eq!(
                    position,
                    events.len() - 1,
                    "run terminal event is not the last event"
                );
            }
        }
    }
    assert_eq!(run_events, 1, "expected exactly one run terminal event");
}

/// The terminal run event of a trace.
pub fn terminal(events: &[AppEvent]) -> &RunEvent {
    match events.last() {
        Some(AppEvent::Run(event)) => event,
        other => panic!("expected a run terminal event, got {other:?}"),
    }
}
