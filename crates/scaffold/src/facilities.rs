//! Facility traits over the external tools a run depends on
//!
//! The pipeline itself never spawns a process directly; it goes through
//! these seams so the worker can be exercised end-to-end with in-process
//! doubles. Production implementations live in [`crate::python`] and
//! [`crate::git`].

use async_trait::async_trait;
use pyforge_errors::StepError;
use pyforge_events::EventSender;
use pyforge_types::{InstalledPackage, PackageSpec};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Creates the isolated package environment inside the project root.
#[async_trait]
pub trait EnvProvisioner: Send + Sync {
    /// Create the environment and return its directory.
    async fn create_env(
        &self,
        project_dir: &Path,
        prompt: &str,
        events: &EventSender,
    ) -> Result<PathBuf, StepError>;
}

/// Installs one package into an environment and reports what it resolved.
///
/// One call per package: cancellation is checked between calls, never
/// mid-package, so an implementation is free to block until its single
/// install finishes.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    async fn install(
        &self,
        env_dir: &Path,
        package: &PackageSpec,
        events: &EventSender,
    ) -> Result<InstalledPackage, StepError>;
}

/// Version control operations for the optional git step.
#[async_trait]
pub trait VcsFacility: Send + Sync {
    /// Whether the underlying tool exists at all. A missing tool makes the
    /// git step a warning and a skip, not a failure.
    async fn is_available(&self) -> bool;

    /// Initialize a repository in `project_dir`, write ignore rules, and
    /// create an initial commit capturing the tree as built so far.
    async fn init_repo(&self, project_dir: &Path, events: &EventSender) -> Result<(), StepError>;
}

/// Bundle of the facilities a run needs, shared into the worker task.
#[derive(Clone)]
pub struct Facilities {
    pub env: Arc<dyn EnvProvisioner>,
    pub installer: Arc<dyn PackageInstaller>,
    pub vcs: Arc<dyn VcsFacility>,
}

impl Facilities {
    /// Production facilities: `python -m venv`, `pip`, and the `git` CLI.
    #[must_use]
    pub fn production() -> Self {
        Self {
            env: Arc::new(crate::python::PythonVenv::new()),
            installer: Arc::new(crate::python::PipInstaller::new()),
            vcs: Arc::new(crate::git::GitCli::new()),
        }
    }
}
