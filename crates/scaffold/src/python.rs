//! Python virtual environment and pip facilities

use async_trait::async_trait;
use pyforge_errors::StepError;
use pyforge_events::{EventEmitter, EventSender};
use pyforge_types::{InstalledPackage, PackageSpec, VENV_DIR};
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::command::run_streamed;
use crate::facilities::{EnvProvisioner, PackageInstaller};

fn python_program() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

fn pip_executable(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts").join("pip.exe")
    } else {
        env_dir.join("bin").join("pip")
    }
}

/// Creates venvs with the system Python (`python -m venv`).
pub struct PythonVenv;

impl PythonVenv {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonVenv {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnvProvisioner for PythonVenv {
    async fn create_env(
        &self,
        project_dir: &Path,
        prompt: &str,
        events: &EventSender,
    ) -> Result<PathBuf, StepError> {
        let venv_path = project_dir.join(VENV_DIR);

        // The project root is freshly created, but stay defensive about a
        // stale directory from an interrupted earlier attempt.
        if venv_path.exists() {
            tokio::fs::remove_dir_all(&venv_path)
                .await
                .map_err(|e| StepError::filesystem("remove_existing_venv", &venv_path, &e))?;
        }

        events.emit_step_output(format!(
            "Creating virtual environment at {}",
            venv_path.display()
        ));

        let mut cmd = Command::new(python_program());
        cmd.arg("-m")
            .arg("venv")
            .arg(&venv_path)
            .arg("--prompt")
            .arg(prompt);

        let output = run_streamed(cmd, python_program(), events).await?;
        if !output.status.success() {
            return Err(StepError::EnvCreationFailed {
                message: format!(
                    "{} -m venv exited with status {:?}",
                    python_program(),
                    output.status.code()
                ),
            });
        }
        Ok(venv_path)
    }
}

/// Installs packages with the venv's own pip, one invocation per package.
pub struct PipInstaller;

impl PipInstaller {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PipInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageInstaller for PipInstaller {
    async fn install(
        &self,
        env_dir: &Path,
        package: &PackageSpec,
        events: &EventSender,
    ) -> Result<InstalledPackage, StepError> {
        let pip = pip_executable(env_dir);
        let mut cmd = Command::new(&pip);
        cmd.arg("install").arg(package.to_string());

        let output = run_streamed(cmd, "pip", events).await?;
        if !output.status.success() {
            return Err(StepError::InstallFailed {
                package: package.name.clone(),
                message: format!("pip exited with status {:?}", output.status.code()),
            });
        }

        let resolved_version = parse_resolved_version(&output.captured, &package.normalized_name());
        Ok(InstalledPackage {
            spec: package.clone(),
            resolved_version,
        })
    }
}

/// Extract the exact version pip resolved for `normalized` from its
/// `Successfully installed name-version ...` trailer. Returns `None` when
/// the trailer is absent (e.g. "Requirement already satisfied") or does
/// not mention the package.
fn parse_resolved_version(output: &str, normalized: &str) -> Option<String> {
    for line in output.lines() {
        let Some(rest) = line.trim().strip_prefix("Successfully installed ") else {
            continue;
        };
        for token in rest.split_whitespace() {
            if let Some((name, version)) = token.rsplit_once('-') {
                if normalize(name) == normalized {
                    return Some(version.to_string());
                }
            }
        }
    }
    None
}

fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '_' | '.' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
