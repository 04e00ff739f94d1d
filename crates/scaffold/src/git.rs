//! Git CLI facility

use async_trait::async_trait;
use pyforge_errors::StepError;
use pyforge_events::{EventEmitter, EventSender};
use std::path::Path;
use tokio::process::Command;

use crate::command::run_streamed;
use crate::facilities::VcsFacility;
use crate::templates;

/// Version control through the system `git` binary.
pub struct GitCli;

impl GitCli {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VcsFacility for GitCli {
    async fn is_available(&self) -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn init_repo(&self, project_dir: &Path, events: &EventSender) -> Result<(), StepError> {
        run_git(project_dir, &["init"], events).await?;

        let gitignore = project_dir.join(".gitignore");
        tokio::fs::write(&gitignore, templates::gitignore())
            .await
            .map_err(|e| StepError::filesystem("write_gitignore", &gitignore, &e))?;
        events.emit_step_output("Created .gitignore");

        run_git(project_dir, &["add", "."], events).await?;
        // Explicit identity keeps the commit working on machines without a
        // global git config.
        run_git(
            project_dir,
            &[
                "-c",
                "user.name=pyforge",
                "-c",
                "user.email=pyforge@localhost",
                "commit",
                "-m",
                "Initial commit",
            ],
            events,
        )
        .await?;
        events.emit_step_output("Initialized git repository with initial commit");
        Ok(())
    }
}

async fn run_git(cwd: &Path, args: &[&str], events: &EventSender) -> Result<(), StepError> {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(cwd);
    let output = run_streamed(cmd, "git", events).await?;
    if !output.status.success() {
        return Err(StepError::GitFailed {
            message: format!(
                "git {} exited with status {:?}",
                args.join(" "),
                output.status.code()
            ),
        });
    }
    Ok(())
}
