//! The command pipeline: ordered step descriptors and the step bodies
//! that need no external facility
//!
//! A step is plain data: an identifier, a label, and an enabled flag.
//! Execution order is `StepId::SEQUENCE` and never changes; the first
//! failing step stops the run. A step configured off is skipped but still
//! reported as succeeded.

use pyforge_errors::StepError;
use pyforge_events::{EventEmitter, EventSender};
use pyforge_types::{InstalledPackage, ProjectOptions, StepId, PROJECT_SUBDIRS};
use std::path::{Path, PathBuf};
use tokio::fs;

/// One pipeline step descriptor
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub id: StepId,
    pub label: &'static str,
    /// False when the user toggled the feature off; the step is then
    /// skipped-as-success.
    pub enabled: bool,
}

/// Build the canonical step sequence for the given options.
#[must_use]
pub fn step_sequence(options: &ProjectOptions) -> Vec<Step> {
    StepId::SEQUENCE
        .into_iter()
        .map(|id| Step {
            id,
            label: id.label(),
            enabled: match id {
                StepId::Readme => options.create_readme,
                StepId::Git => options.init_git,
                _ => true,
            },
        })
        .collect()
}

/// Step 1: create the project root and the fixed subdirectory skeleton.
///
/// Every path is recorded into `created`, in creation order, as soon as
/// it exists on disk; on a partway failure the list still names what was
/// created, so rollback sees the partial tree. The pre-existence check
/// is repeated here even though validation already ran, so a directory
/// that appeared in between still fails cleanly instead of being merged
/// into.
pub(crate) async fn create_layout(
    project_dir: &Path,
    created: &mut Vec<PathBuf>,
    events: &EventSender,
) -> Result<(), StepError> {
    if project_dir.exists() {
        return Err(StepError::Filesystem {
            operation: "create_project_root".to_string(),
            path: project_dir.display().to_string(),
            message: "path already exists".to_string(),
        });
    }

    created.reserve(PROJECT_SUBDIRS.len() + 3);
    fs::create_dir_all(project_dir)
        .await
        .map_err(|e| StepError::filesystem("create_project_root", project_dir, &e))?;
    created.push(project_dir.to_path_buf());
    events.emit_step_output(format!("Project folder: {}", project_dir.display()));

    for dir in PROJECT_SUBDIRS {
        let path = project_dir.join(dir);
        fs::create_dir(&path)
            .await
            .map_err(|e| StepError::filesystem("create_subdirectory", &path, &e))?;
        created.push(path.clone());
        events.emit_step_output(format!("Created directory: {dir}/"));

        // Make src and tests importable packages right away.
        if dir == "src" || dir == "tests" {
            let init = path.join("__init__.py");
            fs::write(&init, "")
                .await
                .map_err(|e| StepError::filesystem("create_init_py", &init, &e))?;
            created.push(init);
        }
    }
    Ok(())
}

/// Step 4: write the dependency manifest.
///
/// One line per installed package, install order, no blank lines. Exact
/// resolved versions pin with `==`; packages whose resolution is unknown
/// fall back to the requested constraint.
pub(crate) async fn write_manifest(
    project_dir: &Path,
    installed: &[InstalledPackage],
    events: &EventSender,
) -> Result<(), StepError> {
    let path = project_dir.join("requirements.txt");
    let mut content = String::new();
    for package in installed {
        content.push_str(&package.manifest_line());
        content.push('\n');
    }
    fs::write(&path, content)
        .await
        .map_err(|e| StepError::filesystem("write_requirements", &path, &e))?;
    events.emit_step_output(format!(
        "requirements.txt saved ({} package{})",
        installed.len(),
        if installed.len() == 1 { "" } else { "s" }
    ));
    Ok(())
}

/// Step 5: write the generated README.
pub(crate) async fn write_readme(
    project_dir: &Path,
    name: &str,
    installed: &[InstalledPackage],
    events: &EventSender,
) -> Result<(), StepError> {
    let path = project_dir.join("README.md");
    fs::write(&path, crate::templates::readme(name, installed))
        .await
        .map_err(|e| StepError::filesystem("write_readme", &path, &e))?;
    events.emit_step_output("README.md created");
    Ok(())
}

/// Step 7: total on-disk size of the created tree.
///
/// Never fails the run; any I/O error degrades the result to `None`,
/// reported to the user as an unknown size.
pub(crate) async fn measure_size(root: &Path) -> Option<u64> {
    let mut total: u64 = 0;
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries = fs::read_dir(&dir).await.ok()?;
        while let Some(entry) = entries.next_entry().await.ok()? {
            let metadata = entry.metadata().await.ok()?;
            if metadata.is_dir() {
                stack.push(entry.path());
            } else {
                total = total.saturating_add(metadata.len());
            }
        }
    }
    Some(total)
}
