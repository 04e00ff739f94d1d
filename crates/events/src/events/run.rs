//! Run lifecycle events

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FailureContext;
use crate::EventLevel;
use pyforge_types::{InstalledPackage, StepId};

/// Final report for a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Identifier of the run this summary belongs to.
    pub run_id: Uuid,
    /// Root directory of the created project.
    pub project_path: PathBuf,
    /// Steps that succeeded, in execution order.
    pub completed_steps: Vec<StepId>,
    /// Packages installed into the environment, in install order.
    pub installed_packages: Vec<InstalledPackage>,
    /// Total on-disk size of the tree; `None` means "unknown".
    pub project_size: Option<u64>,
    /// Whether a git repository with an initial commit was created.
    pub git_initialized: bool,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

/// Terminal run-level events
///
/// Exactly one of these is emitted per run, always last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    /// All enabled steps succeeded.
    Completed { summary: RunSummary },

    /// A step failed; `completed_steps` lists what finished beforehand,
    /// `cleanup_performed` says whether the partial tree was removed.
    Failed {
        failure: FailureContext,
        completed_steps: Vec<StepId>,
        cleanup_performed: bool,
    },

    /// The user cancelled the run at a checkpoint.
    Cancelled {
        completed_steps: Vec<StepId>,
        cleanup_performed: bool,
    },
}

impl RunEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Completed { .. } => EventLevel::Info,
            Self::Cancelled { .. } => EventLevel::Warn,
            Self::Failed { .. } => EventLevel::Error,
        }
    }
}
