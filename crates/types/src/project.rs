//! Project creation request types

use crate::package::{DedupPolicy, PackageSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Feature toggles for a creation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOptions {
    /// Generate a README.md (step is skipped-as-success when false).
    #[serde(default = "default_true")]
    pub create_readme: bool,
    /// Initialize a git repository with an initial commit.
    #[serde(default)]
    pub init_git: bool,
    /// Delete the partial tree when the run fails or is cancelled.
    #[serde(default = "default_true")]
    pub cleanup_on_failure: bool,
    /// Tie-break for duplicate package names in the request.
    #[serde(default)]
    pub dedup: DedupPolicy,
}

fn default_true() -> bool {
    true
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            create_readme: true,
            init_git: false,
            cleanup_on_failure: true,
            dedup: DedupPolicy::default(),
        }
    }
}

/// Immutable input to a single creation run
///
/// Constructed once from user input, validated by the worker before any
/// filesystem mutation, then owned by the worker task for the run's
/// duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    pub name: String,
    pub target: PathBuf,
    pub packages: Vec<PackageSpec>,
    pub options: ProjectOptions,
}

impl ProjectSpec {
    /// The directory the run will create: `target/name`.
    #[must_use]
    pub fn project_dir(&self) -> PathBuf {
        self.target.join(&self.name)
    }
}

/// Identifier for one pipeline step, in canonical execution order
///
/// The order is a compatibility contract: later steps assume earlier ones
/// succeeded (packages install into the venv, the manifest lists what was
/// installed, the initial commit captures the tree as built).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Layout,
    Venv,
    Packages,
    Manifest,
    Readme,
    Git,
    Size,
}

impl StepId {
    /// All steps in canonical order.
    pub const SEQUENCE: [Self; 7] = [
        Self::Layout,
        Self::Venv,
        Self::Packages,
        Self::Manifest,
        Self::Readme,
        Self::Git,
        Self::Size,
    ];

    /// Human-readable step label used in progress output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Layout => "create project layout",
            Self::Venv => "create virtual environment",
            Self::Packages => "install packages",
            Self::Manifest => "write requirements.txt",
            Self::Readme => "write README.md",
            Self::Git => "initialize git repository",
            Self::Size => "measure project size",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Well-known subdirectories created inside every project root.
pub const PROJECT_SUBDIRS: [&str; 7] = ["src", "tests", "docs", "data", "notebooks", "config", "logs"];

/// Name of the virtual environment directory inside the project root.
pub const VENV_DIR: &str = "venv";
