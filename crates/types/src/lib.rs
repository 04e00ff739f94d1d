#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the pyforge project scaffolder

pub mod format;
pub mod package;
pub mod presets;
pub mod project;

pub use format::human_size;
pub use package::{dedup_packages, DedupPolicy, InstalledPackage, PackageSpec, VersionConstraint, VersionOp};
pub use presets::{builtin_preset, builtin_preset_names, BUILTIN_PRESETS};
pub use project::{ProjectOptions, ProjectSpec, StepId, PROJECT_SUBDIRS, VENV_DIR};

use serde::{Deserialize, Serialize};

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

impl Default for ColorChoice {
    fn default() -> Self {
        Self::Auto
    }
}
