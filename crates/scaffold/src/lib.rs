#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Project creation worker and command pipeline for pyforge
//!
//! This crate owns the lifecycle of a creation run: it validates the
//! request before any filesystem mutation, drives the fixed step pipeline
//! on a background task, honors cooperative cancellation at step
//! boundaries, and guarantees the filesystem ends either as the complete
//! intended tree or (when cleanup is enabled) with no trace of a partial
//! one.
//!
//! External tools (python, pip, git) are reached through the facility
//! traits in [`facilities`], so tests drive the worker with in-process
//! doubles.

mod command;
mod facilities;
mod git;
mod pipeline;
mod python;
mod templates;
mod validation;
mod worker;

pub use command::{run_streamed, CommandOutput};
pub use facilities::{EnvProvisioner, Facilities, PackageInstaller, VcsFacility};
pub use git::GitCli;
pub use pipeline::{step_sequence, Step};
pub use python::{PipInstaller, PythonVenv};
pub use validation::validate;
pub use worker::{ProjectWorker, RunHandle, RunOutcome};
