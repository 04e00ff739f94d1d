//! Pre-flight validation error types
//!
//! Every variant here is raised before any filesystem mutation, so a
//! validation failure never triggers cleanup.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("project name cannot be empty")]
    EmptyName,

    #[error("invalid project name {name:?}: {message}")]
    InvalidName { name: String, message: String },

    #[error("project name {name:?} is a reserved device name")]
    ReservedName { name: String },

    #[error("project name {name:?} exceeds {max} characters")]
    NameTooLong { name: String, max: usize },

    #[error("target directory does not exist: {path}")]
    TargetMissing { path: String },

    #[error("target is not a directory: {path}")]
    TargetNotDirectory { path: String },

    #[error("target directory is not writable: {path}")]
    TargetNotWritable { path: String },

    #[error("project path already exists: {path}")]
    ProjectExists { path: String },

    #[error("invalid package specifier {spec:?}: {message}")]
    InvalidPackage { spec: String, message: String },
}
