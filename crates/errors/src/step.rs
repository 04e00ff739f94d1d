//! Pipeline step execution error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StepError {
    #[error("virtual environment creation failed: {message}")]
    EnvCreationFailed { message: String },

    #[error("failed to install {package}: {message}")]
    InstallFailed { package: String, message: String },

    #[error("failed to spawn {program}: {message}")]
    CommandSpawnFailed { program: String, message: String },

    #[error("{program} exited with status {exit_code:?}: {message}")]
    CommandFailed {
        program: String,
        exit_code: Option<i32>,
        message: String,
    },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    Filesystem {
        operation: String,
        path: String,
        message: String,
    },

    #[error("git operation failed: {message}")]
    GitFailed { message: String },
}

impl StepError {
    /// Wrap an I/O error with the filesystem operation and path it hit.
    pub fn filesystem(
        operation: impl Into<String>,
        path: &std::path::Path,
        err: &std::io::Error,
    ) -> Self {
        Self::Filesystem {
            operation: operation.into(),
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Whether re-running the whole tool might succeed without changes.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        // Package installs fail transiently (index timeouts); the rest
        // point at local state the user has to fix first.
        matches!(self, Self::InstallFailed { .. })
    }
}
