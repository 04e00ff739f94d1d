//! Integration tests for error types

use pyforge_errors::{Error, StepError, ValidationError};

#[test]
fn validation_error_converts_to_root_error() {
    let err: Error = ValidationError::EmptyName.into();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(
        err.to_string(),
        "validation error: project name cannot be empty"
    );
}

#[test]
fn io_error_carries_kind_and_path() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = Error::io_with_path(&io, "/tmp/project");
    match err {
        Error::Io { kind, path, .. } => {
            assert_eq!(kind, std::io::ErrorKind::PermissionDenied);
            assert_eq!(path.as_deref(), Some(std::path::Path::new("/tmp/project")));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn install_failures_are_retryable() {
    let err = StepError::InstallFailed {
        package: "flask".to_string(),
        message: "timed out".to_string(),
    };
    assert!(err.is_retryable());

    let err = StepError::GitFailed {
        message: "not a repo".to_string(),
    };
    assert!(!err.is_retryable());
}
