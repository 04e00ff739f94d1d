//! Pre-flight validation of a `ProjectSpec`
//!
//! Runs synchronously inside `ProjectWorker::start`, before the worker
//! task is spawned. Nothing here mutates the target directory beyond a
//! single write-probe file that is removed again, so a failed validation
//! leaves zero trace.

use pyforge_errors::ValidationError;
use pyforge_types::ProjectSpec;
use std::path::Path;

/// Longest accepted project name.
const MAX_NAME_LEN: usize = 64;

/// Windows device names that are unusable as directory names anywhere.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Validate a project spec against the filesystem.
///
/// # Errors
///
/// Returns the first `ValidationError` encountered, checking in order:
/// name syntax, target existence, project path collision, target
/// writability. The collision check runs before the write probe so a
/// colliding spec fails with zero filesystem writes.
/// Package specifiers are validated at parse time by
/// `PackageSpec::parse`, so a constructed spec is already specifier-clean.
pub fn validate(spec: &ProjectSpec) -> Result<(), ValidationError> {
    validate_name(&spec.name)?;
    validate_target_kind(&spec.target)?;

    let project_dir = spec.project_dir();
    if project_dir.exists() {
        return Err(ValidationError::ProjectExists {
            path: project_dir.display().to_string(),
        });
    }
    validate_target_writable(&spec.target)
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            name: name.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    let stem = name.split('.').next().unwrap_or(name);
    if RESERVED_NAMES
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
    {
        return Err(ValidationError::ReservedName {
            name: name.to_string(),
        });
    }

    let invalid = |message: &str| ValidationError::InvalidName {
        name: name.to_string(),
        message: message.to_string(),
    };

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(invalid("only letters, digits, '.', '_' and '-' are allowed"));
    }
    // Catches "." and "..", and names that hide their extension on Windows.
    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid("name cannot start or end with a dot"));
    }
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("name must start with a letter or digit"));
    }
    Ok(())
}

fn validate_target_kind(target: &Path) -> Result<(), ValidationError> {
    let metadata = match std::fs::metadata(target) {
        Ok(metadata) => metadata,
        Err(_) => {
            return Err(ValidationError::TargetMissing {
                path: target.display().to_string(),
            })
        }
    };
    if !metadata.is_dir() {
        return Err(ValidationError::TargetNotDirectory {
            path: target.display().to_string(),
        });
    }
    Ok(())
}

fn validate_target_writable(target: &Path) -> Result<(), ValidationError> {
    // A metadata readonly bit is not reliable across platforms, so probe
    // with an actual create-and-remove.
    let probe = target.join(format!(".pyforge-write-probe-{}", std::process::id()));
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
    {
        Ok(file) => {
            drop(file);
            let _ = std::fs::remove_file(&probe);
            Ok(())
        }
        Err(_) => Err(ValidationError::TargetNotWritable {
            path: target.display().to_string(),
        }),
    }
}
