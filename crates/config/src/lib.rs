#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pyforge
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (`~/.config/pyforge/config.toml`)
//! - Environment variables (`PYFORGE_*`)
//! - CLI flags (applied by the binary, highest precedence)

use serde::{Deserialize, Serialize};
use pyforge_errors::{ConfigError, Error};
use pyforge_types::{builtin_preset, ColorChoice, DedupPolicy};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub paths: PathConfig,

    /// User-defined package presets; these shadow built-ins of the same name.
    #[serde(default)]
    pub presets: BTreeMap<String, Vec<String>>,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub color: ColorChoice,
}

/// Defaults for per-run project options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_true")]
    pub create_readme: bool,
    #[serde(default)]
    pub init_git: bool,
    #[serde(default = "default_true")]
    pub cleanup_on_failure: bool,
    #[serde(default)]
    pub dedup: DedupPolicy,
    /// Preset applied when the CLI does not name one.
    #[serde(default)]
    pub default_preset: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            create_readme: true,
            init_git: false,
            cleanup_on_failure: true,
            dedup: DedupPolicy::default(),
            default_preset: None,
        }
    }
}

/// Filesystem path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory new projects are created in when `--target` is omitted.
    #[serde(default)]
    pub default_target: Option<PathBuf>,
}

impl Config {
    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` when the platform config
    /// directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("pyforge").join("config.toml"))
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from the given path, or the default path, falling
    /// back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error when a file exists but cannot be read or parsed. A
    /// missing file is not an error.
    pub async fn load_or_default(path_override: Option<&Path>) -> Result<Self, Error> {
        let path = match path_override {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Persist the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<(), Error> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeFailed {
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteFailed {
                    path: parent.display().to_string(),
                    message: e.to_string(),
                })?;
        }
        fs::write(path, content)
            .await
            .map_err(|e| ConfigError::WriteFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Merge environment variables into the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unparseable values.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(color) = std::env::var("PYFORGE_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PYFORGE_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        if let Ok(cleanup) = std::env::var("PYFORGE_CLEANUP_ON_FAILURE") {
            self.project.cleanup_on_failure = parse_bool("PYFORGE_CLEANUP_ON_FAILURE", &cleanup)?;
        }

        if let Ok(readme) = std::env::var("PYFORGE_CREATE_README") {
            self.project.create_readme = parse_bool("PYFORGE_CREATE_README", &readme)?;
        }

        if let Ok(git) = std::env::var("PYFORGE_INIT_GIT") {
            self.project.init_git = parse_bool("PYFORGE_INIT_GIT", &git)?;
        }

        if let Ok(target) = std::env::var("PYFORGE_DEFAULT_TARGET") {
            self.paths.default_target = Some(PathBuf::from(target));
        }

        Ok(())
    }

    /// Resolve a preset name: user-defined presets shadow built-ins.
    #[must_use]
    pub fn resolve_preset(&self, name: &str) -> Option<Vec<String>> {
        if let Some(packages) = self.presets.get(name) {
            return Some(packages.clone());
        }
        builtin_preset(name).map(|packages| packages.iter().map(ToString::to_string).collect())
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, Error> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()),
    }
}
