//! Configuration error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("failed to write config file {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("invalid config file: {message}")]
    ParseFailed { message: String },

    #[error("failed to serialize config: {message}")]
    SerializeFailed { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("could not determine a config directory for this platform")]
    NoConfigDir,
}
