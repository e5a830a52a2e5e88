//! Error types for kmpci

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using KmpciError
pub type Result<T> = std::result::Result<T, KmpciError>;

/// Main error type for kmpci operations
#[derive(Debug, Error)]
pub enum KmpciError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Base reference could not be resolved
    #[error("Unknown reference: {0}")]
    UnknownRef(String),

    /// No common ancestor between the base and HEAD
    #[error("No merge base between {base} and HEAD")]
    NoMergeBase { base: String },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}
