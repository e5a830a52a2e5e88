//! Configuration types

use serde::{Deserialize, Serialize};

use crate::libraries::DEFAULT_LIBRARIES_DIR;

/// Main configuration for kmpci
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Change detection configuration
    pub changes: ChangesConfig,

    /// Build-tool runner configuration
    pub runner: RunnerConfig,

    /// Library scoping configuration
    pub scope: ScopeConfig,
}

/// Change detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangesConfig {
    /// Reference the current `HEAD` is compared against
    pub base: String,
}

impl Default for ChangesConfig {
    fn default() -> Self {
        Self {
            base: "origin/main".to_string(),
        }
    }
}

/// Build-tool runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Build-tool entrypoint, relative to the repository root or on `PATH`
    pub entrypoint: String,

    /// Arguments placed before the task names
    pub args: Vec<String>,

    /// Maximum number of build-tool processes running at once
    pub max_concurrency: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            entrypoint: "./gradlew".to_string(),
            args: vec!["--daemon".to_string()],
            max_concurrency: 3,
        }
    }
}

/// Library scoping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Directory containing one Gradle project per library
    pub libraries_dir: String,

    /// Confirm scoped task names against the build tool's task listing
    pub resolve_tasks: bool,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            libraries_dir: DEFAULT_LIBRARIES_DIR.to_string(),
            resolve_tasks: true,
        }
    }
}
