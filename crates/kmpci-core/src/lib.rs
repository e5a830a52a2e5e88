//! kmpci Core - change classification for multi-platform Gradle builds
//!
//! This crate turns a list of changed file paths into the platforms they
//! affect and the Gradle tasks that must run for those platforms. It also
//! holds the configuration system and the shared error types.

pub mod changes;
pub mod classify;
pub mod config;
pub mod error;
pub mod libraries;
pub mod mapping;
pub mod platform;

pub use changes::{aggregate, ChangeSet};
pub use classify::{classify, is_test_path, Classification};
pub use error::{KmpciError, Result};
pub use libraries::{library_project_paths, scope_tasks_to_libraries};
pub use mapping::{tasks_by_platform, tasks_for, TaskCategory, FALLBACK_TASK};
pub use platform::{parse_platform_list, Platform, PlatformSet};
