//! Exit codes for the CLI
//!
//! Build and test failures exit with the failing Gradle run's own code.

use kmpci_core::error::{ConfigError, KmpciError};

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Exit code for an error that escaped a command
pub fn for_error(err: &anyhow::Error) -> i32 {
    let is_config = err.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || matches!(cause.downcast_ref::<KmpciError>(), Some(KmpciError::Config(_)))
    });
    if is_config {
        CONFIG_ERROR
    } else {
        ERROR
    }
}
