//! Error types for build-tool execution

use thiserror::Error;

/// Result type for task execution
pub type Result<T> = std::result::Result<T, TaskError>;

/// Failures that are not an ordinary nonzero exit
#[derive(Debug, Error)]
pub enum TaskError {
    /// The build tool could not be started at all
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting for a running build tool failed
    #[error("Failed to wait for build tool: {0}")]
    Wait(#[source] std::io::Error),

    /// The task listing used for task discovery exited nonzero
    #[error("Task discovery failed with exit code {code}: {output}")]
    Discovery { code: i32, output: String },
}
