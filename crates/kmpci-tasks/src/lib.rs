//! kmpci Tasks - build-tool execution
//!
//! This crate launches Gradle for groups of tasks, runs several groups in
//! parallel with fail-fast cancellation, and checks library-scoped task
//! names against the build's own task listing.

pub mod discovery;
pub mod error;
pub mod reporter;
pub mod runner;
pub mod scheduler;
pub mod task;

pub use discovery::{discover_tasks, parse_task_listing, resolve_library_tasks};
pub use error::{Result, TaskError};
pub use reporter::{CollectingReporter, TaskEvent, TaskReporter, TaskReporterRegistry, TracingReporter};
pub use runner::{ProcessHandle, ProcessRunner, RunOutput};
pub use scheduler::{
    ItemResult, ItemStatus, RunOutcome, SchedulerOptions, TaskScheduler, DEFAULT_CONCURRENCY,
    LAUNCH_FAILURE_EXIT_CODE,
};
pub use task::{BuildTool, WorkItem};
