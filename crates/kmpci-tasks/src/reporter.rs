//! Task execution reporting

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Events emitted while work items run
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// A build-tool process is about to launch
    Started { label: String, command: String },
    /// A process exited successfully
    Completed { label: String, duration: Duration },
    /// A process failed to launch or exited nonzero
    Failed {
        label: String,
        duration: Duration,
        error: String,
    },
    /// A process exited after being terminated because a sibling failed
    Cancelled { label: String, duration: Duration },
    /// A work item was never started
    Skipped { label: String, reason: String },
    /// Dry run: the command that would have been launched
    WouldRun { label: String, command: String },
    /// The first failure was recorded and siblings were told to stop
    FailFast {
        label: String,
        exit_code: i32,
        terminated: usize,
    },
    /// All work items reached a terminal state
    AllCompleted {
        total: usize,
        succeeded: usize,
        failed: usize,
        cancelled: usize,
        skipped: usize,
        duration: Duration,
    },
}

/// Trait for reporting task execution progress
pub trait TaskReporter: Send + Sync {
    /// Handle a task event
    fn report(&self, event: &TaskEvent);
}

/// Simple reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TaskReporter for TracingReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Started { label, command } => {
                tracing::info!(label, command, "starting");
            }
            TaskEvent::Completed { label, duration } => {
                tracing::info!("{} completed in {:.1}s", label, duration.as_secs_f64());
            }
            TaskEvent::Failed {
                label,
                duration,
                error,
            } => {
                tracing::error!("{} failed after {:.1}s: {}", label, duration.as_secs_f64(), error);
            }
            TaskEvent::Cancelled { label, duration } => {
                tracing::warn!("{} cancelled after {:.1}s", label, duration.as_secs_f64());
            }
            TaskEvent::Skipped { label, reason } => {
                tracing::info!("{} skipped: {}", label, reason);
            }
            TaskEvent::WouldRun { label, command } => {
                tracing::info!(label, command, "dry run");
            }
            TaskEvent::FailFast {
                label,
                exit_code,
                terminated,
            } => {
                tracing::warn!(
                    label,
                    exit_code,
                    terminated,
                    "first failure, terminating running siblings"
                );
            }
            TaskEvent::AllCompleted {
                total,
                succeeded,
                failed,
                cancelled,
                skipped,
                duration,
            } => {
                tracing::info!(
                    "All work complete: {}/{} succeeded, {} failed, {} cancelled, {} skipped ({:.1}s)",
                    succeeded,
                    total,
                    failed,
                    cancelled,
                    skipped,
                    duration.as_secs_f64()
                );
            }
        }
    }
}

/// Reporter that collects events for later inspection (useful for testing)
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<TaskEvent>>,
}

impl CollectingReporter {
    /// Get all collected events
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TaskReporter for CollectingReporter {
    fn report(&self, event: &TaskEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Fans events out to several reporters.
///
/// Always starts with the tracing reporter so every run lands in the log.
pub struct TaskReporterRegistry {
    reporters: Vec<Arc<dyn TaskReporter>>,
}

impl TaskReporterRegistry {
    /// Registry with the tracing reporter installed
    pub fn new() -> Self {
        Self {
            reporters: vec![Arc::new(TracingReporter)],
        }
    }

    /// Add a reporter
    pub fn register<R: TaskReporter + 'static>(&mut self, reporter: R) {
        self.reporters.push(Arc::new(reporter));
    }
}

impl Default for TaskReporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskReporter for TaskReporterRegistry {
    fn report(&self, event: &TaskEvent) {
        for reporter in &self.reporters {
            reporter.report(event);
        }
    }
}
