//! Fail-fast parallel scheduler for build-tool work items

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::reporter::{TaskEvent, TaskReporter};
use crate::runner::{ProcessHandle, ProcessRunner};
use crate::task::{BuildTool, WorkItem};

/// Default number of build-tool processes allowed at once
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Exit code recorded when a build tool could not be launched
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 1;

/// Terminal state of a single work item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Exited with code 0
    Succeeded,
    /// Exited with a nonzero code on its own
    Failed(i32),
    /// Exited after being terminated because another item failed
    Cancelled(i32),
    /// Never started because a failure had already been recorded
    Skipped,
    /// The build tool could not be launched
    LaunchFailed(String),
    /// Dry run; nothing was launched
    WouldRun,
}

impl ItemStatus {
    /// Check if this status represents success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded | Self::WouldRun)
    }

    /// Check if this status counts as a failure of the item itself
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::LaunchFailed(_))
    }
}

/// Result of a single work item
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    /// Work item label
    pub label: String,
    /// Tasks the item ran (or would have run)
    pub tasks: Vec<String>,
    /// How the item ended
    pub status: ItemStatus,
    /// Wall-clock time from launch to exit
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl ItemResult {
    fn new(item: WorkItem, status: ItemStatus, duration: Duration) -> Self {
        Self {
            label: item.label,
            tasks: item.tasks,
            status,
            duration,
        }
    }
}

/// Aggregate outcome of [`TaskScheduler::run_all`]
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// 0 if every item succeeded, else the first failure's exit code
    pub exit_code: i32,
    /// Label of the first item to fail
    pub failed_label: Option<String>,
    /// Per-item results in input order
    pub results: Vec<ItemResult>,
}

impl RunOutcome {
    /// Check if nothing failed
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Options for the task scheduler
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Maximum concurrent build-tool processes
    pub concurrency: usize,
    /// Report what would run without launching anything
    pub dry_run: bool,
    /// Build tool invocation shared by every item
    pub tool: BuildTool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            dry_run: false,
            tool: BuildTool::default(),
        }
    }
}

/// First-failure record and handle registry, guarded by one mutex
#[derive(Default)]
struct Coordination {
    first_failure: Option<(String, i32)>,
    running: Vec<(usize, ProcessHandle)>,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Coordination>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Coordination> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn has_failed(&self) -> bool {
        self.lock().first_failure.is_some()
    }

    /// Track a freshly launched process. One that starts after the first
    /// failure is told to stop straight away.
    fn register(&self, index: usize, handle: ProcessHandle) {
        let mut state = self.lock();
        if state.first_failure.is_some() {
            debug!(label = handle.label(), "started after failure, terminating");
            handle.terminate();
        }
        state.running.push((index, handle));
    }

    /// Record a failure. Only the first caller wins; it terminates every
    /// other registered process once and returns how many it signalled.
    fn record_failure(&self, index: usize, label: &str, exit_code: i32) -> Option<usize> {
        let siblings: Vec<ProcessHandle> = {
            let mut state = self.lock();
            if state.first_failure.is_some() {
                return None;
            }
            state.first_failure = Some((label.to_string(), exit_code));
            state
                .running
                .iter()
                .filter(|(i, _)| *i != index)
                .map(|(_, handle)| handle.clone())
                .collect()
        };

        for handle in &siblings {
            handle.terminate();
        }
        Some(siblings.len())
    }

    fn first_failure(&self) -> Option<(String, i32)> {
        self.lock().first_failure.clone()
    }
}

/// Runs work items on a bounded pool and stops everything at the first failure
pub struct TaskScheduler {
    options: SchedulerOptions,
    runner: ProcessRunner,
    reporter: Arc<dyn TaskReporter>,
}

impl TaskScheduler {
    /// Create a new scheduler
    pub fn new(options: SchedulerOptions, reporter: Arc<dyn TaskReporter>) -> Self {
        let runner = ProcessRunner::new(options.tool.clone());
        Self {
            options,
            runner,
            reporter,
        }
    }

    /// Run every item from `working_dir`.
    ///
    /// At most `concurrency` processes run at once. When an item fails, the
    /// running siblings are terminated and items not yet started are
    /// skipped. Returns once every launched process has exited.
    pub async fn run_all(&self, items: Vec<WorkItem>, working_dir: &Path) -> RunOutcome {
        let start = Instant::now();

        let shared = Shared::default();

        let results = if self.options.dry_run {
            self.dry_run(items)
        } else if items.len() == 1 {
            // A single item needs no pool.
            let mut results = Vec::with_capacity(1);
            for item in items {
                results.push(
                    run_item(&self.runner, &shared, &*self.reporter, working_dir, 0, item).await,
                );
            }
            results
        } else {
            self.run_pool(items, working_dir, &shared).await
        };

        let (failed_label, exit_code) = match shared.first_failure() {
            Some((label, code)) => (Some(label), code),
            None => (None, 0),
        };

        self.reporter.report(&TaskEvent::AllCompleted {
            total: results.len(),
            succeeded: results.iter().filter(|r| r.status.is_success()).count(),
            failed: results.iter().filter(|r| r.status.is_failure()).count(),
            cancelled: results
                .iter()
                .filter(|r| matches!(r.status, ItemStatus::Cancelled(_)))
                .count(),
            skipped: results
                .iter()
                .filter(|r| r.status == ItemStatus::Skipped)
                .count(),
            duration: start.elapsed(),
        });

        RunOutcome {
            exit_code,
            failed_label,
            results,
        }
    }

    fn dry_run(&self, items: Vec<WorkItem>) -> Vec<ItemResult> {
        items
            .into_iter()
            .map(|item| {
                self.reporter.report(&TaskEvent::WouldRun {
                    label: item.label.clone(),
                    command: self.options.tool.command_line(&item.tasks),
                });
                ItemResult::new(item, ItemStatus::WouldRun, Duration::ZERO)
            })
            .collect()
    }

    async fn run_pool(
        &self,
        items: Vec<WorkItem>,
        working_dir: &Path,
        shared: &Shared,
    ) -> Vec<ItemResult> {
        let concurrency = self.options.concurrency.max(1);
        info!(items = items.len(), concurrency, "running work items");

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut slots: Vec<Option<ItemResult>> = Vec::with_capacity(items.len());
        let mut handles = Vec::new();

        for (index, item) in items.into_iter().enumerate() {
            slots.push(None);

            let permit = semaphore.clone().acquire_owned().await;
            let permit = match permit {
                Ok(permit) if !shared.has_failed() => permit,
                _ => {
                    self.reporter.report(&TaskEvent::Skipped {
                        label: item.label.clone(),
                        reason: "an earlier work item failed".to_string(),
                    });
                    slots[index] = Some(ItemResult::new(item, ItemStatus::Skipped, Duration::ZERO));
                    continue;
                }
            };

            let runner = self.runner.clone();
            let shared = shared.clone();
            let reporter = self.reporter.clone();
            let working_dir = working_dir.to_path_buf();
            let fallback = item.clone();

            let handle = tokio::spawn(async move {
                let result = run_item(&runner, &shared, &*reporter, &working_dir, index, item).await;
                drop(permit);
                result
            });
            handles.push((index, fallback, handle));
        }

        for (index, item, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let message = format!("worker panicked: {}", e);
                    if let Some(terminated) =
                        shared.record_failure(index, &item.label, LAUNCH_FAILURE_EXIT_CODE)
                    {
                        self.reporter.report(&TaskEvent::FailFast {
                            label: item.label.clone(),
                            exit_code: LAUNCH_FAILURE_EXIT_CODE,
                            terminated,
                        });
                    }
                    ItemResult::new(item, ItemStatus::LaunchFailed(message), Duration::ZERO)
                }
            };
            slots[index] = Some(result);
        }

        slots.into_iter().flatten().collect()
    }
}

/// Launch one item, register its process and classify how it ended
async fn run_item(
    runner: &ProcessRunner,
    shared: &Shared,
    reporter: &dyn TaskReporter,
    working_dir: &Path,
    index: usize,
    item: WorkItem,
) -> ItemResult {
    let start = Instant::now();
    reporter.report(&TaskEvent::Started {
        label: item.label.clone(),
        command: runner.tool().command_line(&item.tasks),
    });

    let output = runner
        .run_one(&item.label, &item.tasks, working_dir, |handle| {
            shared.register(index, handle)
        })
        .await;
    let duration = start.elapsed();

    let (status, failure_code) = match output {
        Ok(output) if output.success => {
            reporter.report(&TaskEvent::Completed {
                label: item.label.clone(),
                duration,
            });
            (ItemStatus::Succeeded, None)
        }
        Ok(output) if output.terminated => {
            reporter.report(&TaskEvent::Cancelled {
                label: item.label.clone(),
                duration,
            });
            (ItemStatus::Cancelled(output.exit_code), None)
        }
        Ok(output) => {
            reporter.report(&TaskEvent::Failed {
                label: item.label.clone(),
                duration,
                error: format!("exit code {}", output.exit_code),
            });
            (ItemStatus::Failed(output.exit_code), Some(output.exit_code))
        }
        Err(e) => {
            reporter.report(&TaskEvent::Failed {
                label: item.label.clone(),
                duration,
                error: e.to_string(),
            });
            (
                ItemStatus::LaunchFailed(e.to_string()),
                Some(LAUNCH_FAILURE_EXIT_CODE),
            )
        }
    };

    if let Some(code) = failure_code {
        if let Some(terminated) = shared.record_failure(index, &item.label, code) {
            reporter.report(&TaskEvent::FailFast {
                label: item.label.clone(),
                exit_code: code,
                terminated,
            });
        }
    }

    ItemResult::new(item, status, duration)
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}
