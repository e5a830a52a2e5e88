//! Single build-tool process execution

use std::fmt;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::Notify;
use tracing::{debug, instrument, warn};

use crate::error::{Result, TaskError};
use crate::task::BuildTool;

/// Exit code reported when a process ended without one (killed by a signal)
pub const SIGNALED_EXIT_CODE: i32 = -1;

/// Handle to a running build-tool process.
///
/// Cheap to clone and safe to share between workers. The process itself
/// stays owned by the runner that launched it; `terminate` only asks that
/// runner to signal it.
#[derive(Clone)]
pub struct ProcessHandle {
    label: String,
    pid: Option<u32>,
    stop: Arc<Notify>,
}

impl ProcessHandle {
    /// Label of the work item this process belongs to
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Request graceful termination. A no-op once the process has exited.
    pub fn terminate(&self) {
        debug!(label = %self.label, pid = ?self.pid, "termination requested");
        self.stop.notify_one();
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("label", &self.label)
            .field("pid", &self.pid)
            .finish()
    }
}

/// How a process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutput {
    /// True iff the exit code is 0
    pub success: bool,
    /// Exit code, or [`SIGNALED_EXIT_CODE`] when there was none
    pub exit_code: i32,
    /// Whether the process ended because termination was requested.
    /// A process that exits on its own terms after the request is not.
    pub terminated: bool,
}

/// Launches `<program> <args...> <tasks...>` and waits for it
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    tool: BuildTool,
}

impl ProcessRunner {
    /// Create a runner for the given build tool
    pub fn new(tool: BuildTool) -> Self {
        Self { tool }
    }

    /// The build tool this runner launches
    pub fn tool(&self) -> &BuildTool {
        &self.tool
    }

    /// Run the tasks, passing the live process handle to `on_started`
    /// before waiting for the exit.
    ///
    /// Output is inherited from the current process. A launch failure is
    /// returned as [`TaskError::Spawn`], never as a nonzero exit.
    #[instrument(skip(self, tasks, on_started), fields(program = %self.tool.program))]
    pub async fn run_one<F>(
        &self,
        label: &str,
        tasks: &[String],
        working_dir: &Path,
        on_started: F,
    ) -> Result<RunOutput>
    where
        F: FnOnce(ProcessHandle),
    {
        let program = self.tool.program_path(working_dir);
        debug!(command = %self.tool.command_line(tasks), "launching");

        let mut child = Command::new(&program)
            .args(&self.tool.args)
            .args(tasks)
            .current_dir(working_dir)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TaskError::Spawn {
                program: self.tool.program.clone(),
                source,
            })?;

        let stop = Arc::new(Notify::new());
        on_started(ProcessHandle {
            label: label.to_string(),
            pid: child.id(),
            stop: stop.clone(),
        });

        let mut requested = false;
        let status = loop {
            tokio::select! {
                biased;
                status = child.wait() => break status.map_err(TaskError::Wait)?,
                _ = stop.notified(), if !requested => {
                    requested = true;
                    send_terminate(&mut child);
                }
            }
        };

        let exit_code = status.code().unwrap_or(SIGNALED_EXIT_CODE);
        let terminated = requested && ended_by_terminate(&status);
        debug!(exit_code, requested, terminated, "process exited");
        Ok(RunOutput {
            success: exit_code == 0,
            exit_code,
            terminated,
        })
    }
}

/// Whether `status` is what a process reports after [`send_terminate`]:
/// death by signal, or the shell convention `128 + SIGTERM` used by the JVM.
#[cfg(unix)]
fn ended_by_terminate(status: &ExitStatus) -> bool {
    use nix::sys::signal::Signal;
    use std::os::unix::process::ExitStatusExt;

    status.signal().is_some() || status.code() == Some(128 + Signal::SIGTERM as i32)
}

#[cfg(not(unix))]
fn ended_by_terminate(status: &ExitStatus) -> bool {
    !status.success()
}

/// Send SIGTERM on Unix; elsewhere fall back to the platform kill.
fn send_terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                warn!(pid, error = %e, "failed to send SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = child.start_kill() {
            warn!(error = %e, "failed to kill process");
        }
    }
}
