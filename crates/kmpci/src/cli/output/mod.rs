//! Output formatting utilities

use console::{style, Style};

use kmpci_tasks::{TaskEvent, TaskReporter};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for platform identifiers
pub fn platform_style() -> Style {
    Style::new().magenta().bold()
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Prints work item progress to the terminal
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl TaskReporter for ConsoleReporter {
    fn report(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Started { label, command } => {
                println!(
                    "  {} {} {}",
                    style("▸").dim(),
                    platform_style().apply_to(label),
                    if self.verbose {
                        style(format!("({})", command)).dim().to_string()
                    } else {
                        String::new()
                    }
                );
            }
            TaskEvent::Completed { label, duration } => {
                println!(
                    "  {} {} {}",
                    style("✓").green(),
                    style(label).green(),
                    style(format!("{:.1}s", duration.as_secs_f64())).dim()
                );
            }
            TaskEvent::Failed {
                label,
                duration,
                error,
            } => {
                println!(
                    "  {} {} {} {}",
                    style("✗").red(),
                    style(label).red(),
                    style(format!("{:.1}s", duration.as_secs_f64())).dim(),
                    style(error).red().dim()
                );
            }
            TaskEvent::Cancelled { label, duration } => {
                println!(
                    "  {} {} {} {}",
                    style("○").yellow(),
                    style(label).yellow(),
                    style(format!("{:.1}s", duration.as_secs_f64())).dim(),
                    style("(cancelled)").dim()
                );
            }
            TaskEvent::Skipped { label, reason } => {
                println!(
                    "  {} {} {}",
                    style("○").yellow(),
                    style(label).yellow(),
                    style(format!("({})", reason)).dim()
                );
            }
            TaskEvent::WouldRun { label, command } => {
                println!(
                    "  {} {} {}",
                    style("[dry-run]").yellow(),
                    platform_style().apply_to(label),
                    command
                );
            }
            TaskEvent::FailFast {
                label, terminated, ..
            } => {
                if self.verbose && *terminated > 0 {
                    println!(
                        "  {} {} failed, stopping {} running",
                        style("─").dim(),
                        label,
                        terminated
                    );
                }
            }
            TaskEvent::AllCompleted {
                total,
                succeeded,
                failed,
                cancelled,
                skipped,
                duration,
            } => {
                if *total < 2 {
                    return;
                }
                println!();
                println!(
                    "  {} {}/{} succeeded, {} failed, {} cancelled, {} skipped ({:.1}s)",
                    if *failed == 0 {
                        style("✓").green().bold()
                    } else {
                        style("✗").red().bold()
                    },
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
