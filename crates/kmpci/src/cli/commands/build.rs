//! Build command - compile main code for the platforms it affects

use clap::Args;
use tracing::info;

use kmpci_core::mapping::FALLBACK_TASK;
use kmpci_core::{aggregate, tasks_for, ChangeSet, TaskCategory};
use kmpci_tasks::WorkItem;

use crate::cli::context::Workspace;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Compile main code for the platforms affected by changes since the base ref
#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Base ref to diff against (default: `changes.base` from config)
    #[arg(long)]
    pub base: Option<String>,

    /// Print the Gradle command without running it
    #[arg(long)]
    pub dry_run: bool,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<i32> {
        let workspace = Workspace::load()?;
        let base = workspace.base(self.base.as_deref());
        info!(base, dry_run = self.dry_run, "executing build command");

        let files = workspace.changed_files(base);
        let Some(tasks) = compile_tasks(&files) else {
            if cli.shows_progress() {
                output::success("No main-code changes; nothing to compile");
            }
            return Ok(exit_codes::SUCCESS);
        };

        let outcome = workspace
            .run(cli, vec![WorkItem::new("compile", tasks)], Some(1), self.dry_run)
            .await;

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Ok(outcome.exit_code)
    }
}

/// Compile tasks for the changed files, or `None` when no main code changed.
///
/// No changes at all and build-configuration changes both compile everything.
fn compile_tasks(files: &[String]) -> Option<Vec<String>> {
    if files.is_empty() {
        return Some(vec![FALLBACK_TASK.to_string()]);
    }

    match aggregate(files) {
        ChangeSet::FullRebuild => Some(vec![FALLBACK_TASK.to_string()]),
        ChangeSet::Affected { main, .. } if main.is_empty() => None,
        ChangeSet::Affected { main, .. } => Some(tasks_for(Some(&main), TaskCategory::Compile)),
    }
}
