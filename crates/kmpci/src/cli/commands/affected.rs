//! Affected command - show which platforms the current changes touch

use clap::Args;
use console::style;
use tracing::info;

use kmpci_core::platform::display_set;
use kmpci_core::{aggregate, ChangeSet};

use crate::cli::context::Workspace;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Show the platforms affected by changes since the base ref
#[derive(Debug, Args)]
pub struct AffectedCommand {
    /// Base ref to diff against (default: `changes.base` from config)
    #[arg(long)]
    pub base: Option<String>,
}

impl AffectedCommand {
    /// Execute the affected command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        let workspace = Workspace::load()?;
        let base = workspace.base(self.base.as_deref());
        info!(base, "executing affected command");

        let files = workspace.changed_files(base);
        let change_set = aggregate(&files);

        match cli.format {
            OutputFormat::Json => {
                let report = serde_json::json!({
                    "base": base,
                    "config_path": workspace.config_path,
                    "changed_files": files,
                    "change_set": change_set,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    println!("{}", change_set);
                    return Ok(exit_codes::SUCCESS);
                }

                println!("{}", output::header("Affected platforms"));
                let config = match &workspace.config_path {
                    Some(path) => output::path_style().apply_to(path.display()).to_string(),
                    None => style("defaults").yellow().to_string(),
                };
                println!("{}", output::key_value("Config", &config));
                println!("{}", output::key_value("Base", base));
                println!("{}", output::key_value("Changed files", &files.len().to_string()));
                if cli.verbose {
                    for file in &files {
                        println!("    {}", output::path_style().apply_to(file));
                    }
                }
                println!();

                match &change_set {
                    ChangeSet::FullRebuild => {
                        output::warning("Build configuration changed: full rebuild required");
                    }
                    ChangeSet::Affected { main, test } => {
                        if files.is_empty() {
                            output::info("No changed files; a full build will run");
                        } else if main.is_empty() && test.is_empty() {
                            output::info("Changes affect no platform");
                        }
                        println!("{}", output::key_value("Main", &style(display_set(main)).bold().to_string()));
                        println!("{}", output::key_value("Test", &style(display_set(test)).bold().to_string()));
                    }
                }
            }
        }

        Ok(exit_codes::SUCCESS)
    }
}
