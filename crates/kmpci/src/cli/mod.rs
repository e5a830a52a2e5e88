//! CLI definition and command handling

pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{AffectedCommand, BuildCommand, CompletionsCommand, InitCommand, TestCommand};

/// kmpci - Run only the Gradle tasks your changes affect
#[derive(Debug, Parser)]
#[command(name = "kmpci")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show which platforms the changes since the base ref affect
    Affected(AffectedCommand),

    /// Compile main code for the affected platforms
    Build(BuildCommand),

    /// Run tests for the affected platforms, one Gradle run per platform
    Test(TestCommand),

    /// Write a default kmpci configuration
    Init(InitCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command, returning the process exit code
    pub fn execute(self) -> anyhow::Result<i32> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Affected(ref cmd) => cmd.execute(&self),
            Commands::Build(ref cmd) => cmd.execute(&self),
            Commands::Test(ref cmd) => cmd.execute(&self),
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Whether human-readable progress should be printed
    pub fn shows_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_test_command() {
        let cli = Cli::parse_from([
            "kmpci",
            "--format",
            "json",
            "test",
            "--platforms",
            "jvm,android",
            "--max-concurrency",
            "2",
            "--dry-run",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.shows_progress());
        match cli.command {
            Commands::Test(cmd) => {
                assert_eq!(cmd.platforms.as_deref(), Some("jvm,android"));
                assert_eq!(cmd.max_concurrency, Some(2));
                assert!(cmd.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kmpci", "affected", "--base", "origin/develop", "-v"]);
        assert!(cli.verbose);
        assert!(cli.shows_progress());
    }
}
