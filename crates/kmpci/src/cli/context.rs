//! State shared by the commands that inspect changes and run Gradle

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use kmpci_core::config::{load_config_or_default, Config};
use kmpci_core::library_project_paths;
use kmpci_tasks::{
    BuildTool, RunOutcome, SchedulerOptions, TaskReporterRegistry, TaskScheduler, WorkItem,
};

use crate::cli::output::ConsoleReporter;
use crate::cli::Cli;

/// Repository root plus the configuration that applies to it
#[derive(Debug)]
pub struct Workspace {
    /// Repository root; Gradle runs from here
    pub root: PathBuf,
    /// Loaded configuration, or defaults
    pub config: Config,
    /// Where the configuration came from
    pub config_path: Option<PathBuf>,
}

impl Workspace {
    /// Locate the repository containing the current directory and load its config
    pub fn load() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::load_from(&cwd)
    }

    /// Same as [`Workspace::load`], starting from `dir`
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let root = kmpci_git::repo_root(dir);
        let (config, config_path) = load_config_or_default(dir)?;
        info!(root = %root.display(), config = ?config_path, "loaded workspace");
        Ok(Self {
            root,
            config,
            config_path,
        })
    }

    /// Base ref to diff against; a command-line value wins over config
    pub fn base<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.unwrap_or(&self.config.changes.base)
    }

    /// Files changed between the merge base of `base` and `HEAD`
    pub fn changed_files(&self, base: &str) -> Vec<String> {
        kmpci_git::changed_files_since(&self.root, base)
    }

    /// Gradle projects under the libraries directory
    pub fn library_projects(&self) -> Vec<String> {
        library_project_paths(&self.root, &self.config.scope.libraries_dir)
    }

    /// Build tool invocation from config
    pub fn tool(&self) -> BuildTool {
        BuildTool::from(&self.config.runner)
    }

    /// Run work items through the scheduler.
    ///
    /// Events always go to the log; the console reporter is added unless
    /// output is quiet or JSON.
    pub async fn run(
        &self,
        cli: &Cli,
        items: Vec<WorkItem>,
        concurrency: Option<usize>,
        dry_run: bool,
    ) -> RunOutcome {
        let mut reporters = TaskReporterRegistry::new();
        if cli.shows_progress() {
            reporters.register(ConsoleReporter::new(cli.verbose));
        }

        let options = SchedulerOptions {
            concurrency: concurrency.unwrap_or(self.config.runner.max_concurrency),
            dry_run,
            tool: self.tool(),
        };

        TaskScheduler::new(options, Arc::new(reporters))
            .run_all(items, &self.root)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_outside_repository_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::load_from(temp.path()).unwrap();
        assert_eq!(workspace.root, temp.path());
        assert_eq!(workspace.config, Config::default());
        assert!(workspace.config_path.is_none());
        assert_eq!(workspace.base(None), "origin/main");
        assert_eq!(workspace.base(Some("origin/develop")), "origin/develop");
    }

    #[test]
    fn test_load_reads_config_and_libraries() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("kmpci.toml"),
            "[changes]\nbase = \"origin/trunk\"\n\n[runner]\nentrypoint = \"gradle\"\nargs = []\n",
        )
        .unwrap();
        let lib = temp.path().join("libraries").join("core");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("build.gradle.kts"), "").unwrap();

        let workspace = Workspace::load_from(temp.path()).unwrap();
        assert_eq!(workspace.base(None), "origin/trunk");
        assert_eq!(workspace.tool(), BuildTool::new("gradle"));
        assert_eq!(workspace.library_projects(), vec![":libraries:core".to_string()]);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("kmpci.toml"), "[runner]\nmax_concurrency = 0\n").unwrap();
        assert!(Workspace::load_from(temp.path()).is_err());
    }
}
