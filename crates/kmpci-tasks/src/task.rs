//! Build-tool invocation and work item types

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use kmpci_core::config::RunnerConfig;

/// How to invoke the build tool: `<program> <args...> <tasks...>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTool {
    /// Executable, either on `PATH` or a path relative to the working directory
    pub program: String,
    /// Arguments placed before the task names
    pub args: Vec<String>,
}

impl BuildTool {
    /// Create a build tool with no extra arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// The Gradle wrapper with the daemon enabled
    pub fn gradle_wrapper() -> Self {
        Self::new("./gradlew").with_arg("--daemon")
    }

    /// Append an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replace the argument list
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Program path to launch from `working_dir`.
    ///
    /// Relative paths with a directory component (`./gradlew`) resolve
    /// against the working directory; bare names are left for `PATH` lookup.
    pub fn program_path(&self, working_dir: &Path) -> PathBuf {
        let program = Path::new(&self.program);
        if program.is_relative() && program.components().count() > 1 {
            working_dir.join(program)
        } else {
            program.to_path_buf()
        }
    }

    /// Full command line for logs and dry runs
    pub fn command_line(&self, tasks: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .chain(tasks.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for BuildTool {
    fn default() -> Self {
        Self::gradle_wrapper()
    }
}

impl From<&RunnerConfig> for BuildTool {
    fn from(config: &RunnerConfig) -> Self {
        Self::new(config.entrypoint.clone()).with_args(config.args.iter().cloned())
    }
}

/// One build-tool invocation: a label (usually a platform) and its tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Label reported on failure, e.g. `jvm`
    pub label: String,
    /// Task names passed to the build tool
    pub tasks: Vec<String>,
}

impl WorkItem {
    /// Create a new work item
    pub fn new<I, S>(label: impl Into<String>, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            tasks: tasks.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<(String, Vec<String>)> for WorkItem {
    fn from((label, tasks): (String, Vec<String>)) -> Self {
        Self { label, tasks }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.tasks.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradle_wrapper_command_line() {
        let tool = BuildTool::gradle_wrapper();
        let tasks = vec!["jvmTest".to_string(), "compileKotlinJs".to_string()];
        assert_eq!(
            tool.command_line(&tasks),
            "./gradlew --daemon jvmTest compileKotlinJs"
        );
    }

    #[test]
    fn test_program_path_resolution() {
        let root = Path::new("/repo");
        assert_eq!(
            BuildTool::gradle_wrapper().program_path(root),
            PathBuf::from("/repo/./gradlew")
        );
        assert_eq!(BuildTool::new("gradle").program_path(root), PathBuf::from("gradle"));
        assert_eq!(
            BuildTool::new("/opt/gradle/bin/gradle").program_path(root),
            PathBuf::from("/opt/gradle/bin/gradle")
        );
    }

    #[test]
    fn test_from_runner_config() {
        let config = RunnerConfig::default();
        assert_eq!(BuildTool::from(&config), BuildTool::gradle_wrapper());
    }

    #[test]
    fn test_work_item_display() {
        let item = WorkItem::new("jvm", ["jvmTest"]);
        assert_eq!(item.to_string(), "jvm: jvmTest");
        let from_pair: WorkItem = ("ios".to_string(), vec!["compileKotlinIosSimulatorArm64".to_string()]).into();
        assert_eq!(from_pair.label, "ios");
    }
}
