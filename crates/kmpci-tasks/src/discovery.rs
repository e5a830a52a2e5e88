//! Task discovery: checks scoped task names against the build's own listing

use std::collections::HashSet;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::error::{Result, TaskError};
use crate::task::BuildTool;

/// Arguments that make Gradle print every task of every project
pub const DISCOVERY_ARGS: [&str; 4] = ["tasks", "--all", "--no-configuration-cache", "-q"];

/// Characters of output kept in a discovery error
const ERROR_OUTPUT_LIMIT: usize = 500;

/// List every fully qualified task path the build knows about.
///
/// Runs `<program> <args...> tasks --all --no-configuration-cache -q` with
/// stdout and stderr captured together.
#[instrument(skip(tool), fields(program = %tool.program))]
pub async fn discover_tasks(tool: &BuildTool, working_dir: &Path) -> Result<HashSet<String>> {
    let output = Command::new(tool.program_path(working_dir))
        .args(&tool.args)
        .args(DISCOVERY_ARGS)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| TaskError::Spawn {
            program: tool.program.clone(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(TaskError::Discovery {
            code: output.status.code().unwrap_or(-1),
            output: text.chars().take(ERROR_OUTPUT_LIMIT).collect(),
        });
    }

    let tasks = parse_task_listing(&text);
    debug!(count = tasks.len(), "discovered tasks");
    Ok(tasks)
}

/// Parse `tasks --all` output into task paths with a leading `:`.
///
/// Task lines look like `libraries:core:jvmTest - Runs the tests`. Headers,
/// separators and root-project tasks (no project segment) are ignored.
pub fn parse_task_listing(output: &str) -> HashSet<String> {
    output
        .lines()
        .filter_map(|line| {
            let (path, _) = line.split_once(" - ")?;
            let path = path.trim();
            if path.contains(char::is_whitespace) {
                return None;
            }
            let path = if path.starts_with(':') {
                path.to_string()
            } else {
                format!(":{}", path)
            };
            let segments = path.split(':').filter(|s| !s.is_empty()).count();
            (segments >= 2).then_some(path)
        })
        .collect()
}

/// Expand task names to `<project>:<name>` for every library project,
/// keeping only those the build actually defines.
///
/// Without projects or names the names come back unchanged and the build
/// tool is not invoked.
pub async fn resolve_library_tasks(
    tool: &BuildTool,
    working_dir: &Path,
    projects: &[String],
    names: &[String],
) -> Result<Vec<String>> {
    if projects.is_empty() || names.is_empty() {
        return Ok(names.to_vec());
    }

    let available = discover_tasks(tool, working_dir).await?;
    let resolved = select_available(&available, projects, names);
    info!(
        requested = names.len(),
        projects = projects.len(),
        resolved = resolved.len(),
        "resolved library tasks"
    );
    Ok(resolved)
}

/// `<project>:<name>` pairs present in `available`, ordered by project then name
pub fn select_available(
    available: &HashSet<String>,
    projects: &[String],
    names: &[String],
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    for project in projects {
        for name in names {
            let candidate = format!("{}:{}", project, name);
            if available.contains(&candidate) && seen.insert(candidate.clone()) {
                resolved.push(candidate);
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
------------------------------------------------------------
Tasks runnable from root project 'kmp-libraries'
------------------------------------------------------------

Build tasks
-----------
build - Assembles and tests this project.
libraries:core:compileKotlinJvm - Compiles the jvm main source set.
libraries:core:jvmTest - Runs the tests for jvm.
:libraries:net:jsTest - Runs the tests for js.
libraries:net:jvmTest - Runs the tests for jvm.

Help tasks
----------
help - Displays a help message.
";

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_task_listing() {
        let tasks = parse_task_listing(LISTING);
        let mut sorted: Vec<_> = tasks.into_iter().collect();
        sorted.sort();
        assert_eq!(
            sorted,
            strings(&[
                ":libraries:core:compileKotlinJvm",
                ":libraries:core:jvmTest",
                ":libraries:net:jsTest",
                ":libraries:net:jvmTest",
            ])
        );
    }

    #[test]
    fn test_parse_ignores_prose_with_separator() {
        let tasks = parse_task_listing("To see more detail - run with --all\n");
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_select_available_orders_by_project_then_name() {
        let available = parse_task_listing(LISTING);
        let resolved = select_available(
            &available,
            &strings(&[":libraries:core", ":libraries:net"]),
            &strings(&["jvmTest", "jsTest", "jvmTest"]),
        );
        assert_eq!(
            resolved,
            strings(&[
                ":libraries:core:jvmTest",
                ":libraries:net:jvmTest",
                ":libraries:net:jsTest",
            ])
        );
    }

    #[tokio::test]
    async fn test_resolve_without_projects_skips_discovery() {
        let tool = BuildTool::new("./does-not-exist");
        let dir = tempfile::tempdir().unwrap();
        let names = strings(&["build"]);
        let resolved = resolve_library_tasks(&tool, dir.path(), &[], &names)
            .await
            .unwrap();
        assert_eq!(resolved, names);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_discovery_failure() {
        let tool = BuildTool::new("sh").with_args(["-c", "echo 'FAILURE: Build failed' >&2; exit 3", "sh"]);
        let dir = tempfile::tempdir().unwrap();
        let err = discover_tasks(&tool, dir.path()).await.unwrap_err();
        match err {
            TaskError::Discovery { code, output } => {
                assert_eq!(code, 3);
                assert!(output.contains("FAILURE: Build failed"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_against_listing() {
        let script = "printf '%s\\n' 'libraries:core:jvmTest - Runs tests' 'libraries:net:jsTest - Runs tests'";
        let tool = BuildTool::new("sh").with_args(["-c", script, "sh"]);
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_library_tasks(
            &tool,
            dir.path(),
            &strings(&[":libraries:core", ":libraries:net"]),
            &strings(&["jvmTest"]),
        )
        .await
        .unwrap();
        assert_eq!(resolved, strings(&[":libraries:core:jvmTest"]));
    }
}
