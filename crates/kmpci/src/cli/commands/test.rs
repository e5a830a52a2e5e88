//! Test command - run tests for the affected platforms in parallel

use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use kmpci_core::libraries::task_name;
use kmpci_core::mapping::{FALLBACK_LABEL, FALLBACK_TASK};
use kmpci_core::platform::display_set;
use kmpci_core::{
    aggregate, parse_platform_list, scope_tasks_to_libraries, tasks_by_platform, tasks_for,
    PlatformSet, TaskCategory,
};
use kmpci_tasks::{resolve_library_tasks, WorkItem};

use crate::cli::context::Workspace;
use crate::cli::output;
use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Run tests for the platforms affected by changes since the base ref.
///
/// Each platform gets its own Gradle run; the first failure stops the rest.
#[derive(Debug, Args)]
pub struct TestCommand {
    /// Base ref to diff against (default: `changes.base` from config)
    #[arg(long)]
    pub base: Option<String>,

    /// Maximum parallel Gradle runs (default: `runner.max_concurrency` from config)
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Comma-separated platforms to test, e.g. `jvm,android`; others are skipped
    #[arg(long, value_name = "PLATFORMS")]
    pub platforms: Option<String>,

    /// Print the Gradle commands without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// What the changes call for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "platforms", rename_all = "snake_case")]
enum TestPlan {
    /// The generic build for every library
    Build,
    /// Nothing changed but platforms were requested: their tasks in one run
    Requested(PlatformSet),
    /// One run per platform
    Platforms(PlatformSet),
}

impl TestCommand {
    /// Execute the test command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<i32> {
        let workspace = Workspace::load()?;
        let base = workspace.base(self.base.as_deref());
        info!(base, platforms = ?self.platforms, dry_run = self.dry_run, "executing test command");

        let (allowed, unknown) = match allow_list(self.platforms.as_deref()) {
            Ok(parsed) => parsed,
            Err(e) => {
                output::error(&e.to_string());
                return Ok(exit_codes::ERROR);
            }
        };
        for name in &unknown {
            warn!(platform = %name, "ignoring unknown platform");
            if !cli.quiet {
                output::warning(&format!("Ignoring unknown platform '{}'", name));
            }
        }

        let files = workspace.changed_files(base);
        let plan = plan_tests(&files, allowed.as_ref());
        info!(changed = files.len(), ?plan, "planned test run");

        let projects = workspace.library_projects();
        let items = match &plan {
            TestPlan::Build => vec![WorkItem::new(
                FALLBACK_LABEL,
                scope_tasks_to_libraries(&[FALLBACK_TASK.to_string()], &projects),
            )],
            TestPlan::Requested(platforms) => {
                let names = tasks_for(Some(platforms), TaskCategory::Test);
                let tasks = self.scope(&workspace, &projects, &names).await?;
                if tasks.is_empty() {
                    output::warning(&format!(
                        "No library tasks for platform(s): {}",
                        display_set(platforms)
                    ));
                    return Ok(exit_codes::SUCCESS);
                }
                let label: Vec<&str> = platforms.iter().map(|p| p.as_str()).collect();
                vec![WorkItem::new(label.join(","), tasks)]
            }
            TestPlan::Platforms(platforms) => {
                let grouped = tasks_by_platform(Some(platforms), TaskCategory::Test);
                let names: Vec<String> = grouped
                    .iter()
                    .flat_map(|(_, tasks)| tasks.iter().cloned())
                    .collect();
                let resolved = self.scope(&workspace, &projects, &names).await?;
                let items = work_items(grouped, &resolved);
                if items.is_empty() {
                    output::warning(&format!(
                        "No library tasks for affected platform(s): {}",
                        display_set(platforms)
                    ));
                    return Ok(exit_codes::SUCCESS);
                }
                items
            }
        };

        if cli.shows_progress() {
            output::info(&format!(
                "{} Gradle run{} from {}",
                items.len(),
                if items.len() == 1 { "" } else { "s" },
                output::path_style().apply_to(workspace.root.display())
            ));
        }

        let outcome = workspace
            .run(cli, items, self.max_concurrency, self.dry_run)
            .await;

        if cli.format == OutputFormat::Json {
            let report = serde_json::json!({
                "base": base,
                "plan": plan,
                "outcome": outcome,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        if let Some(label) = &outcome.failed_label {
            if outcome.results.len() > 1 {
                eprintln!("First failing platform: {}", label);
            }
        }
        Ok(outcome.exit_code)
    }

    /// Prefix task names with library projects, validated against the build
    /// when `scope.resolve_tasks` is on.
    async fn scope(
        &self,
        workspace: &Workspace,
        projects: &[String],
        names: &[String],
    ) -> anyhow::Result<Vec<String>> {
        if workspace.config.scope.resolve_tasks {
            Ok(resolve_library_tasks(&workspace.tool(), &workspace.root, projects, names).await?)
        } else {
            Ok(scope_tasks_to_libraries(names, projects))
        }
    }
}

/// Parse `--platforms` into an allow-list plus the names that matched no
/// platform. A list that names no valid platform at all is an error.
fn allow_list(list: Option<&str>) -> anyhow::Result<(Option<PlatformSet>, Vec<String>)> {
    let Some(list) = list else {
        return Ok((None, Vec::new()));
    };

    let (platforms, unknown) = parse_platform_list(list);
    if platforms.is_empty() {
        anyhow::bail!("No valid platforms in --platforms '{}'", list);
    }
    Ok((Some(platforms), unknown))
}

/// Decide what to run for the changed files and an optional allow-list.
///
/// An allow-list narrows the affected platforms; when nothing affected is
/// allowed, the allow-list itself is used.
fn plan_tests(files: &[String], allowed: Option<&PlatformSet>) -> TestPlan {
    if files.is_empty() {
        return match allowed {
            Some(platforms) => TestPlan::Requested(platforms.clone()),
            None => TestPlan::Build,
        };
    }

    let Some(affected) = aggregate(files).all_platforms() else {
        return TestPlan::Build;
    };

    let selected = match allowed {
        Some(allowed) => {
            let both: PlatformSet = affected.intersection(allowed).copied().collect();
            if both.is_empty() {
                allowed.clone()
            } else {
                both
            }
        }
        None => affected,
    };

    if selected.is_empty() {
        TestPlan::Build
    } else {
        TestPlan::Platforms(selected)
    }
}

/// One work item per platform holding the resolved tasks whose name belongs
/// to that platform. Platforms left without tasks are dropped.
fn work_items(grouped: Vec<(String, Vec<String>)>, resolved: &[String]) -> Vec<WorkItem> {
    grouped
        .into_iter()
        .map(|(label, names)| {
            let tasks: Vec<String> = resolved
                .iter()
                .filter(|task| names.iter().any(|name| name == task_name(task)))
                .cloned()
                .collect();
            WorkItem { label, tasks }
        })
        .filter(|item| !item.tasks.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kmpci_core::Platform;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn set(platforms: &[Platform]) -> PlatformSet {
        platforms.iter().copied().collect()
    }

    #[test]
    fn test_allow_list_absent() {
        let (allowed, unknown) = allow_list(None).unwrap();
        assert!(allowed.is_none());
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_allow_list_keeps_unknown_names() {
        let (allowed, unknown) = allow_list(Some("JVM, beos ,ios")).unwrap();
        assert_eq!(allowed, Some(set(&[Platform::Ios, Platform::Jvm])));
        assert_eq!(unknown, strings(&["beos"]));
    }

    #[test]
    fn test_allow_list_without_valid_platforms_is_an_error() {
        let err = allow_list(Some("beos,plan9")).unwrap_err();
        assert_eq!(err.to_string(), "No valid platforms in --platforms 'beos,plan9'");
        assert!(allow_list(Some(" , ")).is_err());
    }

    #[test]
    fn test_no_changes_without_allow_list_builds() {
        assert_eq!(plan_tests(&[], None), TestPlan::Build);
    }

    #[test]
    fn test_no_changes_with_allow_list_runs_requested() {
        let allowed = set(&[Platform::Jvm]);
        assert_eq!(
            plan_tests(&[], Some(&allowed)),
            TestPlan::Requested(allowed.clone())
        );
    }

    #[test]
    fn test_full_rebuild_builds() {
        let files = strings(&["settings.gradle.kts", "libraries/a/src/jvmMain/X.kt"]);
        assert_eq!(plan_tests(&files, None), TestPlan::Build);
    }

    #[test]
    fn test_unaffecting_changes_build() {
        let files = strings(&["README.md", "scripts/ci.sh"]);
        assert_eq!(plan_tests(&files, None), TestPlan::Build);
    }

    #[test]
    fn test_main_and_test_platforms_combine() {
        let files = strings(&[
            "libraries/a/src/iosMain/X.kt",
            "libraries/a/src/jvmTest/XTest.kt",
        ]);
        assert_eq!(
            plan_tests(&files, None),
            TestPlan::Platforms(set(&[Platform::Ios, Platform::Jvm]))
        );
    }

    #[test]
    fn test_allow_list_intersects() {
        let files = strings(&["libraries/a/src/nativeMain/X.kt"]);
        let allowed = set(&[Platform::Ios, Platform::Jvm]);
        assert_eq!(
            plan_tests(&files, Some(&allowed)),
            TestPlan::Platforms(set(&[Platform::Ios]))
        );
    }

    #[test]
    fn test_disjoint_allow_list_replaces_affected() {
        let files = strings(&["libraries/a/src/jsMain/X.kt"]);
        let allowed = set(&[Platform::Android]);
        assert_eq!(
            plan_tests(&files, Some(&allowed)),
            TestPlan::Platforms(allowed.clone())
        );
    }

    #[test]
    fn test_work_items_filter_resolved_tasks() {
        let grouped = tasks_by_platform(
            Some(&set(&[Platform::Android, Platform::Ios, Platform::Jvm])),
            TaskCategory::Test,
        );
        let resolved = strings(&[
            ":libraries:core:jvmTest",
            ":libraries:core:testDebugUnitTest",
            ":libraries:net:jvmTest",
        ]);

        let items = work_items(grouped, &resolved);
        assert_eq!(
            items,
            vec![
                WorkItem::new("android", [":libraries:core:testDebugUnitTest"]),
                WorkItem::new("jvm", [":libraries:core:jvmTest", ":libraries:net:jvmTest"]),
            ]
        );
    }

    #[test]
    fn test_work_items_without_library_scoping() {
        let grouped = tasks_by_platform(Some(&set(&[Platform::Js])), TaskCategory::Test);
        let resolved = strings(&["compileKotlinJs"]);
        assert_eq!(
            work_items(grouped, &resolved),
            vec![WorkItem::new("js", ["compileKotlinJs"])]
        );
    }

    #[test]
    fn test_plan_serializes_with_kind() {
        let plan = TestPlan::Platforms(set(&[Platform::WasmJs]));
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["kind"], "platforms");
        assert_eq!(value["platforms"][0], "wasmJs");
    }
}
