//! Library project discovery and task scoping
//!
//! CI only builds the published libraries, not the sample apps, so task
//! names are prefixed with the Gradle project path of every library.

use std::path::Path;

use tracing::debug;

/// Default directory holding one Gradle project per library
pub const DEFAULT_LIBRARIES_DIR: &str = "libraries";

/// Gradle project paths (`:libraries:<name>`) for every library directory
/// that contains a `build.gradle.kts`, sorted.
pub fn library_project_paths(repo_root: &Path, libraries_dir: &str) -> Vec<String> {
    let dir = repo_root.join(libraries_dir);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(_) => {
            debug!(dir = %dir.display(), "no libraries directory");
            return Vec::new();
        }
    };

    let prefix = libraries_dir.trim_matches('/').replace('/', ":");
    let mut projects: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir() && e.path().join("build.gradle.kts").exists())
        .map(|e| format!(":{}:{}", prefix, e.file_name().to_string_lossy()))
        .collect();
    projects.sort();

    debug!(count = projects.len(), "discovered library projects");
    projects
}

/// Prefix every task with every project: `["build"]` with
/// `[":libraries:a"]` becomes `[":libraries:a:build"]`.
///
/// Returns `tasks` unchanged when either list is empty.
pub fn scope_tasks_to_libraries(tasks: &[String], projects: &[String]) -> Vec<String> {
    if projects.is_empty() || tasks.is_empty() {
        return tasks.to_vec();
    }
    projects
        .iter()
        .flat_map(|project| tasks.iter().map(move |task| format!("{}:{}", project, task)))
        .collect()
}

/// Task name without its project path (`:libraries:a:jvmTest` → `jvmTest`)
pub fn task_name(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}
