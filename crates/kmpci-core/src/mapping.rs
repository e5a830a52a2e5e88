//! Platform → Gradle task mapping

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::platform::{Platform, PlatformSet};

use Platform::*;

/// Task run when nothing narrower can be chosen
pub const FALLBACK_TASK: &str = "build";

/// Label used for the work item that runs [`FALLBACK_TASK`]
pub const FALLBACK_LABEL: &str = "build";

/// Which kind of tasks to produce for a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    /// Compile production code
    Compile,
    /// Run (or, for native targets, at least compile) tests
    Test,
}

impl TaskCategory {
    fn table(self) -> &'static [(Platform, &'static [&'static str])] {
        match self {
            Self::Compile => COMPILE_TASKS,
            Self::Test => TEST_TASKS,
        }
    }
}

static COMPILE_TASKS: &[(Platform, &[&str])] = &[
    (Jvm, &["compileKotlinJvm"]),
    (Android, &["compileDebugKotlinAndroidMain"]),
    (AndroidNative, &["compileKotlinAndroidNativeArm64"]),
    (Ios, &["compileKotlinIosSimulatorArm64"]),
    (Macos, &["compileKotlinMacosArm64"]),
    (Tvos, &["compileKotlinTvosSimulatorArm64"]),
    (Watchos, &["compileKotlinWatchosSimulatorArm64"]),
    (Js, &["compileKotlinJs"]),
    (WasmJs, &["compileKotlinWasmJs"]),
    (WasmWasi, &["compileKotlinWasmWasi"]),
    (LinuxX64, &["compileKotlinLinuxX64"]),
    (LinuxArm64, &["compileKotlinLinuxArm64"]),
    (MingwX64, &["compileKotlinMingwX64"]),
];

// Native and web targets compile their tests only; running them needs
// simulators or browsers that CI hosts do not have.
static TEST_TASKS: &[(Platform, &[&str])] = &[
    (Jvm, &["jvmTest"]),
    (Android, &["testDebugUnitTest"]),
    (AndroidNative, &["compileKotlinAndroidNativeArm64"]),
    (Ios, &["compileKotlinIosSimulatorArm64"]),
    (Macos, &["compileKotlinMacosArm64"]),
    (Tvos, &["compileKotlinTvosSimulatorArm64"]),
    (Watchos, &["compileKotlinWatchosSimulatorArm64"]),
    (Js, &["compileKotlinJs"]),
    (WasmJs, &["compileKotlinWasmJs"]),
    (WasmWasi, &["compileKotlinWasmWasi"]),
    (LinuxX64, &["compileKotlinLinuxX64"]),
    (LinuxArm64, &["compileKotlinLinuxArm64"]),
    (MingwX64, &["compileKotlinMingwX64"]),
];

/// Tasks registered for one platform, if any
pub fn platform_tasks(platform: Platform, category: TaskCategory) -> Option<&'static [&'static str]> {
    category
        .table()
        .iter()
        .find(|(p, _)| *p == platform)
        .map(|(_, tasks)| *tasks)
}

/// Flattened task list for a set of platforms.
///
/// Platforms are visited in identifier order. A missing or empty set, or a
/// set containing no platform with registered tasks, yields the single
/// fallback `build` task.
pub fn tasks_for(platforms: Option<&PlatformSet>, category: TaskCategory) -> Vec<String> {
    let tasks: Vec<String> = tasks_by_platform(platforms, category)
        .into_iter()
        .flat_map(|(_, tasks)| tasks)
        .collect();
    debug!(?category, ?tasks, "resolved tasks");
    tasks
}

/// One `(platform, tasks)` entry per platform with registered tasks.
///
/// Each entry is meant for its own build-tool invocation. Falls back to a
/// single `("build", ["build"])` entry like [`tasks_for`].
pub fn tasks_by_platform(
    platforms: Option<&PlatformSet>,
    category: TaskCategory,
) -> Vec<(String, Vec<String>)> {
    let grouped: Vec<(String, Vec<String>)> = platforms
        .into_iter()
        .flatten()
        .filter_map(|platform| {
            platform_tasks(*platform, category).map(|tasks| {
                (
                    platform.as_str().to_string(),
                    tasks.iter().map(|t| t.to_string()).collect(),
                )
            })
        })
        .collect();

    if grouped.is_empty() {
        return vec![(FALLBACK_LABEL.to_string(), vec![FALLBACK_TASK.to_string()])];
    }
    grouped
}
