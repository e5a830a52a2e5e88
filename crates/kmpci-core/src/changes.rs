//! Change-set aggregation across all changed paths

use serde::Serialize;
use tracing::{debug, info};

use crate::classify::{classify, is_test_path, Classification};
use crate::platform::{display_set, PlatformSet};

/// Platforms affected by a set of changed paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeSet {
    /// Changes could be scoped to specific platforms
    Affected {
        /// Platforms with production-code changes
        main: PlatformSet,
        /// Platforms with test-code changes
        test: PlatformSet,
    },
    /// At least one path forces a full rebuild
    FullRebuild,
}

impl ChangeSet {
    /// An empty change set (no platform affected)
    pub fn empty() -> Self {
        Self::Affected {
            main: PlatformSet::new(),
            test: PlatformSet::new(),
        }
    }

    /// Whether this is the full-rebuild sentinel
    pub fn is_full_rebuild(&self) -> bool {
        matches!(self, Self::FullRebuild)
    }

    /// Union of main and test platforms; `None` for a full rebuild
    pub fn all_platforms(&self) -> Option<PlatformSet> {
        match self {
            Self::Affected { main, test } => Some(main.union(test).copied().collect()),
            Self::FullRebuild => None,
        }
    }
}

impl std::fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Affected { main, test } => write!(
                f,
                "main {}, test {}",
                display_set(main),
                display_set(test)
            ),
            Self::FullRebuild => write!(f, "full rebuild"),
        }
    }
}

/// Fold changed paths into main and test platform sets.
///
/// The first path that classifies as a full rebuild ends the fold: one such
/// path is enough regardless of the rest. An empty input yields two empty
/// sets, which is a weaker signal than a full rebuild.
pub fn aggregate<I, S>(paths: I) -> ChangeSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut main = PlatformSet::new();
    let mut test = PlatformSet::new();
    let mut count = 0usize;

    for path in paths {
        let path = path.as_ref();
        count += 1;

        let platforms = match classify(path) {
            Classification::FullRebuild => {
                info!(path, "path forces a full rebuild");
                return ChangeSet::FullRebuild;
            }
            Classification::Platforms(p) => p,
        };

        if platforms.is_empty() {
            continue;
        }

        debug!(path, platforms = %display_set(&platforms), "classified path");
        if is_test_path(path) {
            test.extend(platforms);
        } else {
            main.extend(platforms);
        }
    }

    let change_set = ChangeSet::Affected { main, test };
    info!(paths = count, change_set = %change_set, "aggregated changes");
    change_set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform::*;

    #[test]
    fn test_empty_input_is_not_full_rebuild() {
        let paths: [&str; 0] = [];
        assert_eq!(aggregate(paths), ChangeSet::empty());
    }

    #[test]
    fn test_common_main_only() {
        let change_set = aggregate(["libraries/a/src/commonMain/kotlin/X.kt"]);
        assert_eq!(
            change_set,
            ChangeSet::Affected {
                main: PlatformSet::from([Jvm]),
                test: PlatformSet::new(),
            }
        );
    }

    #[test]
    fn test_build_script_forces_full_rebuild() {
        let change_set = aggregate([
            "libraries/a/src/commonMain/kotlin/X.kt",
            "build.gradle.kts",
        ]);
        assert_eq!(change_set, ChangeSet::FullRebuild);
    }

    #[test]
    fn test_full_rebuild_is_order_independent() {
        let a = aggregate(["gradle/libs.versions.toml", "libraries/a/src/iosMain/X.kt"]);
        let b = aggregate(["libraries/a/src/iosMain/X.kt", "gradle/libs.versions.toml"]);
        assert_eq!(a, ChangeSet::FullRebuild);
        assert_eq!(a, b);
    }

    #[test]
    fn test_main_and_test_are_routed_separately() {
        let change_set = aggregate([
            "libraries/a/src/iosMain/kotlin/X.kt",
            "libraries/a/src/jvmTest/kotlin/XTest.kt",
            "libraries/a/src/nativeTest/kotlin/NTest.kt",
            "README.md",
        ]);
        assert_eq!(
            change_set,
            ChangeSet::Affected {
                main: PlatformSet::from([Ios]),
                test: PlatformSet::from([Jvm, Ios, LinuxX64, MingwX64]),
            }
        );
        assert_eq!(
            change_set.all_platforms().unwrap(),
            PlatformSet::from([Jvm, Ios, LinuxX64, MingwX64])
        );
    }

    #[test]
    fn test_unclassified_paths_contribute_nothing() {
        assert_eq!(
            aggregate(["docs/index.md", "scripts/run.sh"]),
            ChangeSet::empty()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ChangeSet::FullRebuild.to_string(), "full rebuild");
        assert_eq!(
            aggregate(["libraries/a/src/jsTest/kotlin/T.kt"]).to_string(),
            "main {}, test {js}"
        );
    }

    #[test]
    fn test_full_rebuild_has_no_platforms() {
        assert!(ChangeSet::FullRebuild.all_platforms().is_none());
        assert!(ChangeSet::FullRebuild.is_full_rebuild());
    }
}
