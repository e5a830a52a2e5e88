//! Path classification: which platforms does a changed file affect?
//!
//! Classification is table driven. [`SOURCE_SET_RULES`] maps source-set
//! directory names to the platforms compiled from them, and
//! [`FULL_REBUILD_PATTERNS`] lists the build-configuration paths whose
//! changes cannot be scoped to any platform. Every matching rule contributes
//! to the result, so shared source sets (`nativeMain`, `webMain`) fan out to
//! all of their platforms.

use std::sync::LazyLock;

use regex::Regex;

use crate::platform::{Platform, PlatformSet};

use Platform::*;

/// Outcome of classifying a single path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The path affects exactly these platforms (possibly none)
    Platforms(PlatformSet),
    /// The path changes build configuration; everything must be rebuilt
    FullRebuild,
}

impl Classification {
    /// Whether this is the full-rebuild sentinel
    pub fn is_full_rebuild(&self) -> bool {
        matches!(self, Self::FullRebuild)
    }
}

/// A source-set directory and the platforms built from it
#[derive(Debug, Clone, Copy)]
pub struct SourceSetRule {
    /// Directory name under `src/`
    pub source_set: &'static str,
    /// Platforms affected by changes in that directory
    pub platforms: &'static [Platform],
}

const fn rule(source_set: &'static str, platforms: &'static [Platform]) -> SourceSetRule {
    SourceSetRule {
        source_set,
        platforms,
    }
}

const NATIVE: &[Platform] = &[Ios, LinuxX64, MingwX64];
const ANDROID_NATIVE_SHARED: &[Platform] = &[Android, Ios, LinuxX64, MingwX64];
const WEB: &[Platform] = &[Js, WasmJs];

/// Source-set directory → platforms, following the Kotlin Gradle plugin's
/// default source-set names.
pub static SOURCE_SET_RULES: &[SourceSetRule] = &[
    rule("commonMain", &[Jvm]),
    rule("commonTest", &[Jvm]),
    rule("jvmMain", &[Jvm]),
    rule("jvmTest", &[Jvm]),
    rule("androidMain", &[Android]),
    rule("androidTest", &[Android]),
    rule("androidUnitTest", &[Android]),
    rule("androidHostTest", &[Android]),
    rule("androidInstrumentedTest", &[Android]),
    rule("androidNativeMain", ANDROID_NATIVE_SHARED),
    rule("androidNativeTest", ANDROID_NATIVE_SHARED),
    rule("androidNativeArm32Main", &[AndroidNative]),
    rule("androidNativeArm32Test", &[AndroidNative]),
    rule("androidNativeArm64Main", &[AndroidNative]),
    rule("androidNativeArm64Test", &[AndroidNative]),
    rule("androidNativeX64Main", &[AndroidNative]),
    rule("androidNativeX64Test", &[AndroidNative]),
    rule("androidNativeX86Main", &[AndroidNative]),
    rule("androidNativeX86Test", &[AndroidNative]),
    rule("appleMain", &[Ios]),
    rule("appleTest", &[Ios]),
    rule("iosMain", &[Ios]),
    rule("iosTest", &[Ios]),
    rule("iosArm64Main", &[Ios]),
    rule("iosArm64Test", &[Ios]),
    rule("iosSimulatorArm64Main", &[Ios]),
    rule("iosSimulatorArm64Test", &[Ios]),
    rule("iosX64Main", &[Ios]),
    rule("iosX64Test", &[Ios]),
    rule("macosMain", &[Macos]),
    rule("macosTest", &[Macos]),
    rule("macosArm64Main", &[Macos]),
    rule("macosArm64Test", &[Macos]),
    rule("macosX64Main", &[Macos]),
    rule("macosX64Test", &[Macos]),
    rule("tvosMain", &[Tvos]),
    rule("tvosTest", &[Tvos]),
    rule("tvosArm64Main", &[Tvos]),
    rule("tvosArm64Test", &[Tvos]),
    rule("tvosSimulatorArm64Main", &[Tvos]),
    rule("tvosSimulatorArm64Test", &[Tvos]),
    rule("tvosX64Main", &[Tvos]),
    rule("tvosX64Test", &[Tvos]),
    rule("watchosMain", &[Watchos]),
    rule("watchosTest", &[Watchos]),
    rule("watchosArm32Main", &[Watchos]),
    rule("watchosArm32Test", &[Watchos]),
    rule("watchosArm64Main", &[Watchos]),
    rule("watchosArm64Test", &[Watchos]),
    rule("watchosDeviceArm64Main", &[Watchos]),
    rule("watchosDeviceArm64Test", &[Watchos]),
    rule("watchosSimulatorArm64Main", &[Watchos]),
    rule("watchosSimulatorArm64Test", &[Watchos]),
    rule("watchosX64Main", &[Watchos]),
    rule("watchosX64Test", &[Watchos]),
    rule("jsMain", &[Js]),
    rule("jsTest", &[Js]),
    rule("wasmJsMain", &[WasmJs]),
    rule("wasmJsTest", &[WasmJs]),
    rule("webMain", WEB),
    rule("webTest", WEB),
    rule("wasmWasiMain", &[WasmWasi]),
    rule("wasmWasiTest", &[WasmWasi]),
    rule("linuxMain", &[LinuxX64]),
    rule("linuxTest", &[LinuxX64]),
    rule("linuxX64Main", &[LinuxX64]),
    rule("linuxX64Test", &[LinuxX64]),
    rule("linuxArm64Main", &[LinuxArm64]),
    rule("linuxArm64Test", &[LinuxArm64]),
    rule("mingwMain", &[MingwX64]),
    rule("mingwTest", &[MingwX64]),
    rule("mingwX64Main", &[MingwX64]),
    rule("mingwX64Test", &[MingwX64]),
    rule("nativeMain", NATIVE),
    rule("nativeTest", NATIVE),
];

/// Paths that force a full rebuild. Matched against the normalized path,
/// which always starts with `/`.
pub static FULL_REBUILD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"build\.gradle\.kts$",
        r"settings\.gradle\.kts$",
        r"gradle\.properties$",
        r"^/gradle/",
        r"^/build-logic/",
        r"^/buildSrc/",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid full rebuild pattern"))
    .collect()
});

/// Any `*Test` source set (commonTest, jvmTest, androidUnitTest, ...)
static TEST_SOURCE_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/src/\w+Test/").expect("Invalid regex"));

/// Normalize a repository-relative path so it always starts with `/`
fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

/// Source-set directory names appearing as `/src/<name>/` in a normalized path
fn source_sets(normalized: &str) -> Vec<&str> {
    let segments: Vec<&str> = normalized.split('/').collect();
    // The name must be followed by another segment, i.e. be a directory.
    segments
        .windows(3)
        .filter(|w| w[0] == "src")
        .map(|w| w[1])
        .collect()
}

/// Classify a changed path into the platforms it affects
pub fn classify(path: &str) -> Classification {
    let normalized = normalize(path);

    if FULL_REBUILD_PATTERNS.iter().any(|p| p.is_match(&normalized)) {
        return Classification::FullRebuild;
    }

    let mut platforms = PlatformSet::new();
    for name in source_sets(&normalized) {
        // Several rules may match one path; the result is their union.
        for rule in SOURCE_SET_RULES.iter().filter(|r| r.source_set == name) {
            platforms.extend(rule.platforms.iter().copied());
        }
    }

    Classification::Platforms(platforms)
}

/// Whether the path lives under a test source set
pub fn is_test_path(path: &str) -> bool {
    TEST_SOURCE_SET.is_match(&normalize(path))
}
