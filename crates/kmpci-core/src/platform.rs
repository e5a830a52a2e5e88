//! Platform identifiers
//!
//! Every Kotlin Multiplatform target the repository can build is one
//! [`Platform`]. Platforms compare and sort by their string identifier so
//! that task lists derived from a [`PlatformSet`] come out in the same order
//! on every run.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered set of platforms. Iteration follows identifier order.
pub type PlatformSet = BTreeSet<Platform>;

/// A compilation target with its own source sets
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "androidNative")]
    AndroidNative,
    #[serde(rename = "ios")]
    Ios,
    #[serde(rename = "js")]
    Js,
    #[serde(rename = "jvm")]
    Jvm,
    #[serde(rename = "linuxArm64")]
    LinuxArm64,
    #[serde(rename = "linuxX64")]
    LinuxX64,
    #[serde(rename = "macos")]
    Macos,
    #[serde(rename = "mingwX64")]
    MingwX64,
    #[serde(rename = "tvos")]
    Tvos,
    #[serde(rename = "wasmJs")]
    WasmJs,
    #[serde(rename = "wasmWasi")]
    WasmWasi,
    #[serde(rename = "watchos")]
    Watchos,
}

impl Platform {
    /// All known platforms
    pub const ALL: [Platform; 13] = [
        Platform::Android,
        Platform::AndroidNative,
        Platform::Ios,
        Platform::Js,
        Platform::Jvm,
        Platform::LinuxArm64,
        Platform::LinuxX64,
        Platform::Macos,
        Platform::MingwX64,
        Platform::Tvos,
        Platform::WasmJs,
        Platform::WasmWasi,
        Platform::Watchos,
    ];

    /// The identifier used in task tables, labels and allow-lists
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::AndroidNative => "androidNative",
            Self::Ios => "ios",
            Self::Js => "js",
            Self::Jvm => "jvm",
            Self::LinuxArm64 => "linuxArm64",
            Self::LinuxX64 => "linuxX64",
            Self::Macos => "macos",
            Self::MingwX64 => "mingwX64",
            Self::Tvos => "tvos",
            Self::WasmJs => "wasmJs",
            Self::WasmWasi => "wasmWasi",
            Self::Watchos => "watchos",
        }
    }

    /// Look up a platform ignoring ASCII case (`linuxx64` finds `linuxX64`)
    pub fn from_str_ignore_case(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
    }
}

impl Ord for Platform {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Platform {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known platform
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// Parse a comma-separated allow-list such as `"jvm, android"`.
///
/// Blank entries are ignored and matching is case-insensitive. Names that
/// match no platform are returned separately so callers can warn about them.
pub fn parse_platform_list(list: &str) -> (PlatformSet, Vec<String>) {
    let mut platforms = PlatformSet::new();
    let mut unknown = Vec::new();

    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match Platform::from_str_ignore_case(entry) {
            Some(p) => {
                platforms.insert(p);
            }
            None => unknown.push(entry.to_string()),
        }
    }

    (platforms, unknown)
}

/// Render a platform set as `{a, b}` for logs and console output
pub fn display_set(platforms: &PlatformSet) -> String {
    let names: Vec<&str> = platforms.iter().map(Platform::as_str).collect();
    format!("{{{}}}", names.join(", "))
}
