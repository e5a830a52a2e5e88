//! Default configuration values

use super::types::Config;

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "kmpci.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "kmpci.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".kmpci.toml",
        ".kmpci.yaml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    serde_yaml::to_string(&Config::default())
        .unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# kmpci configuration

[changes]
# Changed files are computed as the diff between this ref and HEAD
base = "origin/main"

[runner]
entrypoint = "./gradlew"
args = ["--daemon"]
# Gradle is heavy; keep parallel invocations low
max_concurrency = 3

[scope]
libraries_dir = "libraries"
resolve_tasks = true
"#;
