//! Init command

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::style;
use tracing::info;

use kmpci_core::config::{
    default_config_yaml, validate_config, Config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML,
    DEFAULT_CONFIG_YAML,
};

use crate::cli::output;
use crate::cli::Cli;
use crate::exit_codes;

/// Write a default kmpci configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Configuration file format
    #[arg(long = "config-format", value_enum, default_value = "toml")]
    pub config_format: ConfigFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML (`kmpci.toml`)
    Toml,
    /// YAML (`kmpci.yaml`)
    Yaml,
}

impl ConfigFormat {
    fn file_name(self) -> &'static str {
        match self {
            Self::Toml => DEFAULT_CONFIG_TOML,
            Self::Yaml => DEFAULT_CONFIG_YAML,
        }
    }

    fn template(self) -> String {
        match self {
            Self::Toml => DEFAULT_CONFIG_TEMPLATE.to_string(),
            Self::Yaml => default_config_yaml(),
        }
    }
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(force = self.force, format = ?self.config_format, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(self.config_format.file_name()));

        write_config(&config_path, self.config_format, self.force)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                output::path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!("  1. Set {} to your main branch", style("changes.base").cyan());
            println!("  2. Run {} to see what your changes touch", style("kmpci affected").cyan());
            println!("  3. Run {} in CI", style("kmpci test").cyan());
        }

        Ok(exit_codes::SUCCESS)
    }
}

fn write_config(path: &Path, format: ConfigFormat, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let content = format.template();

    // The template must load back as a valid config.
    let parsed: Config = match format {
        ConfigFormat::Toml => toml::from_str(&content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
    };
    validate_config(&parsed)?;

    std::fs::write(path, content)?;
    Ok(())
}
