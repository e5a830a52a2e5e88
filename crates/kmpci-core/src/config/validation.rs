//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_changes(config)?;
    validate_runner(config)?;
    validate_scope(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn validate_changes(config: &Config) -> Result<()> {
    if config.changes.base.trim().is_empty() {
        return Err(invalid("changes.base", "base reference cannot be empty").into());
    }
    Ok(())
}

fn validate_runner(config: &Config) -> Result<()> {
    if config.runner.entrypoint.trim().is_empty() {
        return Err(invalid("runner.entrypoint", "entrypoint cannot be empty").into());
    }

    if config.runner.max_concurrency == 0 {
        return Err(invalid("runner.max_concurrency", "must be at least 1").into());
    }

    Ok(())
}

fn validate_scope(config: &Config) -> Result<()> {
    if config.scope.libraries_dir.trim().is_empty() {
        return Err(invalid("scope.libraries_dir", "libraries directory cannot be empty").into());
    }
    Ok(())
}
