//! Configuration parsing and validation for metahook
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Per-field overrides of the stock paths, arguments and settle delay
//! - Validation with clear error messages
//!
//! A missing config file is not an error; the hook falls back to the stock
//! layout.

mod hook;
mod schema;
mod validation;

pub use hook::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::{debug, error};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<HookConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<HookConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(HookConfig::from_raw(raw))
}

/// Load configuration, falling back to defaults.
///
/// A missing file yields the defaults silently. Any other failure is logged
/// and also yields the defaults, since the hook must not fail libvirt.
pub fn load_config_or_default(path: impl AsRef<Path>) -> HookConfig {
    let path = path.as_ref();
    match load_config(path) {
        Ok(config) => {
            debug!(path = %path.display(), "Configuration loaded");
            config
        }
        Err(ConfigError::ReadError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file, using defaults");
            HookConfig::default()
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Invalid config, using defaults");
            HookConfig::default()
        }
    }
}
