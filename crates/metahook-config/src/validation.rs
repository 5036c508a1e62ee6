//! Configuration validation

use crate::schema::RawConfig;
use std::path::Path;
use thiserror::Error;

/// Upper bound on the settle delay; libvirt blocks on the hook meanwhile
pub const MAX_SETTLE_DELAY_MS: u64 = 60_000;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("program.path cannot be empty")]
    EmptyProgramPath,

    #[error("program.path must be absolute: {0}")]
    RelativeProgramPath(String),

    #[error("program.args[{index}] is empty")]
    EmptyArgument { index: usize },

    #[error("hook.log_path and program.log_path both point at {0}")]
    SharedLogPath(String),

    #[error("program.settle_delay_ms {value} exceeds {max}")]
    SettleDelayTooLong { value: u64, max: u64 },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let program = &config.program;

    if let Some(path) = &program.path {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyProgramPath);
        } else if !path.is_absolute() {
            errors.push(ValidationError::RelativeProgramPath(
                path.display().to_string(),
            ));
        }
    }

    if let Some(args) = &program.args {
        for (index, arg) in args.iter().enumerate() {
            if arg.is_empty() {
                errors.push(ValidationError::EmptyArgument { index });
            }
        }
    }

    if let (Some(hook_log), Some(program_log)) = (&config.hook.log_path, &program.log_path)
        && same_path(hook_log, program_log)
    {
        errors.push(ValidationError::SharedLogPath(
            hook_log.display().to_string(),
        ));
    }

    if let Some(value) = program.settle_delay_ms
        && value > MAX_SETTLE_DELAY_MS
    {
        errors.push(ValidationError::SettleDelayTooLong {
            value,
            max: MAX_SETTLE_DELAY_MS,
        });
    }

    errors
}

// The program log is truncated on launch, which would wipe the invocation log.
fn same_path(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}
