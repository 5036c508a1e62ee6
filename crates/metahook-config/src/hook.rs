//! Validated hook configuration

use crate::schema::{RawConfig, RawProgramSection};
use metahook_util::{
    DEFAULT_INVOCATION_LOG, DEFAULT_PROGRAM_LOG, DEFAULT_PROGRAM_PATH, DEFAULT_SETTLE_DELAY,
    default_program_args,
};
use std::path::PathBuf;
use std::time::Duration;

/// Validated configuration ready for use by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
    /// Append-only record of every invocation
    pub invocation_log: PathBuf,

    /// The managed program
    pub program: ProgramSpec,
}

/// How to launch and find the managed program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSpec {
    /// Executable path; also the pattern used to find running instances
    pub path: PathBuf,

    /// Arguments passed verbatim
    pub args: Vec<String>,

    /// stderr destination, truncated on each launch
    pub log_path: PathBuf,

    /// Pause before launch
    pub settle_delay: Duration,

    /// Optional record of the launched pid
    pub pid_file: Option<PathBuf>,
}

impl HookConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let defaults = Self::default();

        Self {
            invocation_log: raw.hook.log_path.unwrap_or(defaults.invocation_log),
            program: ProgramSpec::from_raw(raw.program, defaults.program),
        }
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            invocation_log: PathBuf::from(DEFAULT_INVOCATION_LOG),
            program: ProgramSpec::default(),
        }
    }
}

impl ProgramSpec {
    fn from_raw(raw: RawProgramSection, defaults: ProgramSpec) -> Self {
        Self {
            path: raw.path.unwrap_or(defaults.path),
            args: raw.args.unwrap_or(defaults.args),
            log_path: raw.log_path.unwrap_or(defaults.log_path),
            settle_delay: raw
                .settle_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle_delay),
            pid_file: raw.pid_file.or(defaults.pid_file),
        }
    }

    /// Pattern matched against process command lines
    pub fn match_pattern(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Default for ProgramSpec {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PROGRAM_PATH),
            args: default_program_args(),
            log_path: PathBuf::from(DEFAULT_PROGRAM_LOG),
            settle_delay: DEFAULT_SETTLE_DELAY,
            pid_file: None,
        }
    }
}
