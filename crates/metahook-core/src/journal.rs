//! Append-only invocation log

use chrono::{DateTime, TimeZone};
use metahook_util::{HookError, Result, format_invocation_line};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One line per hook invocation: `YYYY-MM-DD HH:MM:SS.nnnnnnnnn <args>`
#[derive(Debug, Clone)]
pub struct InvocationLog {
    path: PathBuf,
}

impl InvocationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record. The file is created if missing; its directory is not.
    pub fn append<Tz: TimeZone>(&self, at: &DateTime<Tz>, args: &[String]) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        let line = format_invocation_line(at, args);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| HookError::invocation_log(&self.path, e))?;

        writeln!(file, "{line}").map_err(|e| HookError::invocation_log(&self.path, e))
    }
}
