//! Launched-pid record

use metahook_util::{HookError, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Holds the pid of the last launched instance
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `pid`, creating the parent directory if needed
    pub fn write(&self, pid: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HookError::pid_file(&self.path, e))?;
        }
        std::fs::write(&self.path, format!("{pid}\n"))
            .map_err(|e| HookError::pid_file(&self.path, e))
    }

    /// Recorded pid, or `None` if there is no usable record
    pub fn read(&self) -> Result<Option<u32>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HookError::pid_file(&self.path, e)),
        };

        match contents.trim().parse::<u32>() {
            Ok(pid) if pid > 0 => Ok(Some(pid)),
            _ => {
                warn!(path = %self.path.display(), "Ignoring malformed pid file");
                Ok(None)
            }
        }
    }

    /// Remove the record; a missing file is fine
    pub fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HookError::pid_file(&self.path, e)),
        }
    }
}
