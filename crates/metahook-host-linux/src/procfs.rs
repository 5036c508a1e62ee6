//! Process table lookup via procfs

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use metahook_host_api::{HostError, HostResult};

/// A process and its command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub command_line: String,
}

/// Reader over a procfs mount
#[derive(Debug, Clone)]
pub struct ProcTable {
    root: PathBuf,
}

impl ProcTable {
    /// Read from an arbitrary procfs-shaped tree
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The system's `/proc`
    pub fn system() -> Self {
        Self::new("/proc")
    }

    /// Every process with a non-empty command line, ascending by pid.
    ///
    /// Kernel threads and zombies have an empty cmdline and are skipped, as
    /// are processes that exit while the scan is running.
    pub async fn snapshot(&self) -> HostResult<Vec<ProcessEntry>> {
        let mut dir = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            HostError::ProcessTable(format!("{}: {}", self.root.display(), e))
        })?;

        let mut names = Vec::new();
        loop {
            match dir.next_entry().await {
                Ok(Some(entry)) => names.push(Ok(entry.file_name())),
                Ok(None) => break,
                Err(e) => {
                    names.push(Err(e));
                    break;
                }
            }
        }

        let mut entries = Vec::new();
        for pid in pids_from_names(&self.root, names)? {
            if let Some(command_line) = self.command_line(pid).await {
                entries.push(ProcessEntry { pid, command_line });
            }
        }

        entries.sort_by_key(|e| e.pid);
        debug!(root = %self.root.display(), count = entries.len(), "Scanned process table");
        Ok(entries)
    }

    /// Pids whose command line contains `pattern`, excluding `exclude`
    pub async fn find(&self, pattern: &str, exclude: u32) -> HostResult<Vec<u32>> {
        Ok(self
            .snapshot()
            .await?
            .into_iter()
            .filter(|e| e.pid != exclude && e.command_line.contains(pattern))
            .map(|e| e.pid)
            .collect())
    }

    /// Command line of `pid`, or `None` if it is gone or has none
    pub async fn command_line(&self, pid: u32) -> Option<String> {
        let path = self.root.join(pid.to_string()).join("cmdline");
        let bytes = tokio::fs::read(&path).await.ok()?;
        render_cmdline(&bytes)
    }
}

/// Numeric entries of a procfs listing.
///
/// A listing cut short by a read error is an error rather than a partial
/// result; a missed pid would be left running on shutdown.
pub fn pids_from_names(
    root: &Path,
    names: impl IntoIterator<Item = std::io::Result<OsString>>,
) -> HostResult<Vec<u32>> {
    let mut pids = Vec::new();
    for name in names {
        let name = name.map_err(|e| {
            HostError::ProcessTable(format!("{}: listing interrupted: {}", root.display(), e))
        })?;
        if let Ok(pid) = name.to_string_lossy().parse() {
            pids.push(pid);
        }
    }
    Ok(pids)
}

/// Render a NUL-separated cmdline as a space-separated string
pub fn render_cmdline(bytes: &[u8]) -> Option<String> {
    let trimmed = bytes.strip_suffix(b"\0").unwrap_or(bytes);
    if trimmed.is_empty() {
        return None;
    }

    let rendered = trimmed
        .split(|b| *b == 0)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(" ");
    Some(rendered)
}
