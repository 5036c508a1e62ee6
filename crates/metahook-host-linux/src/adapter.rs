//! Linux host adapter implementation

use async_trait::async_trait;
use metahook_host_api::{DetachedHandle, HostAdapter, HostResult, LaunchSpec, SignalOutcome};
use tracing::{info, warn};

use crate::process::{spawn_detached, terminate};
use crate::procfs::ProcTable;

/// Linux host adapter
pub struct LinuxHost {
    proc_table: ProcTable,
    self_pid: u32,
}

impl LinuxHost {
    pub fn new() -> Self {
        Self::with_proc_table(ProcTable::system())
    }

    /// Use a different procfs tree for lookups
    pub fn with_proc_table(proc_table: ProcTable) -> Self {
        Self {
            proc_table,
            self_pid: std::process::id(),
        }
    }
}

impl Default for LinuxHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostAdapter for LinuxHost {
    async fn spawn_detached(&self, spec: &LaunchSpec) -> HostResult<DetachedHandle> {
        let handle = spawn_detached(spec)?;
        info!(
            pid = handle.pid,
            program = %spec.program.display(),
            stderr_log = %spec.stderr_log.display(),
            "Launched detached process"
        );
        Ok(handle)
    }

    async fn find_by_command(&self, pattern: &str) -> HostResult<Vec<u32>> {
        self.proc_table.find(pattern, self.self_pid).await
    }

    async fn command_line(&self, pid: u32) -> HostResult<Option<String>> {
        Ok(self.proc_table.command_line(pid).await)
    }

    async fn terminate(&self, pid: u32) -> HostResult<SignalOutcome> {
        let outcome = terminate(pid)?;
        match outcome {
            SignalOutcome::Delivered => info!(pid = pid, "Sent SIGTERM"),
            SignalOutcome::AlreadyGone => warn!(pid = pid, "Process exited before SIGTERM"),
        }
        Ok(outcome)
    }
}
