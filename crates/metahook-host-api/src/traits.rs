//! Host adapter traits

use async_trait::async_trait;
use thiserror::Error;

use crate::{DetachedHandle, LaunchSpec, SignalOutcome};

/// Errors from host adapter operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Signal to pid {pid} failed: {message}")]
    SignalFailed { pid: u32, message: String },

    #[error("Process table unavailable: {0}")]
    ProcessTable(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Host adapter trait - implemented by platform-specific adapters
#[async_trait]
pub trait HostAdapter: Send + Sync {
    /// Launch a program in its own session with stderr sent to a log file.
    /// The returned handle does not own the process.
    async fn spawn_detached(&self, spec: &LaunchSpec) -> HostResult<DetachedHandle>;

    /// Pids whose command line contains `pattern`, ascending.
    /// The calling process is never included.
    async fn find_by_command(&self, pattern: &str) -> HostResult<Vec<u32>>;

    /// Command line of a live process, or `None` if it is gone
    async fn command_line(&self, pid: u32) -> HostResult<Option<String>>;

    /// Send SIGTERM without waiting for the process to exit
    async fn terminate(&self, pid: u32) -> HostResult<SignalOutcome>;
}
