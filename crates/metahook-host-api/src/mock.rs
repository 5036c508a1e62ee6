//! Mock host adapter for testing

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::{DetachedHandle, HostAdapter, HostError, HostResult, LaunchSpec, SignalOutcome};

/// A recorded launch
#[derive(Debug, Clone)]
pub struct MockLaunch {
    pub spec: LaunchSpec,
    pub pid: u32,
    pub at: Instant,
}

/// Mock host adapter for unit/integration testing
///
/// Keeps a simulated process table. Terminating a process removes it from
/// the table, as if it exited on SIGTERM.
pub struct MockHost {
    next_pid: AtomicU32,
    processes: Arc<Mutex<BTreeMap<u32, String>>>,
    stale: Arc<Mutex<HashSet<u32>>>,
    hidden: Arc<Mutex<HashSet<u32>>>,
    launches: Arc<Mutex<Vec<MockLaunch>>>,
    signals: Arc<Mutex<Vec<u32>>>,

    /// Configure spawn to fail
    pub fail_spawn: Arc<Mutex<bool>>,

    /// Configure process table scans to fail
    pub fail_scan: Arc<Mutex<bool>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1000),
            processes: Arc::new(Mutex::new(BTreeMap::new())),
            stale: Arc::new(Mutex::new(HashSet::new())),
            hidden: Arc::new(Mutex::new(HashSet::new())),
            launches: Arc::new(Mutex::new(Vec::new())),
            signals: Arc::new(Mutex::new(Vec::new())),
            fail_spawn: Arc::new(Mutex::new(false)),
            fail_scan: Arc::new(Mutex::new(false)),
        }
    }

    /// Add a running process to the simulated table
    pub fn with_process(self, pid: u32, command_line: impl Into<String>) -> Self {
        self.processes
            .lock()
            .unwrap()
            .insert(pid, command_line.into());
        self
    }

    /// Add a process that shows up in scans but exits before it can be
    /// signalled
    pub fn with_stale_process(self, pid: u32, command_line: impl Into<String>) -> Self {
        self.stale.lock().unwrap().insert(pid);
        self.with_process(pid, command_line)
    }

    /// Keep a process out of scans while it stays alive and signallable
    pub fn hide_from_scan(&self, pid: u32) {
        self.hidden.lock().unwrap().insert(pid);
    }

    /// Launches performed so far
    pub fn launches(&self) -> Vec<MockLaunch> {
        self.launches.lock().unwrap().clone()
    }

    /// Pids signalled so far, in order
    pub fn signals(&self) -> Vec<u32> {
        self.signals.lock().unwrap().clone()
    }

    /// Pids still in the simulated table
    pub fn running(&self) -> Vec<u32> {
        self.processes.lock().unwrap().keys().copied().collect()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostAdapter for MockHost {
    async fn spawn_detached(&self, spec: &LaunchSpec) -> HostResult<DetachedHandle> {
        if *self.fail_spawn.lock().unwrap() {
            return Err(HostError::SpawnFailed("Mock spawn failure".into()));
        }

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.processes
            .lock()
            .unwrap()
            .insert(pid, spec.command_line());
        self.launches.lock().unwrap().push(MockLaunch {
            spec: spec.clone(),
            pid,
            at: Instant::now(),
        });

        Ok(DetachedHandle { pid })
    }

    async fn find_by_command(&self, pattern: &str) -> HostResult<Vec<u32>> {
        if *self.fail_scan.lock().unwrap() {
            return Err(HostError::ProcessTable("Mock scan failure".into()));
        }

        let hidden = self.hidden.lock().unwrap();
        Ok(self
            .processes
            .lock()
            .unwrap()
            .iter()
            .filter(|(pid, cmdline)| !hidden.contains(*pid) && cmdline.contains(pattern))
            .map(|(pid, _)| *pid)
            .collect())
    }

    async fn command_line(&self, pid: u32) -> HostResult<Option<String>> {
        Ok(self.processes.lock().unwrap().get(&pid).cloned())
    }

    async fn terminate(&self, pid: u32) -> HostResult<SignalOutcome> {
        let removed = self.processes.lock().unwrap().remove(&pid).is_some();
        let stale = self.stale.lock().unwrap().remove(&pid);

        if !removed || stale {
            return Ok(SignalOutcome::AlreadyGone);
        }

        self.signals.lock().unwrap().push(pid);
        Ok(SignalOutcome::Delivered)
    }
}
