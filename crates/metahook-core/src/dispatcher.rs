//! Lifecycle hook dispatcher

use metahook_config::HookConfig;
use metahook_host_api::{HostAdapter, LaunchSpec, SignalOutcome};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::event::{HookEvent, join_args};
use crate::journal::InvocationLog;
use crate::pidfile::PidFile;

/// What a dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The managed program was launched
    Launched { pid: u32 },

    /// A launch was attempted and failed
    LaunchFailed { reason: String },

    /// SIGTERM was delivered to these pids
    Stopped { signalled: Vec<u32> },

    /// Shutdown requested but no instance was running
    NothingToStop,

    /// Neither start nor shutdown
    Ignored,
}

/// Turns libvirt hook invocations into launches and terminations
pub struct Dispatcher<H: HostAdapter + ?Sized> {
    config: HookConfig,
    host: Arc<H>,
    journal: InvocationLog,
    pid_file: Option<PidFile>,
}

impl<H: HostAdapter + ?Sized> Dispatcher<H> {
    pub fn new(config: HookConfig, host: Arc<H>) -> Self {
        let journal = InvocationLog::new(&config.invocation_log);
        let pid_file = config.program.pid_file.as_ref().map(PidFile::new);

        Self {
            config,
            host,
            journal,
            pid_file,
        }
    }

    /// Record the invocation, then dispatch it
    pub async fn handle(&self, args: &[String]) -> DispatchOutcome {
        self.record_invocation(args);
        self.dispatch(args).await
    }

    /// Append the invocation to the invocation log. Failures are logged only.
    pub fn record_invocation(&self, args: &[String]) {
        if let Err(e) = self.journal.append(&metahook_util::now(), args) {
            warn!(error = %e, "Could not record hook invocation");
        }
    }

    /// Act on the arguments: start wins, shutdown only if something is running
    pub async fn dispatch(&self, args: &[String]) -> DispatchOutcome {
        let event = HookEvent::classify(args);
        debug!(event = ?event, args = %join_args(args), "Dispatching hook event");

        match event {
            HookEvent::Start => self.start_managed_process().await,
            HookEvent::Shutdown => {
                if self.find_running().await.is_empty() {
                    info!("Shutdown requested but managed program is not running");
                    DispatchOutcome::NothingToStop
                } else {
                    self.stop_managed_process().await
                }
            }
            HookEvent::Other => DispatchOutcome::Ignored,
        }
    }

    /// Wait out the settle delay, then launch the managed program detached
    pub async fn start_managed_process(&self) -> DispatchOutcome {
        let program = &self.config.program;

        if !program.settle_delay.is_zero() {
            debug!(delay_ms = program.settle_delay.as_millis() as u64, "Settling before launch");
            tokio::time::sleep(program.settle_delay).await;
        }

        let spec = LaunchSpec::new(&program.path, program.args.clone(), &program.log_path);
        match self.host.spawn_detached(&spec).await {
            Ok(handle) => {
                info!(
                    pid = handle.pid,
                    command = %spec.command_line(),
                    "Managed program launched"
                );
                if let Some(pid_file) = &self.pid_file
                    && let Err(e) = pid_file.write(handle.pid)
                {
                    warn!(error = %e, "Could not record launched pid");
                }
                DispatchOutcome::Launched { pid: handle.pid }
            }
            Err(e) => {
                warn!(
                    program = %program.path.display(),
                    error = %e,
                    "Managed program failed to launch"
                );
                DispatchOutcome::LaunchFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// SIGTERM every running instance; does not wait for them to exit
    pub async fn stop_managed_process(&self) -> DispatchOutcome {
        let mut signalled = Vec::new();

        for pid in self.find_running().await {
            match self.host.terminate(pid).await {
                Ok(SignalOutcome::Delivered) => signalled.push(pid),
                Ok(SignalOutcome::AlreadyGone) => {
                    debug!(pid = pid, "Managed program already exited")
                }
                Err(e) => warn!(pid = pid, error = %e, "Could not signal managed program"),
            }
        }

        if let Some(pid_file) = &self.pid_file
            && let Err(e) = pid_file.remove()
        {
            warn!(error = %e, "Could not remove pid file");
        }

        info!(signalled = ?signalled, "Managed program stopped");
        DispatchOutcome::Stopped { signalled }
    }

    /// Running instances by command-line match.
    ///
    /// The pid file is only consulted when the process table cannot be
    /// scanned, e.g. `/proc` unreadable; a readable table is authoritative.
    async fn find_running(&self) -> Vec<u32> {
        let pattern = self.config.program.match_pattern();

        match self.host.find_by_command(&pattern).await {
            Ok(pids) => pids,
            Err(e) => {
                warn!(error = %e, "Could not scan process table, falling back to pid file");
                self.recorded_pid(&pattern).await.into_iter().collect()
            }
        }
    }

    // A stale pid may have been reused by an unrelated process
    async fn recorded_pid(&self, pattern: &str) -> Option<u32> {
        let pid_file = self.pid_file.as_ref()?;
        let pid = match pid_file.read() {
            Ok(pid) => pid?,
            Err(e) => {
                warn!(error = %e, "Could not read pid file");
                return None;
            }
        };

        match self.host.command_line(pid).await {
            Ok(Some(command_line)) if command_line.contains(pattern) => Some(pid),
            Ok(_) => None,
            Err(e) => {
                warn!(pid = pid, error = %e, "Could not inspect recorded pid");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metahook_host_api::MockHost;
    use std::path::Path;
    use std::time::{Duration, Instant};

    const PROGRAM: &str = "/opt/libvirt_metadata_api/main.py";

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn test_config(dir: &Path) -> HookConfig {
        let mut config = HookConfig::default();
        config.invocation_log = dir.join("daemon.log");
        config.program.log_path = dir.join("metadata.log");
        config.program.settle_delay = Duration::from_millis(50);
        config
    }

    fn running_api() -> String {
        format!("/usr/bin/python3 {PROGRAM} --enable-xheaders --load-edited-domain-xml")
    }

    #[tokio::test]
    async fn start_launches_once_after_settle_delay() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(MockHost::new());
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        let began = Instant::now();
        let outcome = dispatcher
            .dispatch(&args(&["mynet", "start", "begin", ""]))
            .await;

        let launches = host.launches();
        assert_eq!(launches.len(), 1);
        assert_eq!(outcome, DispatchOutcome::Launched { pid: launches[0].pid });
        assert!(launches[0].at.duration_since(began) >= Duration::from_millis(50));

        let spec = &launches[0].spec;
        assert_eq!(spec.program, Path::new(PROGRAM));
        assert_eq!(spec.args, args(&["--enable-xheaders", "--load-edited-domain-xml"]));
        assert_eq!(spec.stderr_log, dir.path().join("metadata.log"));
    }

    #[tokio::test]
    async fn start_wins_even_with_shutdown_present() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(MockHost::new().with_process(4321, running_api()));
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        let outcome = dispatcher.dispatch(&args(&["shutdown", "restart"])).await;

        assert!(matches!(outcome, DispatchOutcome::Launched { .. }));
        assert!(host.signals().is_empty());
    }

    #[tokio::test]
    async fn shutdown_signals_running_instance() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(MockHost::new().with_process(4321, running_api()));
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        let outcome = dispatcher
            .dispatch(&args(&["mynet", "shutdown", "end", ""]))
            .await;

        assert_eq!(outcome, DispatchOutcome::Stopped { signalled: vec![4321] });
        assert_eq!(host.signals(), vec![4321]);
        assert!(host.launches().is_empty());
    }

    #[tokio::test]
    async fn shutdown_signals_every_match_and_nothing_else() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(
            MockHost::new()
                .with_process(10, "/usr/sbin/libvirtd --timeout 120")
                .with_process(4321, running_api())
                .with_process(4400, PROGRAM),
        );
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        dispatcher.dispatch(&args(&["mynet", "shutdown"])).await;

        assert_eq!(host.signals(), vec![4321, 4400]);
        assert_eq!(host.running(), vec![10]);
    }

    #[tokio::test]
    async fn shutdown_without_instance_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(MockHost::new().with_process(10, "/usr/sbin/libvirtd"));
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        let outcome = dispatcher.dispatch(&args(&["mynet", "shutdown"])).await;

        assert_eq!(outcome, DispatchOutcome::NothingToStop);
        assert!(host.signals().is_empty());
    }

    #[tokio::test]
    async fn second_shutdown_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(MockHost::new().with_process(4321, running_api()));
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());
        let shutdown = args(&["mynet", "shutdown", "end", ""]);

        assert_eq!(
            dispatcher.dispatch(&shutdown).await,
            DispatchOutcome::Stopped { signalled: vec![4321] }
        );
        assert_eq!(
            dispatcher.dispatch(&shutdown).await,
            DispatchOutcome::NothingToStop
        );
        assert_eq!(host.signals(), vec![4321]);
    }

    #[tokio::test]
    async fn process_exiting_before_signal_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(
            MockHost::new()
                .with_stale_process(4000, running_api())
                .with_process(4321, running_api()),
        );
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        let outcome = dispatcher.dispatch(&args(&["shutdown"])).await;

        assert_eq!(outcome, DispatchOutcome::Stopped { signalled: vec![4321] });
    }

    #[tokio::test]
    async fn other_events_do_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(MockHost::new().with_process(4321, running_api()));
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        for event in [
            args(&["mynet", "stopped", "end", "-"]),
            args(&["mynet", "plugged", "begin", "-"]),
            args(&[]),
        ] {
            assert_eq!(dispatcher.dispatch(&event).await, DispatchOutcome::Ignored);
        }

        assert!(host.launches().is_empty());
        assert!(host.signals().is_empty());
    }

    #[tokio::test]
    async fn launch_failure_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(MockHost::new());
        *host.fail_spawn.lock().unwrap() = true;
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        let outcome = dispatcher.dispatch(&args(&["start"])).await;

        assert!(matches!(outcome, DispatchOutcome::LaunchFailed { .. }));
    }

    #[tokio::test]
    async fn handle_records_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(MockHost::new());
        let dispatcher = Dispatcher::new(test_config(dir.path()), host.clone());

        dispatcher.handle(&args(&["mynet", "stopped", "end", "-"])).await;
        dispatcher.handle(&args(&["mynet", "start", "begin", "-"])).await;

        let contents = std::fs::read_to_string(dir.path().join("daemon.log")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" mynet stopped end -"));
        assert!(lines[1].ends_with(" mynet start begin -"));
    }

    #[tokio::test]
    async fn unwritable_invocation_log_does_not_block_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.invocation_log = dir.path().join("missing").join("daemon.log");
        let host = Arc::new(MockHost::new());
        let dispatcher = Dispatcher::new(config, host.clone());

        let outcome = dispatcher.handle(&args(&["start"])).await;

        assert!(matches!(outcome, DispatchOutcome::Launched { .. }));
    }

    #[tokio::test]
    async fn pid_file_written_on_launch_and_removed_on_stop() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        let pid_path = dir.path().join("run").join("api.pid");
        config.program.pid_file = Some(pid_path.clone());
        let host = Arc::new(MockHost::new());
        let dispatcher = Dispatcher::new(config, host.clone());

        let DispatchOutcome::Launched { pid } = dispatcher.dispatch(&args(&["start"])).await
        else {
            panic!("expected launch");
        };
        assert_eq!(PidFile::new(&pid_path).read().unwrap(), Some(pid));

        let outcome = dispatcher.dispatch(&args(&["shutdown"])).await;
        assert_eq!(outcome, DispatchOutcome::Stopped { signalled: vec![pid] });
        assert!(!pid_path.exists());
    }

    #[tokio::test]
    async fn pid_file_used_when_scan_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        let pid_path = dir.path().join("api.pid");
        config.program.pid_file = Some(pid_path.clone());
        PidFile::new(&pid_path).write(4321).unwrap();

        let host = Arc::new(
            MockHost::new()
                .with_process(4321, running_api())
                .with_process(4400, running_api()),
        );
        *host.fail_scan.lock().unwrap() = true;
        let dispatcher = Dispatcher::new(config, host.clone());

        let outcome = dispatcher.dispatch(&args(&["shutdown"])).await;

        // Only the recorded instance is reachable without a scan
        assert_eq!(outcome, DispatchOutcome::Stopped { signalled: vec![4321] });
        assert_eq!(host.running(), vec![4400]);
        assert!(!pid_path.exists());
    }

    #[tokio::test]
    async fn pid_file_ignored_when_scan_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        let pid_path = dir.path().join("api.pid");
        config.program.pid_file = Some(pid_path.clone());
        PidFile::new(&pid_path).write(555).unwrap();

        // A recorded pid that is alive but was never matched by the scan
        let host = Arc::new(MockHost::new().with_process(555, running_api()));
        host.hide_from_scan(555);
        let dispatcher = Dispatcher::new(config, host.clone());

        let outcome = dispatcher.dispatch(&args(&["shutdown"])).await;

        assert_eq!(outcome, DispatchOutcome::NothingToStop);
        assert!(host.signals().is_empty());
    }

    #[tokio::test]
    async fn recorded_pid_of_unrelated_process_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        let pid_path = dir.path().join("api.pid");
        config.program.pid_file = Some(pid_path.clone());
        PidFile::new(&pid_path).write(555).unwrap();

        let host = Arc::new(MockHost::new().with_process(555, "/usr/bin/vim notes.txt"));
        *host.fail_scan.lock().unwrap() = true;
        let dispatcher = Dispatcher::new(config, host.clone());

        let outcome = dispatcher.dispatch(&args(&["shutdown"])).await;

        assert_eq!(outcome, DispatchOutcome::NothingToStop);
        assert!(host.signals().is_empty());
    }
}
