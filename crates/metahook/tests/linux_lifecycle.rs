//! Start and stop a real detached process through the Linux host.
//!
//! Kept alone in its own test binary: the program is a script written just
//! before it is executed, and a concurrent fork elsewhere in the process
//! could hold its write descriptor open and make exec fail with ETXTBSY.

use metahook_config::HookConfig;
use metahook_core::{DispatchOutcome, Dispatcher};
use metahook_host_api::HostAdapter;
use metahook_host_linux::LinuxHost;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn start_then_shutdown_real_process() {
    let dir = tempfile::tempdir().unwrap();
    let program = dir.path().join("main.py");
    std::fs::write(
        &program,
        "#!/bin/sh\necho \"api up: $*\" >&2\nwhile :; do sleep 0.1; done\n",
    )
    .unwrap();
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut config = HookConfig::default();
    config.invocation_log = dir.path().join("daemon.log");
    config.program.path = program.clone();
    config.program.log_path = dir.path().join("metadata.log");
    config.program.settle_delay = Duration::from_millis(100);

    let host = Arc::new(LinuxHost::new());
    let dispatcher = Dispatcher::new(config, host.clone());
    let pattern = program.to_string_lossy().into_owned();

    let outcome = dispatcher.handle(&args(&["mynet", "start", "begin", "-"])).await;
    let DispatchOutcome::Launched { pid } = outcome else {
        panic!("metadata API did not launch");
    };
    assert_eq!(host.find_by_command(&pattern).await.unwrap(), vec![pid]);

    let program_log = dir.path().join("metadata.log");
    let start = Instant::now();
    while std::fs::read_to_string(&program_log).unwrap_or_default().is_empty() {
        assert!(start.elapsed() < Duration::from_secs(5), "program never wrote to its log");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let outcome = dispatcher
        .handle(&args(&["mynet", "shutdown", "end", "-"]))
        .await;
    assert_eq!(outcome, DispatchOutcome::Stopped { signalled: vec![pid] });

    // The terminated child is never reaped here, so it lingers as a zombie
    // whose cmdline no longer matches
    let start = Instant::now();
    while !host.find_by_command(&pattern).await.unwrap().is_empty() {
        assert!(start.elapsed() < Duration::from_secs(5), "process survived SIGTERM");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(
        dispatcher
            .handle(&args(&["mynet", "shutdown", "end", "-"]))
            .await,
        DispatchOutcome::NothingToStop
    );

    let program_log = std::fs::read_to_string(&program_log).unwrap();
    assert_eq!(program_log, "api up: --enable-xheaders --load-edited-domain-xml\n");

    let invocations = std::fs::read_to_string(dir.path().join("daemon.log")).unwrap();
    assert_eq!(invocations.lines().count(), 3);
}
