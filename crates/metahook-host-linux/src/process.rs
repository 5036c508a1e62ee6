//! Process management utilities

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::fs::File;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use tracing::debug;

use metahook_host_api::{DetachedHandle, HostError, HostResult, LaunchSpec, SignalOutcome};

/// Spawn a process in its own session and let it go.
///
/// stderr goes to `spec.stderr_log`, created or truncated first. stdin and
/// stdout are `/dev/null` so the process holds none of the caller's pipes.
/// The `Child` is dropped without waiting; once this process exits the
/// orphan is reparented to init.
pub fn spawn_detached(spec: &LaunchSpec) -> HostResult<DetachedHandle> {
    let stderr = File::create(&spec.stderr_log).map_err(|e| {
        HostError::SpawnFailed(format!(
            "Failed to open log {}: {}",
            spec.stderr_log.display(),
            e
        ))
    })?;

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::from(stderr));

    // SAFETY: setsid is async-signal-safe and touches no shared state
    unsafe {
        cmd.pre_exec(|| {
            // New session: no controlling terminal, not in the caller's
            // process group, so signals aimed at the caller miss it
            nix::unistd::setsid().map_err(std::io::Error::from)?;
            Ok(())
        });
    }

    let child = cmd.spawn().map_err(|e| {
        HostError::SpawnFailed(format!(
            "Failed to spawn {}: {}",
            spec.program.display(),
            e
        ))
    })?;

    let pid = child.id();
    debug!(pid = pid, program = %spec.program.display(), "Process spawned detached");
    drop(child);

    Ok(DetachedHandle { pid })
}

/// Send SIGTERM to a single process
pub fn terminate(pid: u32) -> HostResult<SignalOutcome> {
    // kill(0) and negative pids address process groups
    let raw = match i32::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => {
            return Err(HostError::SignalFailed {
                pid,
                message: "not a single-process pid".into(),
            });
        }
    };

    match signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) => {
            debug!(pid = pid, "Sent SIGTERM");
            Ok(SignalOutcome::Delivered)
        }
        Err(nix::errno::Errno::ESRCH) => Ok(SignalOutcome::AlreadyGone),
        Err(e) => Err(HostError::SignalFailed {
            pid,
            message: e.to_string(),
        }),
    }
}
