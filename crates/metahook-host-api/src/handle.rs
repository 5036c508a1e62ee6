//! Launch requests and process handles

use std::path::PathBuf;

/// Everything needed to launch the managed program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Executable path
    pub program: PathBuf,

    /// Arguments passed verbatim
    pub args: Vec<String>,

    /// File receiving the program's stderr (created or truncated)
    pub stderr_log: PathBuf,
}

impl LaunchSpec {
    pub fn new(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        stderr_log: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            stderr_log: stderr_log.into(),
        }
    }

    /// Command line as it appears in the process table
    pub fn command_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// A launched process the host no longer owns
///
/// Dropping this does nothing: the process keeps running after the hook
/// exits and is never waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedHandle {
    pub pid: u32,
}

/// Result of delivering a termination signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Signal accepted by the kernel
    Delivered,
    /// The process exited between lookup and signal
    AlreadyGone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_joins_program_and_args() {
        let spec = LaunchSpec::new(
            "/opt/libvirt_metadata_api/main.py",
            vec!["--enable-xheaders".into(), "--load-edited-domain-xml".into()],
            "/var/log/libvirt/metadata.log",
        );
        assert_eq!(
            spec.command_line(),
            "/opt/libvirt_metadata_api/main.py --enable-xheaders --load-edited-domain-xml"
        );
    }

    #[test]
    fn command_line_without_args() {
        let spec = LaunchSpec::new("/bin/true", vec![], "/dev/null");
        assert_eq!(spec.command_line(), "/bin/true");
    }
}
