//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Hook-level settings
    #[serde(default)]
    pub hook: RawHookSection,

    /// Managed program settings
    #[serde(default)]
    pub program: RawProgramSection,
}

/// Hook-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawHookSection {
    /// Invocation log (default: /tmp/daemon.log)
    pub log_path: Option<PathBuf>,
}

/// Managed program settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawProgramSection {
    /// Executable path (default: /opt/libvirt_metadata_api/main.py)
    pub path: Option<PathBuf>,

    /// Arguments passed verbatim
    pub args: Option<Vec<String>>,

    /// stderr destination, truncated on each launch
    pub log_path: Option<PathBuf>,

    /// Delay before launch, in milliseconds
    pub settle_delay_ms: Option<u64>,

    /// Where to record the launched pid
    pub pid_file: Option<PathBuf>,
}
