//! Default paths for the hook
//!
//! These are the locations a stock libvirt host expects. All of them can be
//! overridden through the config file, whose own location can be overridden
//! with `$METAHOOK_CONFIG`.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable for overriding the config file path
pub const METAHOOK_CONFIG_ENV: &str = "METAHOOK_CONFIG";

/// Environment variable holding the tracing filter
pub const METAHOOK_LOG_ENV: &str = "METAHOOK_LOG";

/// Config file read when `$METAHOOK_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "/etc/libvirt/hooks/metahook.toml";

/// Append-only record of every hook invocation
pub const DEFAULT_INVOCATION_LOG: &str = "/tmp/daemon.log";

/// The metadata API executable
pub const DEFAULT_PROGRAM_PATH: &str = "/opt/libvirt_metadata_api/main.py";

/// Receives the metadata API's stderr; truncated on every launch
pub const DEFAULT_PROGRAM_LOG: &str = "/var/log/libvirt/metadata.log";

/// Flags passed verbatim to the metadata API
pub const DEFAULT_PROGRAM_ARGS: [&str; 2] = ["--enable-xheaders", "--load-edited-domain-xml"];

/// Pause before launching so libvirt networking can settle
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Get the config file path.
///
/// Order of precedence:
/// 1. `$METAHOOK_CONFIG` environment variable (if set and non-empty)
/// 2. `/etc/libvirt/hooks/metahook.toml`
pub fn default_config_path() -> PathBuf {
    match std::env::var_os(METAHOOK_CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

/// Default program arguments as owned strings
pub fn default_program_args() -> Vec<String> {
    DEFAULT_PROGRAM_ARGS.iter().map(|s| s.to_string()).collect()
}
