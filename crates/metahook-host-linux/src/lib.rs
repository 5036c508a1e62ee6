//! Linux host adapter for metahook
//!
//! Provides:
//! - Detached spawning in a new session with stderr redirected to a file
//! - Process lookup by scanning `/proc/<pid>/cmdline`
//! - SIGTERM delivery that tolerates already-exited processes

mod adapter;
mod process;
mod procfs;

pub use adapter::*;
pub use process::*;
pub use procfs::*;
