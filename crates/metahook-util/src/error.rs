//! Error types for metahook

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for metahook operations
#[derive(Debug, Error)]
pub enum HookError {
    #[error("Invocation log error at {path:?}: {source}")]
    InvocationLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pid file error at {path:?}: {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HookError {
    pub fn invocation_log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InvocationLog {
            path: path.into(),
            source,
        }
    }

    pub fn pid_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PidFile {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HookError>;
