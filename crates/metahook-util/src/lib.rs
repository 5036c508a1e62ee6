//! Shared utilities for metahook
//!
//! This crate provides:
//! - Error types
//! - Default paths for the invocation log, managed program and config file
//! - Timestamp formatting for invocation records

mod error;
mod paths;
mod time;

pub use error::*;
pub use paths::*;
pub use time::*;
