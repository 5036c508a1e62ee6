//! Lifecycle hook dispatcher for metahook
//!
//! This crate contains the hook's decision logic:
//! - Classifying libvirt hook arguments into start/shutdown events
//! - Recording each invocation
//! - Launching the managed program after the settle delay
//! - Finding and terminating running instances
//!
//! Nothing in here fails the caller. Every problem is logged and folded into
//! a [`DispatchOutcome`].

mod dispatcher;
mod event;
mod journal;
mod pidfile;

pub use dispatcher::*;
pub use event::*;
pub use journal::*;
pub use pidfile::*;
