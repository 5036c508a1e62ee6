//! Host adapter trait interfaces for metahook
//!
//! This crate defines the interface between the dispatcher and the
//! platform that actually launches, finds and signals processes. It contains
//! no platform code itself.

mod handle;
mod mock;
mod traits;

pub use handle::*;
pub use mock::*;
pub use traits::*;
