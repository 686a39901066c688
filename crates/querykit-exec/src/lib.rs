#![forbid(unsafe_code)]
//! querykit-exec: the dispatching engine.
//!
//! `Engine` is the public operator surface. Each call computes the type
//! signature of its operands, runs a registered specialization when one
//! exists and falls back to the generic operator otherwise.

pub mod metrics;
pub mod runtime;

pub use metrics::{DispatchStats, StatsSnapshot};
pub use runtime::Engine;
