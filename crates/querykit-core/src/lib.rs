#![forbid(unsafe_code)]
//! querykit-core: shared kernel for the querykit engine.
//!
//! This crate contains only *pure* types and small helpers that the operator
//! and exec crates build on. There is **no I/O** and **no global state** here.
//!
//! Crates that use this:
//! - querykit-operators: resolves field paths and compares/moves `Value`s.
//! - querykit-exec: reads `EngineConfig` and hands sequences to operators.

pub mod config;
pub mod dsl;
pub mod error;
pub mod hash;
pub mod prelude;
pub mod schema;
pub mod types;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
