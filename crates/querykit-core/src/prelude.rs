//! Convenient re-exports for downstream crates.

pub use crate::config::EngineConfig;
pub use crate::dsl::{FieldPath, JoinSpec, OrderKey, OrderSpec, Placement};
pub use crate::error::{Error, Result};
pub use crate::hash::Hash256;
pub use crate::schema::{DataType, Field, Kind, StructType};
pub use crate::types::{Sequence, Timestamp, Value};
