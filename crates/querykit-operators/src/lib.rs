#![forbid(unsafe_code)]
//! querykit-operators: the generic (runtime-typed) query operators.
//!
//! Design intent:
//! - Every operator is pure and synchronous; inputs are borrowed, outputs are
//!   freshly allocated.
//! - Elements are only inspected through `DataType`/`Kind`; field paths are
//!   resolved once per call into `Accessor`s before any element is touched.
//! - The generic functions here are the semantic reference. Specializations
//!   registered in `registry` must return exactly what these return.

pub mod compare;
pub mod extract;
pub mod functor;
pub mod registry;
pub mod signature;
pub mod traits;

pub mod column;
pub mod distinct;
pub mod filter;
pub mod group;
pub mod reduce;
pub mod select;

pub mod join;
pub mod sort;

pub use compare::Comparator;
pub use extract::Accessor;
pub use functor::{FnType, Functor};
pub use registry::{handler, Handler, OperatorName, RegistryBuilder, SpecializationRegistry};
pub use signature::TypeSignature;
pub use traits::{OpError, Operand, Output};
