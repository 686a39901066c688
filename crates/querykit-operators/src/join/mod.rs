//! Join operators. Only the sort-merge strategy is implemented.

pub mod merge;

pub use merge::{join, merge_join};

use querykit_core::types::Sequence;

use crate::functor::Functor;
use crate::traits::OpError;

pub fn left_join(
    left: &Sequence,
    right: &Sequence,
    on: &str,
    f: &Functor,
) -> Result<Sequence, OpError> {
    join(left, right, "left", on, f)
}

pub fn right_join(
    left: &Sequence,
    right: &Sequence,
    on: &str,
    f: &Functor,
) -> Result<Sequence, OpError> {
    join(left, right, "right", on, f)
}

pub fn inner_join(
    left: &Sequence,
    right: &Sequence,
    on: &str,
    f: &Functor,
) -> Result<Sequence, OpError> {
    join(left, right, "inner", on, f)
}

pub fn outer_join(
    left: &Sequence,
    right: &Sequence,
    on: &str,
    f: &Functor,
) -> Result<Sequence, OpError> {
    join(left, right, "outer", on, f)
}
