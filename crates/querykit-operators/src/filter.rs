//! Where: keep the elements a predicate accepts.

use querykit_core::schema::DataType;
use querykit_core::types::{Sequence, Value};

use crate::functor::Functor;
use crate::traits::OpError;

/// Keep elements for which `predicate: T -> bool` returns true, in order.
pub fn filter(data: &Sequence, predicate: &Functor) -> Result<Sequence, OpError> {
    predicate.expect_unary("where", data.elem_type())?;
    predicate.expect_ret("where", &DataType::Boolean)?;

    let mut kept = Vec::new();
    for v in data.iter() {
        if let Value::Bool(true) = predicate.call1(v)? {
            kept.push(v.clone());
        }
    }
    Ok(Sequence::new_unchecked(data.elem_type().clone(), kept))
}
