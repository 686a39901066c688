//! Select: elementwise map.

use querykit_core::types::Sequence;

use crate::functor::Functor;
use crate::traits::OpError;

/// Map every element through `f: T -> U`. Length and order are preserved.
pub fn select(data: &Sequence, f: &Functor) -> Result<Sequence, OpError> {
    f.expect_unary("select", data.elem_type())?;

    let mut out = Vec::with_capacity(data.len());
    for v in data.iter() {
        out.push(f.call1(v)?);
    }
    Ok(Sequence::new_unchecked(f.ret().clone(), out))
}
