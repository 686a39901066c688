//! Distinct by a set of columns, first occurrence wins.
//!
//! The dedup key is a "skeleton": a zero-valued element with only the named
//! fields copied in, so unrelated fields never influence equality.

use std::collections::HashSet;

use querykit_core::dsl::parse_columns;
use querykit_core::types::Sequence;

use crate::extract::Accessor;
use crate::traits::OpError;

pub fn distinct(data: &Sequence, columns: &str) -> Result<Sequence, OpError> {
    let elem = data.elem_type();
    if elem.as_struct().is_none() {
        return Err(OpError::Config(format!(
            "distinct needs struct elements, got {}",
            elem
        )));
    }
    let accessors = parse_columns(columns)?
        .iter()
        .map(|path| Accessor::resolve(elem, path))
        .collect::<Result<Vec<_>, _>>()?;

    let zero = elem.zero_value();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in data.iter() {
        let mut skeleton = zero.clone();
        for acc in &accessors {
            acc.set(&mut skeleton, acc.get(v)?.clone())?;
        }
        if seen.insert(skeleton) {
            out.push(v.clone());
        }
    }
    Ok(Sequence::new_unchecked(elem.clone(), out))
}
