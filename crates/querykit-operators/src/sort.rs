//! Stable in-memory sort driven by a composite comparator.
//!
//! Like `sort_by_columns` on row batches: extract a key tuple per element,
//! stable-sort the element indices by key, then gather the elements.

use querykit_core::types::{Sequence, Value};

use crate::compare::{Comparator, SortKey};
use crate::traits::OpError;

/// Sort a copy of `data` by `order` (`field [asc|desc], ...`).
pub fn sort(data: &Sequence, order: &str) -> Result<Sequence, OpError> {
    let cmp = Comparator::parse(data.elem_type(), order)?;
    sort_with(data, &cmp)
}

pub fn sort_with(data: &Sequence, cmp: &Comparator) -> Result<Sequence, OpError> {
    let sorted = sorted_values(data.values(), cmp)?;
    Ok(Sequence::new_unchecked(data.elem_type().clone(), sorted))
}

/// Stable permutation of `values` under `cmp`, plus the extracted keys
/// (indexed by original position).
pub fn sorted_order<'a>(
    values: &'a [Value],
    cmp: &Comparator,
) -> Result<(Vec<usize>, Vec<SortKey<'a>>), OpError> {
    let keys = cmp.extract_all(values)?;
    let mut order: Vec<usize> = (0..values.len()).collect();
    // slice::sort_by is stable: equal keys keep their input order.
    order.sort_by(|&a, &b| cmp.compare_keys(&keys[a], &keys[b]));
    Ok((order, keys))
}

pub fn sorted_values(values: &[Value], cmp: &Comparator) -> Result<Vec<Value>, OpError> {
    let (order, _) = sorted_order(values, cmp)?;
    Ok(order.into_iter().map(|i| values[i].clone()).collect())
}
