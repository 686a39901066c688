//! Group: sort, split into maximal equal-key runs, aggregate each run.
//!
//! The aggregation may return a scalar (one output row per run) or a list
//! (the run explodes into that many output rows).

use querykit_core::schema::DataType;
use querykit_core::types::{Sequence, Value};

use crate::compare::Comparator;
use crate::functor::Functor;
use crate::sort::sorted_order;
use crate::traits::OpError;

pub fn group(data: &Sequence, order: &str, f: &Functor) -> Result<Sequence, OpError> {
    let cmp = Comparator::parse(data.elem_type(), order)?;
    group_with(data, &cmp, f)
}

pub fn group_with(data: &Sequence, cmp: &Comparator, f: &Functor) -> Result<Sequence, OpError> {
    f.expect_run("group", data.elem_type())?;
    let (flatten, out_type) = match f.ret() {
        DataType::List(elem) => (true, elem.as_ref().clone()),
        other => (false, other.clone()),
    };

    let values = data.values();
    let (order, keys) = sorted_order(values, cmp)?;
    let sorted: Vec<Value> = order.iter().map(|&i| values[i].clone()).collect();

    let mut out = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let head = &keys[order[start]];
        let mut end = start + 1;
        while end < sorted.len() && cmp.compare_keys(head, &keys[order[end]]).is_eq() {
            end += 1;
        }

        match f.call_run(&sorted[start..end])? {
            Value::List(items) if flatten => out.extend(items),
            single => out.push(single),
        }
        start = end;
    }
    Ok(Sequence::new_unchecked(out_type, out))
}
