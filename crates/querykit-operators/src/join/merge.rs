//! Sort-merge join.
//!
//! The right side is stable-sorted by its key once; each left element then
//! binary-searches the lower bound of its key and scans the equal-key band.
//! Cost is O((n + m) log m). Duplicate keys on both sides cross-match.
//!
//! Unmatched right elements (right/outer placement) are emitted after all
//! left elements, in sorted-right order.

use querykit_core::dsl::{JoinSpec, OrderSpec, Placement};
use querykit_core::types::{Sequence, Value};

use crate::compare::{Comparator, KeyComparator};
use crate::extract::Accessor;
use crate::functor::Functor;
use crate::sort::sorted_values;
use crate::traits::OpError;

/// `placement` is one of `left|right|inner|outer`; `on` is `leftField = rightField`.
pub fn join(
    left: &Sequence,
    right: &Sequence,
    placement: &str,
    on: &str,
    f: &Functor,
) -> Result<Sequence, OpError> {
    let placement: Placement = placement.parse()?;
    let spec = JoinSpec::parse(on)?;
    merge_join(left, right, placement, &spec, f)
}

pub fn merge_join(
    left: &Sequence,
    right: &Sequence,
    placement: Placement,
    spec: &JoinSpec,
    f: &Functor,
) -> Result<Sequence, OpError> {
    f.expect_binary("join", left.elem_type(), right.elem_type())?;

    let left_key = KeyComparator::new(Accessor::resolve(left.elem_type(), &spec.left)?, false)?;
    let right_order = OrderSpec::ascending(spec.right.clone());
    let right_cmp = Comparator::build(right.elem_type(), &right_order)?;
    let right_key = &right_cmp.keys()[0];
    if left_key.kind() != right_key.kind() {
        return Err(OpError::Config(format!(
            "join key types differ: {} ({}) vs {} ({})",
            spec.left,
            left_key.accessor().data_type(),
            spec.right,
            right_key.accessor().data_type()
        )));
    }

    let right_sorted = sorted_values(right.values(), &right_cmp)?;
    let right_keys = right_sorted
        .iter()
        .map(|r| right_key.accessor().get(r))
        .collect::<Result<Vec<&Value>, _>>()?;
    let mut matched = vec![false; right_sorted.len()];
    let right_zero = right.elem_type().zero_value();

    let mut out = Vec::new();
    for l in left.iter() {
        let lk = left_key.accessor().get(l)?;
        let mut j = right_keys.partition_point(|rk| left_key.compare_fields(rk, lk).is_lt());

        let mut found = false;
        while j < right_keys.len() && left_key.compare_fields(lk, right_keys[j]).is_eq() {
            out.push(f.call2(l, &right_sorted[j])?);
            matched[j] = true;
            found = true;
            j += 1;
        }

        if !found && placement.keeps_unmatched_left() {
            out.push(f.call2(l, &right_zero)?);
        }
    }

    if placement.keeps_unmatched_right() {
        let left_zero = left.elem_type().zero_value();
        for (r, hit) in right_sorted.iter().zip(&matched) {
            if !hit {
                out.push(f.call2(&left_zero, r)?);
            }
        }
    }

    Ok(Sequence::new_unchecked(f.ret().clone(), out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use querykit_core::schema::{DataType, Field, StructType};

    fn user() -> DataType {
        DataType::Struct(StructType::new(
            "User",
            vec![Field::new("Id", DataType::Int64)],
        ))
    }

    fn item() -> DataType {
        DataType::Struct(StructType::new(
            "Item",
            vec![
                Field::new("Id", DataType::Int32),
                Field::new("Val", DataType::Utf8),
            ],
        ))
    }

    fn pair() -> DataType {
        DataType::Struct(StructType::new(
            "Pair",
            vec![
                Field::new("Id", DataType::Int64),
                Field::new("Val", DataType::Utf8),
            ],
        ))
    }

    fn users(ids: &[i64]) -> Sequence {
        Sequence::new(
            user(),
            ids.iter().map(|&id| Value::Struct(vec![Value::I64(id)])).collect(),
        )
        .unwrap()
    }

    fn items(rows: &[(i32, &str)]) -> Sequence {
        Sequence::new(
            item(),
            rows.iter()
                .map(|&(id, v)| Value::Struct(vec![Value::I32(id), Value::Str(v.into())]))
                .collect(),
        )
        .unwrap()
    }

    fn pair_fn() -> Functor {
        Functor::binary(user(), item(), pair(), |l, r| {
            let id = l.as_struct().unwrap()[0].clone();
            let val = r.as_struct().unwrap()[1].clone();
            Value::Struct(vec![id, val])
        })
    }

    fn p(id: i64, v: &str) -> Value {
        Value::Struct(vec![Value::I64(id), Value::Str(v.into())])
    }

    #[test]
    fn left_join_fills_missing_right_with_zero() {
        let out = join(&users(&[1, 2]), &items(&[(2, "x")]), "left", "Id = Id", &pair_fn())
            .expect("join");
        assert_eq!(out.values(), &[p(1, ""), p(2, "x")]);
    }

    #[test]
    fn duplicates_cross_match_within_band() {
        let out = join(
            &users(&[2, 2]),
            &items(&[(2, "a"), (1, "z"), (2, "b")]),
            "inner",
            "Id=Id",
            &pair_fn(),
        )
        .expect("join");
        assert_eq!(out.values(), &[p(2, "a"), p(2, "b"), p(2, "a"), p(2, "b")]);
    }

    #[test]
    fn unmatched_right_follows_sorted_right_order() {
        let out = join(
            &users(&[5]),
            &items(&[(9, "nine"), (3, "three"), (5, "five")]),
            "RIGHT",
            "Id = Id",
            &pair_fn(),
        )
        .expect("join");
        assert_eq!(out.values(), &[p(5, "five"), p(0, "three"), p(0, "nine")]);
    }

    #[test]
    fn rejects_bad_placement_and_mismatched_keys() {
        let err = join(&users(&[1]), &items(&[]), "cross", "Id = Id", &pair_fn()).unwrap_err();
        assert!(matches!(err, OpError::Config(_)));
        let err = join(&users(&[1]), &items(&[]), "inner", "Id = Val", &pair_fn()).unwrap_err();
        assert!(err.to_string().contains("join key types differ"));
        let err = join(&users(&[1]), &items(&[]), "inner", "Id", &pair_fn()).unwrap_err();
        assert!(matches!(err, OpError::Config(_)));
    }
}
