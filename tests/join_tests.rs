//! Sort-merge join placements


use querykit_core::config::EngineConfig;
use querykit_core::schema::{DataType, Field, StructType};
use querykit_core::types::{Sequence, Value};
use querykit_exec::Engine;
use querykit_operators::{Functor, OpError, SpecializationRegistry};
use test_data_gen::{
    field, generate_orders, generate_users, order, order_type, user, user_order_type, users,
};

fn engine() -> Engine {
    Engine::with_registry(EngineConfig::default(), SpecializationRegistry::empty())
}

fn user_order() -> Functor {
    Functor::binary(
        test_data_gen::user_type(),
        order_type(),
        user_order_type(),
        |u, o| Value::Struct(vec![field(u, 0).clone(), field(u, 1).clone(), field(o, 0).clone()]),
    )
}

fn orders(rows: &[(i64, i64)]) -> Sequence {
    let values = rows.iter().map(|&(id, uid)| order(id, uid, 0.0)).collect();
    Sequence::new(order_type(), values).expect("Failed to build orders")
}

fn order_ids(seq: &Sequence) -> Vec<i64> {
    seq.iter()
        .map(|row| field(row, 2).as_i64().expect("OrderId"))
        .collect()
}

#[test]
fn test_left_join_fills_missing_right_with_zero() {
    let id_type = DataType::Struct(StructType::new("Key", vec![Field::new("Id", DataType::Int64)]));
    let val_type = DataType::Struct(StructType::new(
        "Item",
        vec![Field::new("Id", DataType::Int64), Field::new("Val", DataType::Utf8)],
    ));
    let out_type = DataType::Struct(StructType::new(
        "Row",
        vec![Field::new("Id", DataType::Int64), Field::new("Val", DataType::Utf8)],
    ));

    let left = Sequence::new(
        id_type.clone(),
        vec![Value::Struct(vec![Value::I64(1)]), Value::Struct(vec![Value::I64(2)])],
    )
    .expect("left");
    let right = Sequence::new(
        val_type.clone(),
        vec![Value::Struct(vec![Value::I64(2), Value::from("x")])],
    )
    .expect("right");
    let row = Functor::binary(id_type, val_type, out_type.clone(), |l, r| {
        Value::Struct(vec![field(l, 0).clone(), field(r, 1).clone()])
    });

    let joined = engine()
        .left_join(&left, &right, "Id = Id", &row)
        .expect("Join failed");

    let expected = Sequence::new(
        out_type,
        vec![
            Value::Struct(vec![Value::I64(1), Value::from("")]),
            Value::Struct(vec![Value::I64(2), Value::from("x")]),
        ],
    )
    .expect("expected");
    assert_eq!(joined, expected);
}

#[test]
fn test_outer_count_is_matched_plus_unmatched() {
    let left = generate_users(20);
    let right = generate_orders(30);

    let user_ids: Vec<i64> = left.iter().map(|u| field(u, 0).as_i64().unwrap()).collect();
    let order_uids: Vec<i64> = right.iter().map(|o| field(o, 1).as_i64().unwrap()).collect();
    let matched: usize = user_ids
        .iter()
        .map(|id| order_uids.iter().filter(|uid| *uid == id).count())
        .sum();
    let unmatched_left = user_ids.iter().filter(|id| !order_uids.contains(id)).count();
    let unmatched_right = order_uids.iter().filter(|uid| !user_ids.contains(uid)).count();
    assert!(matched > 0 && unmatched_left > 0 && unmatched_right > 0);

    let e = engine();
    let f = user_order();
    let outer = e.outer_join(&left, &right, "UserId = UserId", &f).expect("Join failed");
    let inner = e.inner_join(&left, &right, "UserId = UserId", &f).expect("Join failed");
    let left_rows = e.left_join(&left, &right, "UserId = UserId", &f).expect("Join failed");
    let right_rows = e.right_join(&left, &right, "UserId = UserId", &f).expect("Join failed");

    assert_eq!(outer.len(), matched + unmatched_left + unmatched_right);
    assert_eq!(inner.len(), matched);
    assert_eq!(left_rows.len(), matched + unmatched_left);
    assert_eq!(right_rows.len(), matched + unmatched_right);

    for row in inner.iter() {
        assert!(outer.values().contains(row), "inner row missing from outer: {:?}", row);
    }
}

#[test]
fn test_right_join_emits_unmatched_in_sorted_right_order() {
    let left = users(&[(1, "ann", 30), (2, "bob", 20)]);
    let right = orders(&[(100, 9), (101, 2), (102, 5)]);

    let joined = engine()
        .right_join(&left, &right, "UserId = UserId", &user_order())
        .expect("Join failed");

    assert_eq!(order_ids(&joined), vec![101, 102, 100]);
    // Unmatched right rows see the zero user
    assert_eq!(field(&joined.values()[1], 0), &Value::I64(0));
    assert_eq!(field(&joined.values()[1], 1), &Value::from(""));
}

#[test]
fn test_duplicate_keys_cross_match() {
    let left = users(&[(1, "a", 0), (1, "b", 0)]);
    let right = orders(&[(11, 1), (10, 1)]);

    let joined = engine()
        .inner_join(&left, &right, "UserId = UserId", &user_order())
        .expect("Join failed");

    let rows: Vec<(String, i64)> = joined
        .iter()
        .map(|r| {
            (
                field(r, 1).as_str().unwrap().to_string(),
                field(r, 2).as_i64().unwrap(),
            )
        })
        .collect();
    // Equal right keys keep their input order
    assert_eq!(
        rows,
        vec![
            ("a".to_string(), 11),
            ("a".to_string(), 10),
            ("b".to_string(), 11),
            ("b".to_string(), 10),
        ]
    );
    assert_eq!(joined.get(0).map(|r| field(r, 0)), Some(&Value::I64(1)));
    assert_eq!(left.get(0), Some(&user(1, "a", 0)));
}

#[test]
fn test_join_rejects_bad_configuration() {
    let left = users(&[(1, "a", 0)]);
    let right = orders(&[(10, 1)]);
    let f = user_order();
    let e = engine();

    let err = e.join(&left, &right, "sideways", "UserId = UserId", &f).unwrap_err();
    assert!(err.to_string().contains("invalid join placement"));

    assert!(matches!(
        e.join(&left, &right, "inner", "UserId", &f),
        Err(OpError::Config(_))
    ));
    assert!(matches!(
        e.join(&left, &right, "inner", "Name = UserId", &f),
        Err(OpError::Config(ref m)) if m.contains("join key types differ")
    ));

    // Functor parameter order must be (left, right)
    let swapped = Functor::binary(
        order_type(),
        test_data_gen::user_type(),
        user_order_type(),
        |_, _| Value::Bool(false),
    );
    assert!(e.inner_join(&left, &right, "UserId = UserId", &swapped).is_err());

    // Placement is case-insensitive
    let upper = e.join(&left, &right, " Inner ", "UserId = UserId", &f).expect("Join failed");
    assert_eq!(upper.len(), 1);
}
