//! Operator behavior through the engine, generic path only.


use querykit_core::config::EngineConfig;
use querykit_core::schema::DataType;
use querykit_core::types::Value;
use querykit_exec::Engine;
use querykit_operators::{Functor, OpError, SpecializationRegistry};
use test_data_gen::{field, generate_users, ints, user, user_type, users};

fn engine() -> Engine {
    Engine::with_registry(EngineConfig::default(), SpecializationRegistry::empty())
}

fn ids(seq: &querykit_core::types::Sequence) -> Vec<i64> {
    seq.iter()
        .map(|u| field(u, 0).as_i64().expect("UserId"))
        .collect()
}

#[test]
fn test_group_count_by_age() {
    let data = users(&[(1, "ann", 30), (2, "bob", 20), (3, "cid", 20)]);
    let count = Functor::run(user_type(), DataType::Int64, |run| {
        Value::I64(run.len() as i64)
    });

    let counts = engine().group(&data, "Age", &count).expect("Group failed");
    assert_eq!(counts, ints(&[2, 1]));
}

#[test]
fn test_sort_is_stable() {
    let data = users(&[(1, "a", 30), (2, "b", 20), (3, "c", 30), (4, "d", 20)]);
    let e = engine();

    let asc = e.sort(&data, "Age").expect("Sort failed");
    assert_eq!(ids(&asc), vec![2, 4, 1, 3]);

    let desc = e.sort(&data, "Age desc").expect("Sort failed");
    assert_eq!(ids(&desc), vec![1, 3, 2, 4]);

    // Second key breaks the tie, first key still dominates
    let both = e.sort(&data, "Age desc, UserId desc").expect("Sort failed");
    assert_eq!(ids(&both), vec![3, 1, 4, 2]);
}

#[test]
fn test_sort_by_timestamp() {
    let data = users(&[(5, "a", 1), (2, "b", 1), (9, "c", 1)]);
    let sorted = engine()
        .sort(&data, "CreateTime desc")
        .expect("Sort failed");
    assert_eq!(ids(&sorted), vec![9, 5, 2]);
}

#[test]
fn test_group_identity_matches_sort() {
    let data = generate_users(50);
    let identity = Functor::run(user_type(), DataType::list_of(user_type()), |run| {
        Value::List(run.to_vec())
    });
    let e = engine();

    let grouped = e.group(&data, "Age, Name", &identity).expect("Group failed");
    let sorted = e.sort(&data, "Age, Name").expect("Sort failed");
    assert_eq!(grouped, sorted);
}

#[test]
fn test_distinct_keeps_first_and_is_idempotent() {
    let data = generate_users(40);
    let e = engine();

    let once = e.distinct(&data, "Age").expect("Distinct failed");
    assert_eq!(once.len(), 30);
    assert_eq!(ids(&once), (0..30).collect::<Vec<i64>>());

    let twice = e.distinct(&once, "Age").expect("Distinct failed");
    assert_eq!(once, twice);
}

#[test]
fn test_column_map_lowest_index_wins() {
    let data = users(&[(1, "a", 20), (2, "b", 20), (3, "c", 30)]);
    let map = engine().column_map(&data, "Age").expect("ColumnMap failed");

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&Value::I32(20)), Some(&user(1, "a", 20)));
    assert_eq!(map.get(&Value::I32(30)), Some(&user(3, "c", 30)));
}

#[test]
fn test_where_then_select() {
    let data = users(&[(1, "ann", 30), (2, "bob", 20), (3, "cid", 41)]);
    let adult = Functor::unary(user_type(), DataType::Boolean, |u| {
        Value::Bool(field(u, 2).as_i64().unwrap_or(0) > 25)
    });
    let name = Functor::unary(user_type(), DataType::Utf8, |u| field(u, 1).clone());
    let e = engine();

    let kept = e.where_(&data, &adult).expect("Where failed");
    let names = e.select(&kept, &name).expect("Select failed");
    let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
    assert_eq!(names, vec!["ann", "cid"]);
}

#[test]
fn test_column_aggregates() {
    let data = users(&[(1, "a", 30), (2, "b", 20), (3, "c", 41)]);
    let e = engine();

    let ages = e.column(&data, "Age").expect("Column failed");
    assert_eq!(ages.elem_type(), &DataType::Int32);
    assert_eq!(e.sum(&ages).expect("Sum failed"), Value::I32(91));
    assert_eq!(e.max(&ages).expect("Max failed"), Value::I32(41));
    assert_eq!(e.min(&ages).expect("Min failed"), Value::I32(20));

    let names = e.column(&data, "Name").expect("Column failed");
    assert!(matches!(e.sum(&names), Err(OpError::Shape(_))));
}

#[test]
fn test_reduce_with_json_seed() {
    let data = users(&[(1, "a", 30), (2, "b", 20)]);
    let add_age = Functor::binary(DataType::Int64, user_type(), DataType::Int64, |acc, u| {
        Value::I64(acc.as_i64().unwrap_or(0) + field(u, 2).as_i64().unwrap_or(0))
    });
    let e = engine();

    let total = e
        .reduce_json(&data, &add_age, &serde_json::json!(100))
        .expect("Reduce failed");
    assert_eq!(total, Value::I64(150));

    let same = e
        .reduce(&data, &add_age, &Value::I64(100))
        .expect("Reduce failed");
    assert_eq!(same, total);
}

#[test]
fn test_reverse_and_combine() {
    let e = engine();
    assert_eq!(e.reverse(&ints(&[1, 2, 3])).expect("Reverse failed"), ints(&[3, 2, 1]));

    let mul = Functor::binary(DataType::Int64, DataType::Int64, DataType::Int64, |a, b| {
        Value::I64(a.as_i64().unwrap_or(0) * b.as_i64().unwrap_or(0))
    });
    let product = e
        .combine(&ints(&[1, 2, 3]), &ints(&[4, 5, 6]), &mul)
        .expect("Combine failed");
    assert_eq!(product, ints(&[4, 10, 18]));

    let err = e.combine(&ints(&[1, 2, 3]), &ints(&[1, 2]), &mul).unwrap_err();
    assert!(matches!(err, OpError::Shape(ref m) if m.contains("3 != 2")));
}

#[test]
fn test_config_errors_before_output() {
    let data = users(&[(1, "a", 30)]);
    let e = engine();

    assert!(matches!(e.sort(&data, "."), Err(OpError::Config(_))));
    assert!(matches!(e.sort(&data, "Missing"), Err(OpError::Config(_))));
    assert!(matches!(e.sort(&data, "Age sideways"), Err(OpError::Config(_))));
    assert!(matches!(e.distinct(&data, "."), Err(OpError::Config(_))));
}

#[test]
fn test_empty_sequences_never_error() {
    let empty = querykit_core::types::Sequence::empty(user_type());
    let e = engine();

    assert!(e.sort(&empty, "Age").expect("Sort failed").is_empty());
    assert!(e.distinct(&empty, "Age").expect("Distinct failed").is_empty());
    assert!(e.column_map(&empty, "Name").expect("ColumnMap failed").is_empty());
    let ages = e.column(&empty, "Age").expect("Column failed");
    assert_eq!(e.sum(&ages).expect("Sum failed"), Value::I32(0));
}
