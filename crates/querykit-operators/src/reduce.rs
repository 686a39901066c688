//! Reduce family: left fold plus the numeric folds built on it (sum, max,
//! min), and the two order-only operators reverse and combine.

use querykit_core::schema::DataType;
use querykit_core::types::{Sequence, Value};

use crate::functor::Functor;
use crate::traits::OpError;

/// Strict left fold: `acc = step(acc, x)` for every element in order.
pub fn reduce(data: &Sequence, step: &Functor, seed: &Value) -> Result<Value, OpError> {
    let acc_type = step.ty().params.first().cloned().ok_or_else(|| {
        OpError::Config(format!("reduce: functor {} takes no accumulator", step.ty()))
    })?;
    step.expect_binary("reduce", &acc_type, data.elem_type())?;
    step.expect_ret("reduce", &acc_type)?;
    if !seed.conforms_to(&acc_type) {
        return Err(OpError::Config(format!(
            "reduce: seed {:?} is not a {}",
            seed, acc_type
        )));
    }

    let mut acc = seed.clone();
    for v in data.iter() {
        acc = step.call2(&acc, v)?;
    }
    Ok(acc)
}

pub fn sum(data: &Sequence) -> Result<Value, OpError> {
    let t = numeric_elem(data)?;
    let step = Functor::binary(t.clone(), t.clone(), t.clone(), add);
    reduce(data, &step, &t.zero_value())
}

pub fn max(data: &Sequence) -> Result<Value, OpError> {
    let t = numeric_elem(data)?;
    let seed = lowest(&t);
    let step = Functor::binary(t.clone(), t.clone(), t, |acc, x| {
        if greater(x, acc) {
            x.clone()
        } else {
            acc.clone()
        }
    });
    reduce(data, &step, &seed)
}

pub fn min(data: &Sequence) -> Result<Value, OpError> {
    let t = numeric_elem(data)?;
    let seed = highest(&t);
    let step = Functor::binary(t.clone(), t.clone(), t, |acc, x| {
        if greater(acc, x) {
            x.clone()
        } else {
            acc.clone()
        }
    });
    reduce(data, &step, &seed)
}

pub fn reverse(data: &Sequence) -> Sequence {
    let values = data.values().iter().rev().cloned().collect();
    Sequence::new_unchecked(data.elem_type().clone(), values)
}

/// Elementwise zip of two equally long sequences through `f: (T, U) -> R`.
pub fn combine(left: &Sequence, right: &Sequence, f: &Functor) -> Result<Sequence, OpError> {
    f.expect_binary("combine", left.elem_type(), right.elem_type())?;
    if left.len() != right.len() {
        return Err(OpError::Shape(format!(
            "len does not equal {} != {}",
            left.len(),
            right.len()
        )));
    }

    let out = left
        .iter()
        .zip(right.iter())
        .map(|(l, r)| f.call2(l, r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Sequence::new_unchecked(f.ret().clone(), out))
}

fn numeric_elem(data: &Sequence) -> Result<DataType, OpError> {
    match data.elem_type() {
        t @ (DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64) => Ok(t.clone()),
        other => Err(OpError::Shape(format!("invalid type {}", other))),
    }
}

fn lowest(t: &DataType) -> Value {
    match t {
        DataType::Int8 => Value::I8(i8::MIN),
        DataType::Int16 => Value::I16(i16::MIN),
        DataType::Int32 => Value::I32(i32::MIN),
        DataType::Float32 => Value::F32(f32::NEG_INFINITY),
        DataType::Float64 => Value::F64(f64::NEG_INFINITY),
        _ => Value::I64(i64::MIN),
    }
}

fn highest(t: &DataType) -> Value {
    match t {
        DataType::Int8 => Value::I8(i8::MAX),
        DataType::Int16 => Value::I16(i16::MAX),
        DataType::Int32 => Value::I32(i32::MAX),
        DataType::Float32 => Value::F32(f32::INFINITY),
        DataType::Float64 => Value::F64(f64::INFINITY),
        _ => Value::I64(i64::MAX),
    }
}

/// Integer sums wrap within their width.
fn add(acc: &Value, x: &Value) -> Value {
    match (acc, x) {
        (Value::I8(a), Value::I8(b)) => Value::I8(a.wrapping_add(*b)),
        (Value::I16(a), Value::I16(b)) => Value::I16(a.wrapping_add(*b)),
        (Value::I32(a), Value::I32(b)) => Value::I32(a.wrapping_add(*b)),
        (Value::I64(a), Value::I64(b)) => Value::I64(a.wrapping_add(*b)),
        (Value::F32(a), Value::F32(b)) => Value::F32(a + b),
        (Value::F64(a), Value::F64(b)) => Value::F64(a + b),
        // reduce() has already checked both sides against the element type
        _ => acc.clone(),
    }
}

/// `a > b`; false whenever either side is NaN.
fn greater(a: &Value, b: &Value) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x > y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x > y,
            _ => false,
        },
    }
}
