//! Runtime values and homogeneous sequences.
//!
//! `Value` mirrors `DataType` one variant per type. Struct values are
//! positional: field `i` of a `Value::Struct` belongs to field `i` of the
//! matching `StructType`.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::schema::DataType;

/// Nanoseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_nanos(nanos: i64) -> Self {
        Timestamp(nanos)
    }

    pub fn nanos(self) -> i64 {
        self.0
    }

    pub fn happens_before(self, other: Timestamp) -> bool {
        self.0 < other.0
    }

    pub fn happens_after(self, other: Timestamp) -> bool {
        self.0 > other.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Timestamp(Timestamp),
    Struct(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    pub fn conforms_to(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Value::Bool(_), DataType::Boolean)
            | (Value::I8(_), DataType::Int8)
            | (Value::I16(_), DataType::Int16)
            | (Value::I32(_), DataType::Int32)
            | (Value::I64(_), DataType::Int64)
            | (Value::U8(_), DataType::UInt8)
            | (Value::U16(_), DataType::UInt16)
            | (Value::U32(_), DataType::UInt32)
            | (Value::U64(_), DataType::UInt64)
            | (Value::F32(_), DataType::Float32)
            | (Value::F64(_), DataType::Float64)
            | (Value::Str(_), DataType::Utf8)
            | (Value::Timestamp(_), DataType::Timestamp) => true,
            (Value::Struct(values), DataType::Struct(st)) => {
                values.len() == st.fields.len()
                    && values
                        .iter()
                        .zip(&st.fields)
                        .all(|(v, f)| v.conforms_to(&f.data_type))
            }
            (Value::List(values), DataType::List(elem)) => {
                values.iter().all(|v| v.conforms_to(elem))
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any signed integer, widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any unsigned integer, widened.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U8(v) => Some(*v as u64),
            Value::U16(v) => Some(*v as u64),
            Value::U32(v) => Some(*v as u64),
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&[Value]> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Build a value of `data_type` from JSON. `null` and missing struct
    /// fields become zero values; embedded structs read their fields from the
    /// enclosing object.
    pub fn from_json(data_type: &DataType, json: &Json) -> Result<Value> {
        if json.is_null() {
            return Ok(data_type.zero_value());
        }
        let mismatch = || Error::Json(format!("cannot read {} as {}", json, data_type));
        let value = match data_type {
            DataType::Boolean => Value::Bool(json.as_bool().ok_or_else(mismatch)?),
            DataType::Int8 => Value::I8(signed(json).ok_or_else(mismatch)?),
            DataType::Int16 => Value::I16(signed(json).ok_or_else(mismatch)?),
            DataType::Int32 => Value::I32(signed(json).ok_or_else(mismatch)?),
            DataType::Int64 => Value::I64(json.as_i64().ok_or_else(mismatch)?),
            DataType::UInt8 => Value::U8(unsigned(json).ok_or_else(mismatch)?),
            DataType::UInt16 => Value::U16(unsigned(json).ok_or_else(mismatch)?),
            DataType::UInt32 => Value::U32(unsigned(json).ok_or_else(mismatch)?),
            DataType::UInt64 => Value::U64(json.as_u64().ok_or_else(mismatch)?),
            DataType::Float32 => Value::F32(json.as_f64().ok_or_else(mismatch)? as f32),
            DataType::Float64 => Value::F64(json.as_f64().ok_or_else(mismatch)?),
            DataType::Utf8 => Value::Str(json.as_str().ok_or_else(mismatch)?.to_string()),
            DataType::Timestamp => {
                Value::Timestamp(Timestamp(json.as_i64().ok_or_else(mismatch)?))
            }
            DataType::Struct(st) => {
                if !json.is_object() {
                    return Err(mismatch());
                }
                let mut fields = Vec::with_capacity(st.fields.len());
                for field in &st.fields {
                    let v = if field.embedded {
                        Value::from_json(&field.data_type, json)?
                    } else {
                        match json.get(&field.name) {
                            Some(inner) => Value::from_json(&field.data_type, inner)?,
                            None => field.data_type.zero_value(),
                        }
                    };
                    fields.push(v);
                }
                Value::Struct(fields)
            }
            DataType::List(elem) => {
                let items = json.as_array().ok_or_else(mismatch)?;
                Value::List(
                    items
                        .iter()
                        .map(|item| Value::from_json(elem, item))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
        };
        Ok(value)
    }

    /// Inverse of [`Value::from_json`]. Non-finite floats become `null`.
    pub fn to_json(&self, data_type: &DataType) -> Result<Json> {
        let json = match (self, data_type) {
            (Value::Bool(b), _) => Json::Bool(*b),
            (Value::I8(v), _) => Json::from(*v),
            (Value::I16(v), _) => Json::from(*v),
            (Value::I32(v), _) => Json::from(*v),
            (Value::I64(v), _) => Json::from(*v),
            (Value::U8(v), _) => Json::from(*v),
            (Value::U16(v), _) => Json::from(*v),
            (Value::U32(v), _) => Json::from(*v),
            (Value::U64(v), _) => Json::from(*v),
            (Value::F32(v), _) => serde_json::Number::from_f64(*v as f64)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            (Value::F64(v), _) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            (Value::Str(s), _) => Json::String(s.clone()),
            (Value::Timestamp(t), _) => Json::from(t.0),
            (Value::Struct(values), DataType::Struct(st)) if values.len() == st.fields.len() => {
                let mut obj = serde_json::Map::new();
                for (v, field) in values.iter().zip(&st.fields) {
                    let inner = v.to_json(&field.data_type)?;
                    match (field.embedded, inner) {
                        (true, Json::Object(promoted)) => obj.extend(promoted),
                        (_, inner) => {
                            obj.insert(field.name.clone(), inner);
                        }
                    }
                }
                Json::Object(obj)
            }
            (Value::List(items), DataType::List(elem)) => Json::Array(
                items
                    .iter()
                    .map(|item| item.to_json(elem))
                    .collect::<Result<Vec<_>>>()?,
            ),
            _ => {
                return Err(Error::Schema(format!(
                    "value {:?} does not conform to {}",
                    self, data_type
                )))
            }
        };
        Ok(json)
    }
}

fn signed<T: TryFrom<i64>>(json: &Json) -> Option<T> {
    json.as_i64().and_then(|v| T::try_from(v).ok())
}

fn unsigned<T: TryFrom<u64>>(json: &Json) -> Option<T> {
    json.as_u64().and_then(|v| T::try_from(v).ok())
}

/// Assign a numeric order to value variants, used as the hash discriminant.
fn type_tag(v: &Value) -> u8 {
    match v {
        Value::Bool(_) => 0,
        Value::I8(_) => 1,
        Value::I16(_) => 2,
        Value::I32(_) => 3,
        Value::I64(_) => 4,
        Value::U8(_) => 5,
        Value::U16(_) => 6,
        Value::U32(_) => 7,
        Value::U64(_) => 8,
        Value::F32(_) => 9,
        Value::F64(_) => 10,
        Value::Str(_) => 11,
        Value::Timestamp(_) => 12,
        Value::Struct(_) => 13,
        Value::List(_) => 14,
    }
}

fn f32_bits(v: f32) -> u32 {
    if v == 0.0 {
        0
    } else if v.is_nan() {
        f32::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

fn f64_bits(v: f64) -> u64 {
    if v == 0.0 {
        0
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

/// Total equality: floats are equal when numerically equal or both NaN, so
/// values can key hash maps and dedup sets.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => f32_bits(*a) == f32_bits(*b),
            (Value::F64(a), Value::F64(b)) => f64_bits(*a) == f64_bits(*b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        type_tag(self).hash(state);
        match self {
            Value::Bool(v) => v.hash(state),
            Value::I8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::U8(v) => v.hash(state),
            Value::U16(v) => v.hash(state),
            Value::U32(v) => v.hash(state),
            Value::U64(v) => v.hash(state),
            Value::F32(v) => f32_bits(*v).hash(state),
            Value::F64(v) => f64_bits(*v).hash(state),
            Value::Str(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::Struct(v) | Value::List(v) => v.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Timestamp(v)
    }
}

/// An ordered, homogeneous collection. Every value conforms to `elem_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSequence")]
pub struct Sequence {
    elem_type: DataType,
    values: Vec<Value>,
}

/// Wire form of [`Sequence`]; deserialization goes through [`Sequence::new`].
#[derive(Deserialize)]
struct RawSequence {
    elem_type: DataType,
    values: Vec<Value>,
}

impl TryFrom<RawSequence> for Sequence {
    type Error = Error;

    fn try_from(raw: RawSequence) -> Result<Self> {
        Sequence::new(raw.elem_type, raw.values)
    }
}

impl Sequence {
    pub fn new(elem_type: DataType, values: Vec<Value>) -> Result<Self> {
        if let Some(pos) = values.iter().position(|v| !v.conforms_to(&elem_type)) {
            return Err(Error::Schema(format!(
                "element {} ({:?}) does not conform to {}",
                pos, values[pos], elem_type
            )));
        }
        Ok(Self { elem_type, values })
    }

    /// Skips the conformance scan; callers must only pass values produced
    /// from sequences (or checked functor results) of `elem_type`.
    pub fn new_unchecked(elem_type: DataType, values: Vec<Value>) -> Self {
        Self { elem_type, values }
    }

    pub fn empty(elem_type: DataType) -> Self {
        Self {
            elem_type,
            values: Vec::new(),
        }
    }

    /// Read a JSON array of elements.
    pub fn from_json(elem_type: DataType, json: &Json) -> Result<Self> {
        let items = json
            .as_array()
            .ok_or_else(|| Error::Json(format!("expected a JSON array of {}", elem_type)))?;
        let values = items
            .iter()
            .map(|item| Value::from_json(&elem_type, item))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { elem_type, values })
    }

    pub fn to_json(&self) -> Result<Json> {
        Ok(Json::Array(
            self.values
                .iter()
                .map(|v| v.to_json(&self.elem_type))
                .collect::<Result<Vec<_>>>()?,
        ))
    }

    pub fn elem_type(&self) -> &DataType {
        &self.elem_type
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Structural shape descriptor of the sequence type, e.g.
    /// `[]User{UserId:i64,Name:string}`.
    pub fn shape(&self) -> String {
        format!("[]{}", self.elem_type.shape())
    }
}
