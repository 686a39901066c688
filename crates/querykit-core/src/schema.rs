//! Runtime type model. Pure data; the operators only ever inspect elements
//! through these descriptions.
//!
//! The `types.rs` module contains the matching `Value`/`Sequence` containers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Utf8,
    Timestamp,
    Struct(StructType),
    List(Box<DataType>),
}

/// Orderability classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Bool,
    Int,
    UInt,
    Float,
    String,
    Temporal,
    Unorderable,
}

impl Kind {
    pub fn is_orderable(self) -> bool {
        self != Kind::Unorderable
    }
}

impl DataType {
    pub fn list_of(elem: DataType) -> Self {
        DataType::List(Box::new(elem))
    }

    pub fn kind(&self) -> Kind {
        match self {
            DataType::Boolean => Kind::Bool,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => Kind::Int,
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
                Kind::UInt
            }
            DataType::Float32 | DataType::Float64 => Kind::Float,
            DataType::Utf8 => Kind::String,
            DataType::Timestamp => Kind::Temporal,
            DataType::Struct(_) | DataType::List(_) => Kind::Unorderable,
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            DataType::Struct(st) => Some(st),
            _ => None,
        }
    }

    pub fn list_elem(&self) -> Option<&DataType> {
        match self {
            DataType::List(elem) => Some(elem),
            _ => None,
        }
    }

    /// The value a freshly declared variable of this type holds.
    pub fn zero_value(&self) -> Value {
        match self {
            DataType::Boolean => Value::Bool(false),
            DataType::Int8 => Value::I8(0),
            DataType::Int16 => Value::I16(0),
            DataType::Int32 => Value::I32(0),
            DataType::Int64 => Value::I64(0),
            DataType::UInt8 => Value::U8(0),
            DataType::UInt16 => Value::U16(0),
            DataType::UInt32 => Value::U32(0),
            DataType::UInt64 => Value::U64(0),
            DataType::Float32 => Value::F32(0.0),
            DataType::Float64 => Value::F64(0.0),
            DataType::Utf8 => Value::Str(String::new()),
            DataType::Timestamp => Value::Timestamp(Timestamp::default()),
            DataType::Struct(st) => {
                Value::Struct(st.fields.iter().map(|f| f.data_type.zero_value()).collect())
            }
            DataType::List(_) => Value::List(Vec::new()),
        }
    }

    /// Structural shape descriptor used in type signatures. Structs carry
    /// their field layout, so two types sharing a name but not a layout never
    /// share a descriptor: `User{UserId:i64,Name:string}`, `[]i64`.
    /// Embedded fields are written as the bare embedded shape.
    pub fn shape(&self) -> String {
        let mut out = String::new();
        self.write_shape(&mut out);
        out
    }

    fn write_shape(&self, out: &mut String) {
        match self {
            DataType::Struct(st) => {
                out.push_str(&st.name);
                out.push('{');
                for (i, field) in st.fields.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if !field.embedded {
                        out.push_str(&field.name);
                        out.push(':');
                    }
                    field.data_type.write_shape(out);
                }
                out.push('}');
            }
            DataType::List(elem) => {
                out.push_str("[]");
                elem.write_shape(out);
            }
            other => out.push_str(&other.to_string()),
        }
    }
}

/// Display name used in messages: `i64`, `string`, `User`, `[]User`.
impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => f.write_str("bool"),
            DataType::Int8 => f.write_str("i8"),
            DataType::Int16 => f.write_str("i16"),
            DataType::Int32 => f.write_str("i32"),
            DataType::Int64 => f.write_str("i64"),
            DataType::UInt8 => f.write_str("u8"),
            DataType::UInt16 => f.write_str("u16"),
            DataType::UInt32 => f.write_str("u32"),
            DataType::UInt64 => f.write_str("u64"),
            DataType::Float32 => f.write_str("f32"),
            DataType::Float64 => f.write_str("f64"),
            DataType::Utf8 => f.write_str("string"),
            DataType::Timestamp => f.write_str("time"),
            DataType::Struct(st) => f.write_str(&st.name),
            DataType::List(elem) => write!(f, "[]{}", elem),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    /// Anonymous composition: the embedded struct's fields are promoted into
    /// the outer struct for name lookup.
    pub embedded: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            embedded: false,
        }
    }

    /// Embed `inner`; the field takes the embedded type's name.
    pub fn embedded(inner: StructType) -> Self {
        Self {
            name: inner.name.clone(),
            data_type: DataType::Struct(inner),
            embedded: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<Field>,
}

impl StructType {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    /// Direct (non-promoted) lookup.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl From<StructType> for DataType {
    fn from(st: StructType) -> Self {
        DataType::Struct(st)
    }
}
