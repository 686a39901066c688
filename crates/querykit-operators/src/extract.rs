//! Field extraction: resolve a `FieldPath` against an element type once,
//! then read (or write) that field on any element of the type.
//!
//! Named segments use promoted-field lookup: a struct's own fields first,
//! then the fields of its embedded structs, breadth-first by depth. The
//! shallowest depth with a match must have exactly one match.

use querykit_core::dsl::FieldPath;
use querykit_core::schema::{DataType, StructType};
use querykit_core::types::Value;

use crate::traits::OpError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    /// Positional indices into nested `Value::Struct`s; empty for `.`.
    path: Vec<usize>,
    data_type: DataType,
    label: String,
}

impl Accessor {
    pub fn resolve(elem: &DataType, path: &FieldPath) -> Result<Self, OpError> {
        let segments = match path {
            FieldPath::Whole => {
                return Ok(Self {
                    path: Vec::new(),
                    data_type: elem.clone(),
                    label: ".".into(),
                })
            }
            FieldPath::Named(segments) => segments,
        };

        let mut indices = Vec::new();
        let mut current = elem.clone();
        for name in segments {
            let st = current.as_struct().ok_or_else(|| {
                OpError::Config(format!("{} has no field {} (not a struct)", current, name))
            })?;
            let (found, field_type) = lookup_promoted(st, name)?;
            indices.extend(found);
            current = field_type;
        }
        Ok(Self {
            path: indices,
            data_type: current,
            label: path.to_string(),
        })
    }

    pub fn parse(elem: &DataType, path: &str) -> Result<Self, OpError> {
        Self::resolve(elem, &FieldPath::parse(path)?)
    }

    /// Type of the extracted field.
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_whole(&self) -> bool {
        self.path.is_empty()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get<'a>(&self, elem: &'a Value) -> Result<&'a Value, OpError> {
        let mut cur = elem;
        for &idx in &self.path {
            cur = cur
                .as_struct()
                .and_then(|fields| fields.get(idx))
                .ok_or_else(|| self.broken(elem))?;
        }
        Ok(cur)
    }

    /// Overwrite the field in `elem` with `value`.
    pub fn set(&self, elem: &mut Value, value: Value) -> Result<(), OpError> {
        let mut cur = elem;
        for &idx in &self.path {
            cur = match cur {
                Value::Struct(fields) => fields.get_mut(idx),
                _ => None,
            }
            .ok_or_else(|| {
                OpError::Schema(format!("cannot assign field '{}': shape mismatch", self.label))
            })?;
        }
        *cur = value;
        Ok(())
    }

    fn broken(&self, elem: &Value) -> OpError {
        OpError::Schema(format!(
            "element {:?} has no field '{}' of type {}",
            elem, self.label, self.data_type
        ))
    }
}

type Candidate<'a> = (Vec<usize>, &'a StructType);

fn lookup_promoted(st: &StructType, name: &str) -> Result<(Vec<usize>, DataType), OpError> {
    let mut level: Vec<Candidate<'_>> = vec![(Vec::new(), st)];
    while !level.is_empty() {
        let mut matches: Vec<(Vec<usize>, &DataType)> = Vec::new();
        let mut next: Vec<Candidate<'_>> = Vec::new();
        for (prefix, current) in level.drain(..) {
            for (i, field) in current.fields.iter().enumerate() {
                let mut path = prefix.clone();
                path.push(i);
                if field.name == name {
                    matches.push((path.clone(), &field.data_type));
                }
                if field.embedded {
                    if let DataType::Struct(inner) = &field.data_type {
                        next.push((path, inner));
                    }
                }
            }
        }
        match matches.len() {
            0 => level = next,
            1 => {
                let (path, dt) = matches.remove(0);
                return Ok((path, dt.clone()));
            }
            _ => {
                return Err(OpError::Config(format!(
                    "{} has ambiguous field {}",
                    st.name, name
                )))
            }
        }
    }
    Err(OpError::Config(format!("{} has not name {}", st.name, name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use querykit_core::schema::Field;

    fn audit() -> StructType {
        StructType::new(
            "Audit",
            vec![
                Field::new("Version", DataType::Int32),
                Field::new("Remark", DataType::Utf8),
            ],
        )
    }

    fn meta() -> StructType {
        StructType::new(
            "Meta",
            vec![
                Field::new("Remark", DataType::Utf8),
                Field::new("Owner", DataType::Utf8),
            ],
        )
    }

    fn address() -> StructType {
        StructType::new("Address", vec![Field::new("City", DataType::Utf8)])
    }

    fn order() -> DataType {
        DataType::Struct(StructType::new(
            "Order",
            vec![
                Field::new("OrderId", DataType::Int64),
                Field::new("Version", DataType::UInt8),
                Field::embedded(audit()),
                Field::embedded(meta()),
                Field::new("Ship", DataType::Struct(address())),
            ],
        ))
    }

    fn sample() -> Value {
        Value::Struct(vec![
            Value::I64(9),
            Value::U8(2),
            Value::Struct(vec![Value::I32(5), Value::Str("audit".into())]),
            Value::Struct(vec![Value::Str("meta".into()), Value::Str("ann".into())]),
            Value::Struct(vec![Value::Str("Shenzhen".into())]),
        ])
    }

    #[test]
    fn shallow_field_shadows_promoted_one() {
        let acc = Accessor::parse(&order(), "Version").expect("resolve");
        assert_eq!(acc.data_type(), &DataType::UInt8);
        assert_eq!(acc.get(&sample()).unwrap(), &Value::U8(2));
    }

    #[test]
    fn promoted_field_is_found_through_embedding() {
        let acc = Accessor::parse(&order(), "Owner").expect("resolve");
        assert_eq!(acc.get(&sample()).unwrap(), &Value::Str("ann".into()));
    }

    #[test]
    fn same_depth_duplicates_are_ambiguous() {
        let err = Accessor::parse(&order(), "Remark").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn missing_name_is_a_config_error() {
        let err = Accessor::parse(&order(), "Nope").unwrap_err();
        assert!(matches!(err, OpError::Config(_)));
    }

    #[test]
    fn dotted_path_walks_nested_structs() {
        let acc = Accessor::parse(&order(), "Ship.City").expect("resolve");
        assert_eq!(acc.data_type(), &DataType::Utf8);
        assert_eq!(acc.get(&sample()).unwrap(), &Value::Str("Shenzhen".into()));
        assert!(Accessor::parse(&order(), "OrderId.City").is_err());
    }

    #[test]
    fn whole_element_and_set() {
        let whole = Accessor::parse(&DataType::Int64, ".").expect("resolve");
        assert!(whole.is_whole());
        assert_eq!(whole.get(&Value::I64(4)).unwrap(), &Value::I64(4));

        let acc = Accessor::parse(&order(), "Owner").expect("resolve");
        let mut target = order().zero_value();
        acc.set(&mut target, Value::Str("bob".into())).unwrap();
        assert_eq!(acc.get(&target).unwrap(), &Value::Str("bob".into()));
    }
}
