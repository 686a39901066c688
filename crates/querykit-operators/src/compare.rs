//! Comparator builder: per-kind three-way comparators and the composite
//! (lexicographic, per-key direction) comparator shared by sort, group and
//! join.
//!
//! Comparators are built before any element is read, so an unorderable key
//! fails the call up front rather than at the first comparison.

use std::cmp::Ordering;

use querykit_core::dsl::OrderSpec;
use querykit_core::schema::{DataType, Kind};
use querykit_core::types::Value;

use crate::extract::Accessor;
use crate::traits::OpError;

/// Three-way comparison of two already-extracted field values.
pub type CompareFn = fn(&Value, &Value) -> Ordering;

/// Field values of one element, in key priority order.
pub type SortKey<'a> = Vec<&'a Value>;

pub fn kind_compare(data_type: &DataType) -> Result<CompareFn, OpError> {
    match data_type.kind() {
        Kind::Bool => Ok(cmp_bool),
        Kind::Int => Ok(cmp_int),
        Kind::UInt => Ok(cmp_uint),
        Kind::Float => Ok(cmp_float),
        Kind::String => Ok(cmp_str),
        Kind::Temporal => Ok(cmp_time),
        Kind::Unorderable => Err(OpError::Config(format!("{} can not compare", data_type))),
    }
}

fn cmp_bool(a: &Value, b: &Value) -> Ordering {
    a.as_bool().cmp(&b.as_bool())
}

fn cmp_int(a: &Value, b: &Value) -> Ordering {
    a.as_i64().cmp(&b.as_i64())
}

fn cmp_uint(a: &Value, b: &Value) -> Ordering {
    a.as_u64().cmp(&b.as_u64())
}

/// Numeric order; NaN equals NaN and sorts after every number, which keeps
/// this a total order.
fn cmp_float(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => {
            if x.is_nan() && y.is_nan() {
                Ordering::Equal
            } else if x.is_nan() {
                Ordering::Greater
            } else if y.is_nan() {
                Ordering::Less
            } else {
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
        }
        (x, y) => x.is_some().cmp(&y.is_some()),
    }
}

fn cmp_str(a: &Value, b: &Value) -> Ordering {
    a.as_str().cmp(&b.as_str())
}

fn cmp_time(a: &Value, b: &Value) -> Ordering {
    match (a.as_timestamp(), b.as_timestamp()) {
        (Some(x), Some(y)) if x.happens_before(y) => Ordering::Less,
        (Some(x), Some(y)) if x.happens_after(y) => Ordering::Greater,
        (Some(_), Some(_)) => Ordering::Equal,
        (x, y) => x.is_some().cmp(&y.is_some()),
    }
}

/// One keyed component of a composite comparator.
#[derive(Clone)]
pub struct KeyComparator {
    accessor: Accessor,
    compare: CompareFn,
    descending: bool,
}

impl KeyComparator {
    pub fn new(accessor: Accessor, descending: bool) -> Result<Self, OpError> {
        let compare = kind_compare(accessor.data_type()).map_err(|_| {
            OpError::Config(format!(
                "field '{}' of type {} can not compare",
                accessor.label(),
                accessor.data_type()
            ))
        })?;
        Ok(Self {
            accessor,
            compare,
            descending,
        })
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub fn kind(&self) -> Kind {
        self.accessor.data_type().kind()
    }

    /// Compare extracted field values, direction applied.
    pub fn compare_fields(&self, a: &Value, b: &Value) -> Ordering {
        let ord = (self.compare)(a, b);
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

impl std::fmt::Debug for KeyComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyComparator")
            .field("accessor", &self.accessor)
            .field("descending", &self.descending)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Comparator {
    keys: Vec<KeyComparator>,
}

impl Comparator {
    pub fn build(elem: &DataType, spec: &OrderSpec) -> Result<Self, OpError> {
        let keys = spec
            .keys
            .iter()
            .map(|key| KeyComparator::new(Accessor::resolve(elem, &key.path)?, !key.ascending))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { keys })
    }

    pub fn parse(elem: &DataType, spec: &str) -> Result<Self, OpError> {
        Self::build(elem, &OrderSpec::parse(spec)?)
    }

    pub fn keys(&self) -> &[KeyComparator] {
        &self.keys
    }

    pub fn extract<'a>(&self, elem: &'a Value) -> Result<SortKey<'a>, OpError> {
        self.keys.iter().map(|k| k.accessor.get(elem)).collect()
    }

    pub fn extract_all<'a>(&self, values: &'a [Value]) -> Result<Vec<SortKey<'a>>, OpError> {
        values.iter().map(|v| self.extract(v)).collect()
    }

    /// First non-equal component wins; all equal means the keys tie.
    pub fn compare_keys(&self, a: &[&Value], b: &[&Value]) -> Ordering {
        for (i, key) in self.keys.iter().enumerate() {
            match key.compare_fields(a[i], b[i]) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Result<Ordering, OpError> {
        Ok(self.compare_keys(&self.extract(a)?, &self.extract(b)?))
    }
}
