//! Column projection and key → element maps.

use std::collections::HashMap;

use querykit_core::types::{Sequence, Value};

use crate::extract::Accessor;
use crate::traits::OpError;

/// One field per element, order preserved.
pub fn column(data: &Sequence, field: &str) -> Result<Sequence, OpError> {
    let acc = Accessor::parse(data.elem_type(), field)?;
    let values = data
        .iter()
        .map(|v| acc.get(v).cloned())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Sequence::new_unchecked(acc.data_type().clone(), values))
}

/// Map each distinct field value to its element. Among duplicates the
/// element with the lowest index wins.
pub fn column_map(data: &Sequence, field: &str) -> Result<HashMap<Value, Value>, OpError> {
    let acc = Accessor::parse(data.elem_type(), field)?;
    let mut out = HashMap::with_capacity(data.len());
    // Walk backwards so earlier elements overwrite later ones.
    for v in data.values().iter().rev() {
        out.insert(acc.get(v)?.clone(), v.clone());
    }
    Ok(out)
}
