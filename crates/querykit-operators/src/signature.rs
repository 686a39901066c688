//! Type signatures: the registry key derived from an operator call's shapes.
//!
//! Each shape descriptor is length-prefixed before concatenation, so two
//! different descriptor lists can never produce the same key regardless of
//! what characters the descriptors (e.g. literal order specs) contain.

use std::fmt;

use querykit_core::hash::{hash_str, Hash256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeSignature(String);

impl TypeSignature {
    pub fn from_shapes<I, S>(shapes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut key = String::new();
        for shape in shapes {
            let shape = shape.as_ref();
            key.push_str(&shape.len().to_string());
            key.push(':');
            key.push_str(shape);
        }
        TypeSignature(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable digest for logs.
    pub fn fingerprint(&self) -> Hash256 {
        hash_str(&self.0)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
