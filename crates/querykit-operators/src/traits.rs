//! Error type and the operand/output envelopes shared by the generic
//! operators and registered specializations.
//!
//! A specialization handler sees exactly the operands the caller passed, in
//! call order, and must produce the same `Output` variant the generic
//! operator would.

use std::collections::HashMap;

use querykit_core::error::Error as CoreError;
use querykit_core::types::{Sequence, Value};

use thiserror::Error;

use crate::functor::Functor;
use crate::registry::OperatorName;

#[derive(Debug, Error)]
pub enum OpError {
    /// Programmer errors: bad field paths, unorderable keys, malformed
    /// spec strings, functor arity/type mismatches, late registration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("schema error: {0}")]
    Schema(String),

    /// Length mismatches and element types an operator does not support.
    #[error("shape error: {0}")]
    Shape(String),

    #[error("specialization error: {0}")]
    Specialization(String),
}

impl From<CoreError> for OpError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Config(m) | CoreError::Json(m) => OpError::Config(m),
            CoreError::Schema(m) | CoreError::Invariant(m) => OpError::Schema(m),
            CoreError::Shape(m) => OpError::Shape(m),
        }
    }
}

/// One argument of an operator call.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Sequence(&'a Sequence),
    Functor(&'a Functor),
    /// Literal configuration string (order spec, join spec, placement, column).
    Text(&'a str),
    /// Reduce seed. Data, not shape: it does not contribute to signatures.
    Seed(&'a Value),
}

impl<'a> Operand<'a> {
    /// Shape descriptor for signature computation.
    pub fn shape(&self) -> Option<String> {
        match self {
            Operand::Sequence(seq) => Some(seq.shape()),
            Operand::Functor(f) => Some(f.shape()),
            Operand::Text(s) => Some((*s).to_string()),
            Operand::Seed(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Result<&'a Sequence, OpError> {
        match self {
            Operand::Sequence(seq) => Ok(seq),
            other => Err(operand_mismatch("sequence", other)),
        }
    }

    pub fn as_functor(&self) -> Result<&'a Functor, OpError> {
        match self {
            Operand::Functor(f) => Ok(f),
            other => Err(operand_mismatch("functor", other)),
        }
    }

    pub fn as_text(&self) -> Result<&'a str, OpError> {
        match self {
            Operand::Text(s) => Ok(s),
            other => Err(operand_mismatch("text", other)),
        }
    }

    pub fn as_seed(&self) -> Result<&'a Value, OpError> {
        match self {
            Operand::Seed(v) => Ok(v),
            other => Err(operand_mismatch("seed", other)),
        }
    }
}

fn operand_mismatch(expected: &str, got: &Operand<'_>) -> OpError {
    OpError::Specialization(format!("expected {} operand, got {:?}", expected, got))
}

/// Result of one operator call.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Sequence(Sequence),
    Map(HashMap<Value, Value>),
    Value(Value),
}

impl Output {
    pub fn into_sequence(self, op: OperatorName) -> Result<Sequence, OpError> {
        match self {
            Output::Sequence(seq) => Ok(seq),
            other => Err(output_mismatch(op, "sequence", &other)),
        }
    }

    pub fn into_map(self, op: OperatorName) -> Result<HashMap<Value, Value>, OpError> {
        match self {
            Output::Map(map) => Ok(map),
            other => Err(output_mismatch(op, "map", &other)),
        }
    }

    pub fn into_value(self, op: OperatorName) -> Result<Value, OpError> {
        match self {
            Output::Value(v) => Ok(v),
            other => Err(output_mismatch(op, "value", &other)),
        }
    }

    fn variant(&self) -> &'static str {
        match self {
            Output::Sequence(_) => "sequence",
            Output::Map(_) => "map",
            Output::Value(_) => "value",
        }
    }
}

fn output_mismatch(op: OperatorName, expected: &str, got: &Output) -> OpError {
    OpError::Specialization(format!(
        "{} handler returned a {}, expected a {}",
        op.name(),
        got.variant(),
        expected
    ))
}
