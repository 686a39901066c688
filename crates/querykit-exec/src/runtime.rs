//! Runtime: route every operator call through the specialization registry.
//!
//! Behavior per call:
//! - Specializations disabled in `EngineConfig`: run the generic operator.
//! - Otherwise compute the `TypeSignature` of the operand shapes and look it
//!   up under the operator's name. A hit runs the handler; a miss runs the
//!   generic operator.
//! - A handler's output must have the result type the generic operator would
//!   produce (element type and every value), or the call fails.
//! - With `verify_specializations`, a hit also runs the generic operator and
//!   the call fails if the two results differ.

use std::collections::HashMap;
use std::fmt;

use querykit_core::config::EngineConfig;
use querykit_core::schema::DataType;
use querykit_core::types::{Sequence, Value};

use querykit_operators::registry::{self, OperatorName, SpecializationRegistry};
use querykit_operators::{
    column, distinct, filter, group, join, reduce, select, sort, Accessor, Functor, OpError,
    Operand, Output, TypeSignature,
};

use crate::metrics::{emit_span, DispatchStats};

enum Registry {
    /// The sealed process registry (sealed on first use).
    Global,
    Owned(SpecializationRegistry),
}

/// Result type a handler has to produce for one call.
#[derive(Debug)]
enum Contract {
    Sequence(DataType),
    Map { key: DataType, value: DataType },
    Value(DataType),
}

impl Contract {
    fn check(&self, op: OperatorName, out: &Output) -> Result<(), OpError> {
        let conforms = match (self, out) {
            (Contract::Sequence(t), Output::Sequence(seq)) => {
                seq.elem_type() == t && seq.iter().all(|v| v.conforms_to(t))
            }
            (Contract::Map { key, value }, Output::Map(map)) => map
                .iter()
                .all(|(k, v)| k.conforms_to(key) && v.conforms_to(value)),
            (Contract::Value(t), Output::Value(v)) => v.conforms_to(t),
            // variant mismatches are reported by `Output::into_*`
            _ => true,
        };
        if !conforms {
            return Err(OpError::Specialization(format!(
                "{} handler output does not conform to {}",
                op, self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contract::Sequence(t) => write!(f, "[]{}", t),
            Contract::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Contract::Value(t) => write!(f, "{}", t),
        }
    }
}

pub struct Engine {
    cfg: EngineConfig,
    registry: Registry,
    stats: DispatchStats,
}

impl Engine {
    /// Engine backed by the process-wide registry.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            registry: Registry::Global,
            stats: DispatchStats::new(),
        }
    }

    /// Engine backed by an explicitly built registry; the process registry
    /// is never consulted (or sealed).
    pub fn with_registry(cfg: EngineConfig, registry: SpecializationRegistry) -> Self {
        Self {
            cfg,
            registry: Registry::Owned(registry),
            stats: DispatchStats::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    fn registry(&self) -> &SpecializationRegistry {
        match &self.registry {
            Registry::Global => registry::global(),
            Registry::Owned(r) => r,
        }
    }

    /// `contract` is only evaluated on a hit.
    fn dispatch<C, G>(
        &self,
        op: OperatorName,
        operands: &[Operand<'_>],
        contract: C,
        generic: G,
    ) -> Result<Output, OpError>
    where
        C: FnOnce() -> Result<Contract, OpError>,
        G: Fn() -> Result<Output, OpError>,
    {
        if !self.cfg.specializations_enabled {
            self.stats.record_bypass();
            return generic();
        }

        let signature = TypeSignature::from_shapes(operands.iter().filter_map(Operand::shape));
        let handler = match self.registry().lookup(op, &signature) {
            Some(h) => h,
            None => {
                self.stats.record_miss();
                emit_span(
                    "dispatch.miss",
                    &[
                        ("op", op.name().to_string()),
                        ("signature", signature.fingerprint().short_hex()),
                    ],
                );
                return generic();
            }
        };

        self.stats.record_hit();
        #[cfg(feature = "tracing")]
        tracing::debug!(op = %op, signature = %signature, "specialization hit");

        let fast = handler(operands)?;
        contract()?.check(op, &fast)?;
        if self.cfg.verify_specializations {
            let reference = generic()?;
            if fast != reference {
                return Err(OpError::Specialization(format!(
                    "{} specialization for [{}] diverged from the generic result",
                    op, signature
                )));
            }
            self.stats.record_verified();
        }
        Ok(fast)
    }

    pub fn select(&self, data: &Sequence, f: &Functor) -> Result<Sequence, OpError> {
        let op = OperatorName::Select;
        self.dispatch(
            op,
            &[Operand::Sequence(data), Operand::Functor(f)],
            || Ok(Contract::Sequence(f.ret().clone())),
            || select::select(data, f).map(Output::Sequence),
        )?
        .into_sequence(op)
    }

    /// Keep the elements `predicate` maps to `true`.
    pub fn where_(&self, data: &Sequence, predicate: &Functor) -> Result<Sequence, OpError> {
        let op = OperatorName::Where;
        self.dispatch(
            op,
            &[Operand::Sequence(data), Operand::Functor(predicate)],
            || Ok(Contract::Sequence(data.elem_type().clone())),
            || filter::filter(data, predicate).map(Output::Sequence),
        )?
        .into_sequence(op)
    }

    pub fn sort(&self, data: &Sequence, order: &str) -> Result<Sequence, OpError> {
        let op = OperatorName::Sort;
        self.dispatch(
            op,
            &[Operand::Sequence(data), Operand::Text(order)],
            || Ok(Contract::Sequence(data.elem_type().clone())),
            || sort::sort(data, order).map(Output::Sequence),
        )?
        .into_sequence(op)
    }

    pub fn group(&self, data: &Sequence, order: &str, f: &Functor) -> Result<Sequence, OpError> {
        let op = OperatorName::Group;
        // List-returning aggregations are flattened
        let out_type = match f.ret() {
            DataType::List(elem) => elem.as_ref(),
            other => other,
        };
        self.dispatch(
            op,
            &[Operand::Sequence(data), Operand::Text(order), Operand::Functor(f)],
            || Ok(Contract::Sequence(out_type.clone())),
            || group::group(data, order, f).map(Output::Sequence),
        )?
        .into_sequence(op)
    }

    pub fn join(
        &self,
        left: &Sequence,
        right: &Sequence,
        placement: &str,
        on: &str,
        f: &Functor,
    ) -> Result<Sequence, OpError> {
        let op = OperatorName::Join;
        self.dispatch(
            op,
            &[
                Operand::Sequence(left),
                Operand::Sequence(right),
                Operand::Text(placement),
                Operand::Text(on),
                Operand::Functor(f),
            ],
            || Ok(Contract::Sequence(f.ret().clone())),
            || join::join(left, right, placement, on, f).map(Output::Sequence),
        )?
        .into_sequence(op)
    }

    pub fn left_join(
        &self,
        left: &Sequence,
        right: &Sequence,
        on: &str,
        f: &Functor,
    ) -> Result<Sequence, OpError> {
        self.join(left, right, "left", on, f)
    }

    pub fn right_join(
        &self,
        left: &Sequence,
        right: &Sequence,
        on: &str,
        f: &Functor,
    ) -> Result<Sequence, OpError> {
        self.join(left, right, "right", on, f)
    }

    pub fn inner_join(
        &self,
        left: &Sequence,
        right: &Sequence,
        on: &str,
        f: &Functor,
    ) -> Result<Sequence, OpError> {
        self.join(left, right, "inner", on, f)
    }

    pub fn outer_join(
        &self,
        left: &Sequence,
        right: &Sequence,
        on: &str,
        f: &Functor,
    ) -> Result<Sequence, OpError> {
        self.join(left, right, "outer", on, f)
    }

    pub fn column(&self, data: &Sequence, field: &str) -> Result<Sequence, OpError> {
        let op = OperatorName::Column;
        self.dispatch(
            op,
            &[Operand::Sequence(data), Operand::Text(field)],
            || {
                let acc = Accessor::parse(data.elem_type(), field)?;
                Ok(Contract::Sequence(acc.data_type().clone()))
            },
            || column::column(data, field).map(Output::Sequence),
        )?
        .into_sequence(op)
    }

    pub fn column_map(
        &self,
        data: &Sequence,
        field: &str,
    ) -> Result<HashMap<Value, Value>, OpError> {
        let op = OperatorName::ColumnMap;
        self.dispatch(
            op,
            &[Operand::Sequence(data), Operand::Text(field)],
            || {
                let acc = Accessor::parse(data.elem_type(), field)?;
                Ok(Contract::Map {
                    key: acc.data_type().clone(),
                    value: data.elem_type().clone(),
                })
            },
            || column::column_map(data, field).map(Output::Map),
        )?
        .into_map(op)
    }

    pub fn distinct(&self, data: &Sequence, columns: &str) -> Result<Sequence, OpError> {
        let op = OperatorName::Distinct;
        self.dispatch(
            op,
            &[Operand::Sequence(data), Operand::Text(columns)],
            || Ok(Contract::Sequence(data.elem_type().clone())),
            || distinct::distinct(data, columns).map(Output::Sequence),
        )?
        .into_sequence(op)
    }

    pub fn reduce(&self, data: &Sequence, step: &Functor, seed: &Value) -> Result<Value, OpError> {
        let op = OperatorName::Reduce;
        self.dispatch(
            op,
            &[Operand::Sequence(data), Operand::Functor(step), Operand::Seed(seed)],
            || Ok(Contract::Value(step.ret().clone())),
            || reduce::reduce(data, step, seed).map(Output::Value),
        )?
        .into_value(op)
    }

    /// `reduce` with the seed given as JSON, decoded as the accumulator type.
    pub fn reduce_json(
        &self,
        data: &Sequence,
        step: &Functor,
        seed: &serde_json::Value,
    ) -> Result<Value, OpError> {
        let acc_type = step.ty().params.first().ok_or_else(|| {
            OpError::Config(format!("reduce: functor {} takes no accumulator", step.ty()))
        })?;
        let seed = Value::from_json(acc_type, seed)?;
        self.reduce(data, step, &seed)
    }

    pub fn sum(&self, data: &Sequence) -> Result<Value, OpError> {
        self.fold(OperatorName::Sum, data, reduce::sum)
    }

    pub fn max(&self, data: &Sequence) -> Result<Value, OpError> {
        self.fold(OperatorName::Max, data, reduce::max)
    }

    pub fn min(&self, data: &Sequence) -> Result<Value, OpError> {
        self.fold(OperatorName::Min, data, reduce::min)
    }

    fn fold(
        &self,
        op: OperatorName,
        data: &Sequence,
        generic: fn(&Sequence) -> Result<Value, OpError>,
    ) -> Result<Value, OpError> {
        self.dispatch(
            op,
            &[Operand::Sequence(data)],
            || Ok(Contract::Value(data.elem_type().clone())),
            || generic(data).map(Output::Value),
        )?
        .into_value(op)
    }

    pub fn reverse(&self, data: &Sequence) -> Result<Sequence, OpError> {
        let op = OperatorName::Reverse;
        self.dispatch(
            op,
            &[Operand::Sequence(data)],
            || Ok(Contract::Sequence(data.elem_type().clone())),
            || Ok(Output::Sequence(reduce::reverse(data))),
        )?
        .into_sequence(op)
    }

    pub fn combine(
        &self,
        left: &Sequence,
        right: &Sequence,
        f: &Functor,
    ) -> Result<Sequence, OpError> {
        let op = OperatorName::Combine;
        self.dispatch(
            op,
            &[Operand::Sequence(left), Operand::Sequence(right), Operand::Functor(f)],
            || Ok(Contract::Sequence(f.ret().clone())),
            || reduce::combine(left, right, f).map(Output::Sequence),
        )?
        .into_sequence(op)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
