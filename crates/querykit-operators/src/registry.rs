//! Specialization registry: `(operator, type signature) -> handler`.
//!
//! Handlers are precompiled, type-specific operator implementations emitted
//! by an external code generator. They are registered during process
//! initialization; the first call to [`global`] seals the process registry
//! and every lookup afterwards is a lock-free read. Registering after that
//! point is an error.
//!
//! Embedders that do not want process-wide state build their own
//! [`SpecializationRegistry`] with a [`RegistryBuilder`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};

use crate::signature::TypeSignature;
use crate::traits::{OpError, Operand, Output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperatorName {
    Select,
    Where,
    Sort,
    Group,
    Join,
    Column,
    ColumnMap,
    Distinct,
    Reduce,
    Sum,
    Max,
    Min,
    Reverse,
    Combine,
}

impl OperatorName {
    /// Human-readable operator name (stable).
    pub fn name(&self) -> &'static str {
        match self {
            OperatorName::Select => "select",
            OperatorName::Where => "where",
            OperatorName::Sort => "sort",
            OperatorName::Group => "group",
            OperatorName::Join => "join",
            OperatorName::Column => "column",
            OperatorName::ColumnMap => "column_map",
            OperatorName::Distinct => "distinct",
            OperatorName::Reduce => "reduce",
            OperatorName::Sum => "sum",
            OperatorName::Max => "max",
            OperatorName::Min => "min",
            OperatorName::Reverse => "reverse",
            OperatorName::Combine => "combine",
        }
    }
}

impl fmt::Display for OperatorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A specialization. Receives the call's operands in call order and must
/// return what the generic operator would.
pub type Handler = Arc<dyn Fn(&[Operand<'_>]) -> Result<Output, OpError> + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&[Operand<'_>]) -> Result<Output, OpError> + Send + Sync + 'static,
{
    Arc::new(f)
}

type Table = HashMap<OperatorName, HashMap<TypeSignature, Handler>>;

#[derive(Default)]
pub struct RegistryBuilder {
    entries: Table,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the signature of `shapes`. Returns false (and keeps the
    /// existing handler) if the pair is already registered.
    pub fn register(&mut self, op: OperatorName, shapes: &[&str], handler: Handler) -> bool {
        self.register_signature(op, TypeSignature::from_shapes(shapes), handler)
    }

    pub fn register_signature(
        &mut self,
        op: OperatorName,
        signature: TypeSignature,
        handler: Handler,
    ) -> bool {
        match self.entries.entry(op).or_default().entry(signature) {
            Entry::Occupied(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    op = %op,
                    signature = %_e.key().fingerprint().short_hex(),
                    "duplicate specialization ignored"
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(handler);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn build(self) -> SpecializationRegistry {
        SpecializationRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable lookup table.
#[derive(Default)]
pub struct SpecializationRegistry {
    entries: Table,
}

impl SpecializationRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lookup(&self, op: OperatorName, signature: &TypeSignature) -> Option<&Handler> {
        self.entries.get(&op)?.get(signature)
    }

    pub fn contains(&self, op: OperatorName, signature: &TypeSignature) -> bool {
        self.lookup(op, signature).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SpecializationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecializationRegistry")
            .field("entries", &self.len())
            .finish()
    }
}

struct Pending {
    builder: RegistryBuilder,
    sealed: bool,
}

static PENDING: Lazy<Mutex<Pending>> = Lazy::new(|| {
    Mutex::new(Pending {
        builder: RegistryBuilder::new(),
        sealed: false,
    })
});

static GLOBAL: OnceCell<SpecializationRegistry> = OnceCell::new();

/// Registration is one init phase: a poisoned lock is taken over, never
/// reported.
fn lock_recovering<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registration entry point for generated code. Must run before the first
/// call to [`global`].
pub fn register_specialization(
    op: OperatorName,
    shapes: &[&str],
    handler: Handler,
) -> Result<bool, OpError> {
    let mut pending = lock_recovering(&PENDING);
    if pending.sealed {
        return Err(OpError::Config(format!(
            "{} specialization registered after the registry was sealed",
            op
        )));
    }
    Ok(pending.builder.register(op, shapes, handler))
}

/// The process registry. The first call seals it.
pub fn global() -> &'static SpecializationRegistry {
    GLOBAL.get_or_init(|| {
        let mut pending = lock_recovering(&PENDING);
        pending.sealed = true;
        let registry = std::mem::take(&mut pending.builder).build();
        #[cfg(feature = "tracing")]
        tracing::debug!(entries = registry.len(), "specialization registry sealed");
        registry
    })
}

pub fn is_sealed() -> bool {
    GLOBAL.get().is_some()
}
