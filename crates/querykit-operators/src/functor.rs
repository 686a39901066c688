//! Typed callables handed to operators.
//!
//! A `Functor` pairs a closure over `Value`s with its declared `FnType`. The
//! declared type is what the operators check against the element types and
//! what the type signature uses as the functor's shape descriptor.

use std::fmt;
use std::sync::Arc;

use querykit_core::schema::DataType;
use querykit_core::types::Value;

use crate::traits::OpError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FnType {
    pub params: Vec<DataType>,
    pub ret: DataType,
}

impl FnType {
    /// Like `Display`, but with structural parameter and return shapes.
    pub fn shape(&self) -> String {
        let params: Vec<String> = self.params.iter().map(DataType::shape).collect();
        format!("fn({}) {}", params.join(", "), self.ret.shape())
    }
}

/// `fn(User, Order) Row`
impl fmt::Display for FnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ") {}", self.ret)
    }
}

type UnaryFn = dyn Fn(&Value) -> Value + Send + Sync;
type BinaryFn = dyn Fn(&Value, &Value) -> Value + Send + Sync;
type RunFn = dyn Fn(&[Value]) -> Value + Send + Sync;

#[derive(Clone)]
enum Body {
    Unary(Arc<UnaryFn>),
    Binary(Arc<BinaryFn>),
    /// Receives a borrowed run of elements; declared as `fn([]T) R`.
    Run(Arc<RunFn>),
}

#[derive(Clone)]
pub struct Functor {
    ty: FnType,
    body: Body,
}

impl Functor {
    pub fn unary<F>(param: DataType, ret: DataType, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self {
            ty: FnType {
                params: vec![param],
                ret,
            },
            body: Body::Unary(Arc::new(f)),
        }
    }

    pub fn binary<F>(left: DataType, right: DataType, ret: DataType, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        Self {
            ty: FnType {
                params: vec![left, right],
                ret,
            },
            body: Body::Binary(Arc::new(f)),
        }
    }

    /// Group aggregation over a run of `elem` values.
    pub fn run<F>(elem: DataType, ret: DataType, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            ty: FnType {
                params: vec![DataType::list_of(elem)],
                ret,
            },
            body: Body::Run(Arc::new(f)),
        }
    }

    pub fn ty(&self) -> &FnType {
        &self.ty
    }

    pub fn ret(&self) -> &DataType {
        &self.ty.ret
    }

    pub fn shape(&self) -> String {
        self.ty.shape()
    }

    /// Check the functor is unary over `param`.
    pub fn expect_unary(&self, op: &str, param: &DataType) -> Result<(), OpError> {
        match self.body {
            Body::Unary(_) => self.expect_params(op, &[param]),
            _ => Err(self.arity_error(op, "a one-argument")),
        }
    }

    pub fn expect_binary(
        &self,
        op: &str,
        left: &DataType,
        right: &DataType,
    ) -> Result<(), OpError> {
        match self.body {
            Body::Binary(_) => self.expect_params(op, &[left, right]),
            _ => Err(self.arity_error(op, "a two-argument")),
        }
    }

    pub fn expect_run(&self, op: &str, elem: &DataType) -> Result<(), OpError> {
        match self.body {
            Body::Run(_) => self.expect_params(op, &[&DataType::list_of(elem.clone())]),
            _ => Err(self.arity_error(op, "a run")),
        }
    }

    pub fn expect_ret(&self, op: &str, ret: &DataType) -> Result<(), OpError> {
        if &self.ty.ret != ret {
            return Err(OpError::Config(format!(
                "{}: functor {} should return {}",
                op, self.ty, ret
            )));
        }
        Ok(())
    }

    fn expect_params(&self, op: &str, expected: &[&DataType]) -> Result<(), OpError> {
        let matches = self.ty.params.len() == expected.len()
            && self.ty.params.iter().zip(expected).all(|(a, b)| a == *b);
        if !matches {
            let want: Vec<String> = expected.iter().map(|t| t.to_string()).collect();
            return Err(OpError::Config(format!(
                "{}: functor {} should take ({})",
                op,
                self.ty,
                want.join(", ")
            )));
        }
        Ok(())
    }

    fn arity_error(&self, op: &str, wanted: &str) -> OpError {
        OpError::Config(format!("{}: expected {} functor, got {}", op, wanted, self.ty))
    }

    pub fn call1(&self, arg: &Value) -> Result<Value, OpError> {
        match &self.body {
            Body::Unary(f) => self.checked(f(arg)),
            _ => Err(self.arity_error("call", "a one-argument")),
        }
    }

    pub fn call2(&self, left: &Value, right: &Value) -> Result<Value, OpError> {
        match &self.body {
            Body::Binary(f) => self.checked(f(left, right)),
            _ => Err(self.arity_error("call", "a two-argument")),
        }
    }

    pub fn call_run(&self, run: &[Value]) -> Result<Value, OpError> {
        match &self.body {
            Body::Run(f) => self.checked(f(run)),
            _ => Err(self.arity_error("call", "a run")),
        }
    }

    fn checked(&self, out: Value) -> Result<Value, OpError> {
        if !out.conforms_to(&self.ty.ret) {
            return Err(OpError::Config(format!(
                "functor {} returned {:?}, which is not a {}",
                self.ty, out, self.ty.ret
            )));
        }
        Ok(out)
    }
}

impl fmt::Debug for Functor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Functor").field("ty", &self.ty).finish()
    }
}
