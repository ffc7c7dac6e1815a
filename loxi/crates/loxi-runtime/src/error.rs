//! Runtime errors and unwinding signals.
//!
//! `return` and `break` are not language-level exceptions; they are
//! out-of-band signals bubbled through the `Err` variant of evaluator
//! results and caught at exactly one frame each: `return` at the active
//! function call, `break` at the nearest enclosing loop. Runtime errors ride
//! the same channel and are caught only at the `interpret` boundary.

use loxi_util::Span;
use thiserror::Error;

use crate::value::Value;

/// A Lox runtime error: an offending source location and a message.
///
/// The evaluator never formats these for the user; the driver renders them
/// through the diagnostic sink.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Non-local control flow through evaluator frames.
#[derive(Debug)]
pub enum Unwind {
    /// A `return` carrying its value; caught by `LoxFunction::call`.
    Return(Value),
    /// A `break`; caught by the innermost `while` frame.
    Break,
    /// A runtime error; caught at the interpret boundary.
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

/// Result of evaluating an expression or executing a statement.
pub type EvalResult<T> = Result<T, Unwind>;
