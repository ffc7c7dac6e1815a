//! Runtime values.
//!
//! A [`Value`] is a tagged sum over every kind of datum a Lox program can
//! produce. Heap values are reference-counted; cycles (an instance field
//! holding a method closure that captures `this`) are tolerated and not
//! collected, which is acceptable for a run-once interpreter.

use std::fmt;
use std::rc::Rc;

use crate::class::{LoxClass, LoxInstance};
use crate::function::LoxFunction;
use crate::native::NativeFn;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<LoxInstance>),
    Native(Rc<NativeFn>),
    /// Sentinel for a declared-but-unassigned variable slot. Distinct from
    /// `Nil`: reading it through a variable reference is a runtime error.
    Uninit,
    /// The hidden payload of a `super` environment slot: the ordered direct
    /// superclasses of the defining class. Never observable from Lox code.
    Supers(Rc<[Rc<LoxClass>]>),
}

impl Value {
    /// Truthiness: `nil` and `false` are false, everything else (including
    /// `0` and `""`) is true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Lox equality: both `nil` are equal, cross-type comparisons are never
    /// equal, strings compare by content, and functions, classes, and
    /// instances compare by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The number payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// The stringification observable via `print`:
    ///
    /// - `nil`, `true`, `false`
    /// - numbers in minimal decimal form; a whole-number float drops `.0`
    /// - strings as their content
    /// - `<fn NAME>` / `<lambda fn>`, the class name, `NAME instance`,
    ///   `<native fn>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Function(function) => write!(f, "{function}"),
            Value::Class(class) => write!(f, "{}", class.name),
            Value::Instance(instance) => write!(f, "{} instance", instance.class.name),
            Value::Native(_) => write!(f, "<native fn>"),
            Value::Uninit => write!(f, "<uninitialized>"),
            Value::Supers(_) => write!(f, "<super>"),
        }
    }
}
