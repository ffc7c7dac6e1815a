//! Native functions.
//!
//! A native participates in calls like any other callable: arity is checked
//! at the call site and a failure surfaces as an ordinary runtime error at
//! the call's closing parenthesis.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::value::Value;

/// A host function exposed to Lox code.
pub struct NativeFn {
    pub name: &'static str,
    pub arity: usize,
    pub call: fn(&[Value]) -> Result<Value, String>,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

impl fmt::Display for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

/// `clock()`: wall-clock seconds since the Unix epoch.
pub fn clock() -> NativeFn {
    NativeFn {
        name: "clock",
        arity: 0,
        call: |_args| {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|_| "System clock is before the Unix epoch.".to_string())?;
            Ok(Value::Number(now.as_secs_f64()))
        },
    }
}
