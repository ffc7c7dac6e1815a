//! Lox functions: declarations paired with captured environments.

use std::fmt;
use std::rc::Rc;

use loxi_par::FunctionDecl;

use crate::env::{EnvRef, Environment};
use crate::error::{EvalResult, Unwind};
use crate::value::Value;
use crate::Interpreter;

/// A callable Lox function: a pointer to its declaration, the environment
/// it closed over, and whether it is a class initializer.
#[derive(Debug)]
pub struct LoxFunction {
    pub decl: Rc<FunctionDecl>,
    pub closure: EnvRef,
    pub is_initializer: bool,
}

impl LoxFunction {
    pub fn new(decl: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            decl,
            closure,
            is_initializer,
        }
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }

    /// Produce a copy of this function whose closure binds `receiver` at
    /// slot 0, the slot the resolver reserves for `this`.
    pub fn bind(&self, receiver: Value) -> LoxFunction {
        let env = Environment::with_enclosing(self.closure.clone());
        env.borrow_mut().define(receiver);
        LoxFunction::new(self.decl.clone(), env, self.is_initializer)
    }

    /// Call the function.
    ///
    /// One fresh frame holds parameters and body-level locals, matching the
    /// resolver's layout. A `Return` signal is caught here, exclusively; an
    /// initializer yields its bound `this` no matter how the body exits.
    pub fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
        let env = Environment::with_enclosing(self.closure.clone());
        {
            let mut frame = env.borrow_mut();
            for arg in args {
                frame.define(arg.clone());
            }
        }

        match interpreter.execute_block(&self.decl.body, env) {
            Ok(()) => {
                if self.is_initializer {
                    Ok(self.bound_this())
                } else {
                    Ok(Value::Nil)
                }
            }
            Err(Unwind::Return(value)) => {
                if self.is_initializer {
                    Ok(self.bound_this())
                } else {
                    Ok(value)
                }
            }
            Err(other) => Err(other),
        }
    }

    /// The `this` an initializer was bound to (slot 0 of the bind frame).
    fn bound_this(&self) -> Value {
        Environment::get_at(&self.closure, 0, 0)
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decl.name_symbol() {
            Some(name) => write!(f, "<fn {name}>"),
            None => write!(f, "<lambda fn>"),
        }
    }
}
