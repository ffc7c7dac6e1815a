//! loxi-runtime - Tree-walking evaluator.
//!
//! The [`Interpreter`] walks the resolved AST directly. It owns the globals
//! frame and its name→slot index, the accumulated resolver side-table, and
//! the output sink `print` writes to. All of that state persists across
//! calls to [`Interpreter::interpret`], which is what makes the REPL's
//! session continuity work.
//!
//! Evaluation order is strictly left-to-right everywhere; the only
//! operators that skip evaluation are the short-circuit logicals. Non-local
//! control flow (`return`, `break`, runtime errors) travels through the
//! `Err` variant of [`EvalResult`]; see [`error`].

pub mod class;
pub mod env;
pub mod error;
pub mod function;
pub mod native;
pub mod value;

pub use class::{LoxClass, LoxInstance};
pub use env::{EnvRef, Environment};
pub use error::{EvalResult, RuntimeError, Unwind};
pub use function::LoxFunction;
pub use native::NativeFn;
pub use value::Value;

use std::io::Write;
use std::rc::Rc;

use indexmap::IndexMap;
use loxi_par::*;
use loxi_sem::Bindings;
use loxi_util::{Handler, Span, Symbol};
use rustc_hash::FxHashMap;

/// The tree-walking evaluator.
pub struct Interpreter {
    /// The globals frame; bottom of every environment chain.
    globals: EnvRef,

    /// Name index for the globals frame. Globals are the one place where
    /// lookup is by name: the resolver leaves top-level references out of
    /// its side-table.
    global_slots: FxHashMap<Symbol, usize>,

    /// The frame statements currently execute in.
    environment: EnvRef,

    /// Accumulated resolver side-table. Extended, never replaced, so
    /// closures from earlier REPL lines keep their resolutions.
    bindings: Bindings,

    /// Where `print` writes. Stdout in the binary, a buffer in tests.
    out: Box<dyn Write>,
}

impl Interpreter {
    /// An interpreter printing to stdout, with `clock` pre-seeded in the
    /// globals.
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    /// An interpreter printing to the given sink.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        let globals = Environment::global();
        let mut global_slots = FxHashMap::default();

        let slot = globals
            .borrow_mut()
            .define(Value::Native(Rc::new(native::clock())));
        global_slots.insert(loxi_util::symbol::SYM_CLOCK, slot);

        Self {
            environment: globals.clone(),
            globals,
            global_slots,
            bindings: Bindings::new(),
            out,
        }
    }

    /// Merge a resolver side-table into the accumulated one.
    pub fn add_bindings(&mut self, bindings: Bindings) {
        self.bindings.extend(bindings);
    }

    /// Execute a program. A runtime error unwinds to here, is reported
    /// through the sink, and stops execution; returns `false` in that case.
    pub fn interpret(&mut self, statements: &[Stmt], handler: &Handler) -> bool {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(Unwind::Error(error)) => {
                    handler.runtime_error(error.span, error.message);
                    return false;
                }
                Err(Unwind::Return(_)) | Err(Unwind::Break) => {
                    unreachable!("control-flow signal escaped to top level")
                }
            }
        }
        true
    }

    /// Evaluate a bare expression, for the REPL's expression-printing mode.
    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.evaluate(expr).map_err(|unwind| match unwind {
            Unwind::Error(error) => error,
            Unwind::Return(_) | Unwind::Break => {
                unreachable!("control-flow signal escaped an expression")
            }
        })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn execute(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.out, "{value}");
                Ok(())
            }
            Stmt::Var(var) => {
                let value = match &var.init {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Uninit,
                };
                self.define_in_current(var.name.name, value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let env = Environment::with_enclosing(self.environment.clone());
                self.execute_block(statements, env)
            }
            Stmt::If(stmt) => {
                if self.evaluate(&stmt.cond)?.is_truthy() {
                    self.execute(&stmt.then_branch)
                } else if let Some(else_branch) = &stmt.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(stmt) => {
                while self.evaluate(&stmt.cond)?.is_truthy() {
                    match self.execute(&stmt.body) {
                        Ok(()) => {}
                        Err(Unwind::Break) => break,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Stmt::Break(_) => Err(Unwind::Break),
            Stmt::Function(decl) => {
                let function =
                    LoxFunction::new(decl.clone(), self.environment.clone(), false);
                let name = decl.name_symbol().expect("function statements are named");
                self.define_in_current(name, Value::Function(Rc::new(function)));
                Ok(())
            }
            Stmt::Return(stmt) => {
                let value = match &stmt.value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                Err(Unwind::Return(value))
            }
            Stmt::Class(class) => self.execute_class(class),
        }
    }

    /// Run statements in the given frame, restoring the previous frame on
    /// every exit path, including unwinds.
    pub(crate) fn execute_block(&mut self, statements: &[Stmt], env: EnvRef) -> EvalResult<()> {
        let previous = std::mem::replace(&mut self.environment, env);
        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));
        self.environment = previous;
        result
    }

    /// Class definition protocol:
    ///
    /// 1. define the class name slot as `nil` (methods may refer to the
    ///    class by name);
    /// 2. evaluate the superclass references, each of which must be a
    ///    class;
    /// 3. with superclasses, push the frame binding `super` to the ordered
    ///    superclass list - method closures capture it;
    /// 4. build the method and class-method tables;
    /// 5. compute the MRO;
    /// 6. assign the finished class to the reserved slot.
    fn execute_class(&mut self, decl: &ClassDecl) -> EvalResult<()> {
        let class_env = self.environment.clone();
        let slot = class_env.borrow_mut().define(Value::Nil);
        if class_env.borrow().is_global() {
            self.global_slots.insert(decl.name.name, slot);
        }

        let mut superclasses = Vec::with_capacity(decl.superclasses.len());
        for superclass in &decl.superclasses {
            match self.lookup_variable(superclass.id, &superclass.name)? {
                Value::Class(class) => superclasses.push(class),
                _ => {
                    return Err(RuntimeError::new(
                        superclass.name.span,
                        "Superclass must be a class.",
                    )
                    .into())
                }
            }
        }

        let method_env = if superclasses.is_empty() {
            self.environment.clone()
        } else {
            let env = Environment::with_enclosing(self.environment.clone());
            env.borrow_mut()
                .define(Value::Supers(superclasses.clone().into()));
            env
        };

        let mut methods = IndexMap::new();
        for method in &decl.methods {
            let name = method.name_symbol().expect("methods are named");
            let is_initializer = name == loxi_util::symbol::SYM_INIT;
            let function = LoxFunction::new(method.clone(), method_env.clone(), is_initializer);
            methods.insert(name, Rc::new(function));
        }
        let mut class_methods = IndexMap::new();
        for class_method in &decl.class_methods {
            let name = class_method.name_symbol().expect("class methods are named");
            let function = LoxFunction::new(class_method.clone(), method_env.clone(), false);
            class_methods.insert(name, Rc::new(function));
        }

        let class = LoxClass::new(decl.name.name, superclasses, methods, class_methods);
        LoxClass::link_mro(&class, decl.name.span)?;

        class_env.borrow_mut().set(slot, Value::Class(class));
        Ok(())
    }

    /// Define a value in the current frame; at global scope also record the
    /// name→slot mapping.
    fn define_in_current(&mut self, name: Symbol, value: Value) {
        let slot = self.environment.borrow_mut().define(value);
        if self.environment.borrow().is_global() {
            self.global_slots.insert(name, slot);
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(self.literal_value(value)),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary(unary) => self.eval_unary(unary),
            Expr::Binary(binary) => self.eval_binary(binary),
            Expr::Ternary(ternary) => {
                if self.evaluate(&ternary.cond)?.is_truthy() {
                    self.evaluate(&ternary.then)
                } else {
                    self.evaluate(&ternary.otherwise)
                }
            }
            Expr::Logical(logical) => self.eval_logical(logical),
            Expr::Variable(var) => self.lookup_variable(var.id, &var.name),
            Expr::Assign(assign) => self.eval_assign(assign),
            Expr::Call(call) => self.eval_call(call),
            Expr::Get(get) => self.eval_get(get),
            Expr::Set(set) => self.eval_set(set),
            Expr::This(this) => self.lookup_keyword(this.id, loxi_util::symbol::KW_THIS, this.span),
            Expr::Super(sup) => self.eval_super(sup),
            Expr::Lambda(decl) => {
                let function = LoxFunction::new(decl.clone(), self.environment.clone(), false);
                Ok(Value::Function(Rc::new(function)))
            }
        }
    }

    fn literal_value(&self, value: &LitValue) -> Value {
        match value {
            LitValue::Nil => Value::Nil,
            LitValue::Bool(b) => Value::Bool(*b),
            LitValue::Number(n) => Value::Number(*n),
            LitValue::Str(s) => Value::Str(Rc::from(s.as_str())),
        }
    }

    fn eval_unary(&mut self, unary: &UnaryExpr) -> EvalResult<Value> {
        let operand = self.evaluate(&unary.operand)?;
        match unary.op {
            UnOp::Neg => {
                let n = self.number_operand(unary.op_span, &operand)?;
                Ok(Value::Number(-n))
            }
            UnOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        }
    }

    fn eval_binary(&mut self, binary: &BinaryExpr) -> EvalResult<Value> {
        let Some(left) = &binary.left else {
            unreachable!("recovery placeholder evaluated without a prior diagnostic");
        };
        let left = self.evaluate(left)?;
        let right = self.evaluate(&binary.right)?;
        let span = binary.op_span;

        match binary.op {
            BinOp::Add => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                _ if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) => {
                    Ok(Value::Str(format!("{left}{right}").into()))
                }
                _ => Err(RuntimeError::new(span, "Operands must be numbers or strings.").into()),
            },
            BinOp::Sub => {
                let (a, b) = self.number_operands(span, &left, &right)?;
                Ok(Value::Number(a - b))
            }
            BinOp::Mul => {
                let (a, b) = self.number_operands(span, &left, &right)?;
                Ok(Value::Number(a * b))
            }
            BinOp::Div => {
                let (a, b) = self.number_operands(span, &left, &right)?;
                if b == 0.0 {
                    return Err(RuntimeError::new(span, "Cannot divide by zero.").into());
                }
                Ok(Value::Number(a / b))
            }
            BinOp::Lt => {
                let (a, b) = self.number_operands(span, &left, &right)?;
                Ok(Value::Bool(a < b))
            }
            BinOp::Le => {
                let (a, b) = self.number_operands(span, &left, &right)?;
                Ok(Value::Bool(a <= b))
            }
            BinOp::Gt => {
                let (a, b) = self.number_operands(span, &left, &right)?;
                Ok(Value::Bool(a > b))
            }
            BinOp::Ge => {
                let (a, b) = self.number_operands(span, &left, &right)?;
                Ok(Value::Bool(a >= b))
            }
            BinOp::Eq => Ok(Value::Bool(left.equals(&right))),
            BinOp::Ne => Ok(Value::Bool(!left.equals(&right))),
            // Sequencing: both sides evaluated, the right is the result.
            BinOp::Comma => Ok(right),
        }
    }

    fn eval_logical(&mut self, logical: &LogicalExpr) -> EvalResult<Value> {
        let left = self.evaluate(&logical.left)?;
        match logical.op {
            LogicalOp::Or if left.is_truthy() => Ok(left),
            LogicalOp::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(&logical.right),
        }
    }

    fn eval_assign(&mut self, assign: &AssignExpr) -> EvalResult<Value> {
        let value = self.evaluate(&assign.value)?;

        if let Some(resolution) = self.bindings.get(assign.id) {
            Environment::assign_at(
                &self.environment,
                resolution.depth,
                resolution.slot,
                value.clone(),
            );
        } else if let Some(&slot) = self.global_slots.get(&assign.name.name) {
            self.globals.borrow_mut().set(slot, value.clone());
        } else {
            return Err(RuntimeError::new(
                assign.name.span,
                format!("Undefined variable '{}'.", assign.name.name),
            )
            .into());
        }

        Ok(value)
    }

    fn eval_call(&mut self, call: &CallExpr) -> EvalResult<Value> {
        let callee = self.evaluate(&call.callee)?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.evaluate(arg)?);
        }

        match callee {
            Value::Function(function) => {
                self.check_arity(call.paren_span, function.arity(), args.len())?;
                function.call(self, &args)
            }
            Value::Class(class) => {
                self.check_arity(call.paren_span, class.arity(), args.len())?;
                LoxClass::instantiate(&class, self, &args)
            }
            Value::Native(native) => {
                self.check_arity(call.paren_span, native.arity, args.len())?;
                (native.call)(&args)
                    .map_err(|message| RuntimeError::new(call.paren_span, message).into())
            }
            _ => Err(RuntimeError::new(
                call.paren_span,
                "Can only call functions and classes.",
            )
            .into()),
        }
    }

    /// Property read.
    ///
    /// On an instance: fields shadow methods; methods are found along the
    /// MRO and bound to the instance; a getter is invoked immediately.
    /// On a class: class methods are found along the MRO and bound to the
    /// class value itself.
    fn eval_get(&mut self, get: &GetExpr) -> EvalResult<Value> {
        let object = self.evaluate(&get.object)?;
        let name = get.name.name;

        match object {
            Value::Instance(instance) => {
                if let Some(value) = instance.get_field(name) {
                    return Ok(value);
                }
                if let Some(method) = instance.class.find_method(name) {
                    let bound = method.bind(Value::Instance(instance.clone()));
                    if method.decl.is_getter {
                        return bound.call(self, &[]);
                    }
                    return Ok(Value::Function(Rc::new(bound)));
                }
                Err(RuntimeError::new(
                    get.name.span,
                    format!("Undefined property '{name}'."),
                )
                .into())
            }
            Value::Class(class) => {
                if let Some(method) = class.find_class_method(name) {
                    let bound = method.bind(Value::Class(class.clone()));
                    if method.decl.is_getter {
                        return bound.call(self, &[]);
                    }
                    return Ok(Value::Function(Rc::new(bound)));
                }
                Err(RuntimeError::new(
                    get.name.span,
                    format!("Undefined property '{name}'."),
                )
                .into())
            }
            _ => Err(RuntimeError::new(get.name.span, "Only instances have properties.").into()),
        }
    }

    fn eval_set(&mut self, set: &SetExpr) -> EvalResult<Value> {
        let object = self.evaluate(&set.object)?;

        let Value::Instance(instance) = object else {
            return Err(RuntimeError::new(set.name.span, "Only instances have fields.").into());
        };
        let value = self.evaluate(&set.value)?;
        instance.set_field(set.name.name, value.clone());
        Ok(value)
    }

    /// `super.method`: read the superclass list at the resolved slot and
    /// `this` one frame nearer, then scan each direct superclass's MRO in
    /// order and bind the first hit.
    fn eval_super(&mut self, sup: &SuperExpr) -> EvalResult<Value> {
        let Some(resolution) = self.bindings.get(sup.id) else {
            return Err(
                RuntimeError::new(sup.span, "Can't use 'super' outside of a class.").into(),
            );
        };

        let supers = Environment::get_at(&self.environment, resolution.depth, resolution.slot);
        let Value::Supers(superclasses) = supers else {
            unreachable!("'super' slot holds the superclass list");
        };
        let receiver = Environment::get_at(&self.environment, resolution.depth - 1, 0);

        for superclass in superclasses.iter() {
            if let Some(method) = superclass.find_method(sup.method.name) {
                return Ok(Value::Function(Rc::new(method.bind(receiver.clone()))));
            }
        }

        Err(RuntimeError::new(
            sup.method.span,
            format!("Undefined property '{}'.", sup.method.name),
        )
        .into())
    }

    // =========================================================================
    // Variable access
    // =========================================================================

    /// Read a variable: resolved references go straight to their slot,
    /// everything else is a global looked up by name.
    fn lookup_variable(&mut self, id: loxi_util::NodeId, name: &Ident) -> EvalResult<Value> {
        let value = if let Some(resolution) = self.bindings.get(id) {
            Environment::get_at(&self.environment, resolution.depth, resolution.slot)
        } else if let Some(&slot) = self.global_slots.get(&name.name) {
            self.globals.borrow().get(slot)
        } else {
            return Err(RuntimeError::new(
                name.span,
                format!("Undefined variable '{}'.", name.name),
            )
            .into());
        };

        if matches!(value, Value::Uninit) {
            return Err(RuntimeError::new(
                name.span,
                format!(
                    "Variable '{}' accessed before its initialized or assigned.",
                    name.name
                ),
            )
            .into());
        }
        Ok(value)
    }

    /// Read `this` (or another implicit keyword binding) like a local.
    fn lookup_keyword(
        &mut self,
        id: loxi_util::NodeId,
        name: Symbol,
        span: Span,
    ) -> EvalResult<Value> {
        let ident = Ident { name, span };
        self.lookup_variable(id, &ident)
    }

    // =========================================================================
    // Checks
    // =========================================================================

    fn check_arity(&self, span: Span, arity: usize, got: usize) -> EvalResult<()> {
        if arity != got {
            return Err(RuntimeError::new(
                span,
                format!("Expected {arity} arguments but got {got}."),
            )
            .into());
        }
        Ok(())
    }

    fn number_operand(&self, span: Span, operand: &Value) -> EvalResult<f64> {
        operand
            .as_number()
            .ok_or_else(|| RuntimeError::new(span, "Operand must be a number.").into())
    }

    fn number_operands(&self, span: Span, left: &Value, right: &Value) -> EvalResult<(f64, f64)> {
        match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(RuntimeError::new(span, "Operands must be numbers.").into()),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loxi_lex::Lexer;
    use loxi_sem::resolve_program;
    use loxi_util::NodeIdGenerator;
    use std::cell::RefCell;

    /// `print` sink shared between the test and the interpreter.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run a program end to end, returning captured stdout and the handler.
    fn run_source(source: &str) -> (String, Handler) {
        let handler = Handler::new();
        let tokens = Lexer::new(source, &handler).tokenize();
        let ids = NodeIdGenerator::new();
        let statements = loxi_par::Parser::new(tokens, &ids, &handler).parse();
        assert!(
            !handler.has_errors(),
            "unexpected parse error in {source:?}: {:?}",
            handler.take_diagnostics()
        );
        let bindings = resolve_program(&statements, &handler);
        assert!(
            !handler.has_errors(),
            "unexpected resolve error in {source:?}: {:?}",
            handler.take_diagnostics()
        );

        let buf = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(buf.clone()));
        interpreter.add_bindings(bindings);
        interpreter.interpret(&statements, &handler);

        let output = String::from_utf8(buf.0.borrow().clone()).expect("utf-8 output");
        (output, handler)
    }

    /// Assert a program prints exactly these lines.
    fn assert_prints(source: &str, expected: &[&str]) {
        let (output, handler) = run_source(source);
        assert!(
            !handler.had_runtime_error(),
            "unexpected runtime error in {source:?}: {:?}",
            handler.take_runtime_errors()
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines, expected, "output mismatch for {source:?}");
    }

    /// Run a program expected to fail at runtime; return the error message.
    fn runtime_error_message(source: &str) -> String {
        let (_, handler) = run_source(source);
        assert!(
            handler.had_runtime_error(),
            "expected a runtime error in {source:?}"
        );
        handler.take_runtime_errors()[0].message.clone()
    }

    // =========================================================================
    // Expressions and statements
    // =========================================================================

    #[test]
    fn test_print_string() {
        assert_prints("print \"hello\";", &["hello"]);
    }

    #[test]
    fn test_arithmetic() {
        assert_prints("var a = 1; var b = 2; print a + b;", &["3"]);
        assert_prints("print (1 + 2) * 3 - 4 / 2;", &["7"]);
        assert_prints("print -3 + 1;", &["-2"]);
    }

    #[test]
    fn test_double_negation_identity() {
        assert_prints("var x = 5; print --x;", &["5"]);
    }

    #[test]
    fn test_comparison_and_equality() {
        assert_prints("print 1 < 2; print 2 <= 2; print 3 > 4;", &["true", "true", "false"]);
        assert_prints("print nil == nil; print nil == 0;", &["true", "false"]);
        assert_prints("print 1 == \"1\";", &["false"]);
    }

    #[test]
    fn test_string_concatenation() {
        assert_prints("print \"a\" + \"b\";", &["ab"]);
        // Either side being a string concatenates; whole floats drop `.0`.
        assert_prints("print \"n=\" + 3.0;", &["n=3"]);
        assert_prints("print 2.5 + \"!\";", &["2.5!"]);
        assert_prints("print \"v: \" + nil;", &["v: nil"]);
    }

    #[test]
    fn test_truthiness_in_conditions() {
        assert_prints("if (0) print \"zero is true\";", &["zero is true"]);
        assert_prints("if (\"\") print \"empty is true\";", &["empty is true"]);
        assert_prints("if (nil) print \"no\"; else print \"nil is false\";", &["nil is false"]);
        assert_prints("print !0;", &["false"]);
        assert_prints("print !!nil;", &["false"]);
    }

    #[test]
    fn test_logical_short_circuit() {
        assert_prints("print nil or \"fallback\";", &["fallback"]);
        assert_prints("print \"left\" or \"right\";", &["left"]);
        assert_prints("print nil and \"never\";", &["nil"]);
        // The right side must not evaluate when the left decides.
        assert_prints(
            "var hits = 0; fun bump() { hits = hits + 1; return true; } \
             var r = false and bump(); print hits;",
            &["0"],
        );
    }

    #[test]
    fn test_ternary() {
        assert_prints("print 1 < 2 ? \"yes\" : \"no\";", &["yes"]);
        assert_prints("print nil ? \"yes\" : \"no\";", &["no"]);
    }

    #[test]
    fn test_comma_operator() {
        assert_prints("print (1, 2, 3);", &["3"]);
        // The left side still evaluates.
        assert_prints("var a = 0; print (a = 5, a + 1);", &["6"]);
    }

    #[test]
    fn test_assignment_is_an_expression() {
        assert_prints("var a = 1; print a = 2; print a;", &["2", "2"]);
    }

    #[test]
    fn test_block_scoping_and_shadowing() {
        assert_prints(
            "var a = \"outer\"; { var a = \"inner\"; print a; } print a;",
            &["inner", "outer"],
        );
    }

    #[test]
    fn test_while_and_break() {
        assert_prints(
            "var i = 0; while (true) { if (i == 2) break; print i; i = i + 1; }",
            &["0", "1"],
        );
    }

    #[test]
    fn test_for_loop_with_break() {
        assert_prints(
            "for (var i = 0; i < 3; i = i + 1) { if (i == 2) break; print i; }",
            &["0", "1"],
        );
    }

    #[test]
    fn test_break_exits_innermost_loop_only() {
        assert_prints(
            "for (var i = 0; i < 2; i = i + 1) { \
               for (var j = 0; j < 9; j = j + 1) { if (j == 1) break; } \
               print i; }",
            &["0", "1"],
        );
    }

    // =========================================================================
    // Functions and closures
    // =========================================================================

    #[test]
    fn test_function_call_and_return() {
        assert_prints("fun add(a, b) { return a + b; } print add(1, 2);", &["3"]);
        assert_prints("fun noop() {} print noop();", &["nil"]);
    }

    #[test]
    fn test_closure_captures_environment() {
        assert_prints(
            "fun make(n) { fun add(x) { return x + n; } return add; } \
             var f = make(10); print f(5);",
            &["15"],
        );
    }

    #[test]
    fn test_closure_aliasing_is_shared() {
        // Two closures over the same frame observe each other's writes.
        assert_prints(
            "fun pair() { \
               var count = 0; \
               fun bump() { count = count + 1; } \
               fun read() { return count; } \
               bump(); bump(); \
               return read; \
             } \
             print pair()();",
            &["2"],
        );
    }

    #[test]
    fn test_lambda() {
        assert_prints("var f = fun (x) { return x * 2; }; print f(4);", &["8"]);
        assert_prints("print fun (x) { return x; };", &["<lambda fn>"]);
        assert_prints("fun id(x) { return x; } print id;", &["<fn id>"]);
    }

    #[test]
    fn test_recursion() {
        assert_prints(
            "fun fib(n) { if (n <= 1) return n; return fib(n - 1) + fib(n - 2); } print fib(10);",
            &["55"],
        );
    }

    #[test]
    fn test_clock_native() {
        assert_prints("print clock() > 0;", &["true"]);
        assert_prints("print clock;", &["<native fn>"]);
    }

    // =========================================================================
    // Classes
    // =========================================================================

    #[test]
    fn test_instance_fields() {
        assert_prints(
            "class Box {} var b = Box(); b.value = 7; print b.value; print b.value = 8;",
            &["7", "8"],
        );
    }

    #[test]
    fn test_methods_and_this() {
        assert_prints(
            "class Greeter { greet() { return \"hi \" + this.name; } } \
             var g = Greeter(); g.name = \"lox\"; print g.greet();",
            &["hi lox"],
        );
    }

    #[test]
    fn test_initializer() {
        assert_prints(
            "class Point { init(x, y) { this.x = x; this.y = y; } } \
             var p = Point(3, 4); print p.x + p.y;",
            &["7"],
        );
    }

    #[test]
    fn test_initializer_returns_this() {
        assert_prints(
            "class C { init() { this.tag = \"t\"; } } \
             var c = C(); print c.init();",
            &["C instance"],
        );
    }

    #[test]
    fn test_inherited_method() {
        assert_prints(
            "class A { greet() { print \"a\"; } } class B < A {} B().greet();",
            &["a"],
        );
    }

    #[test]
    fn test_method_override_wins() {
        assert_prints(
            "class A { m() { return \"A\"; } } class B < A { m() { return \"B\"; } } \
             print B().m();",
            &["B"],
        );
    }

    #[test]
    fn test_super_dispatch() {
        assert_prints(
            "class A { m() { return \"A\"; } } \
             class B < A { m() { return \"B\" + super.m(); } } \
             print B().m();",
            &["BA"],
        );
    }

    #[test]
    fn test_diamond_mro_and_stringify() {
        assert_prints(
            "class A {} class B < A {} class C < A {} \
             class D < B < C { show() { print \"d\"; } } \
             var d = D(); d.show(); print d;",
            &["d", "D instance"],
        );
    }

    #[test]
    fn test_diamond_method_resolution_prefers_first_parent() {
        assert_prints(
            "class A { who() { return \"A\"; } } \
             class B < A { who() { return \"B\"; } } \
             class C < A { who() { return \"C\"; } } \
             class D < B < C {} \
             print D().who();",
            &["B"],
        );
    }

    #[test]
    fn test_class_methods() {
        assert_prints(
            "class Math { class square(n) { return n * n; } } print Math.square(3);",
            &["9"],
        );
    }

    #[test]
    fn test_class_method_inherited_along_mro() {
        assert_prints(
            "class A { class make() { return \"made\"; } } class B < A {} \
             print B.make();",
            &["made"],
        );
    }

    #[test]
    fn test_getter_invoked_on_access() {
        assert_prints(
            "class Circle { init(r) { this.r = r; } area { return this.r * this.r; } } \
             print Circle(3).area;",
            &["9"],
        );
    }

    #[test]
    fn test_field_shadows_method() {
        assert_prints(
            "class A { m() { return \"method\"; } } \
             var a = A(); a.m = fun () { return \"field\"; }; print a.m();",
            &["field"],
        );
    }

    #[test]
    fn test_class_stringifies_to_name() {
        assert_prints("class Widget {} print Widget;", &["Widget"]);
    }

    #[test]
    fn test_instance_identity_equality() {
        assert_prints(
            "class A {} var a = A(); var b = a; print a == b; print A() == A();",
            &["true", "false"],
        );
    }

    #[test]
    fn test_bound_method_keeps_receiver() {
        assert_prints(
            "class A { init(n) { this.n = n; } get() { return this.n; } } \
             var m = A(7).get; print m();",
            &["7"],
        );
    }

    // =========================================================================
    // Runtime errors
    // =========================================================================

    #[test]
    fn test_division_by_zero() {
        assert_eq!(runtime_error_message("print 1 / 0;"), "Cannot divide by zero.");
    }

    #[test]
    fn test_arithmetic_type_errors() {
        assert_eq!(
            runtime_error_message("print 1 - \"x\";"),
            "Operands must be numbers."
        );
        assert_eq!(runtime_error_message("print -\"x\";"), "Operand must be a number.");
        assert_eq!(
            runtime_error_message("print true + false;"),
            "Operands must be numbers or strings."
        );
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            runtime_error_message("print missing;"),
            "Undefined variable 'missing'."
        );
        assert_eq!(
            runtime_error_message("missing = 1;"),
            "Undefined variable 'missing'."
        );
    }

    #[test]
    fn test_uninitialized_access() {
        assert_eq!(
            runtime_error_message("var x; print x;"),
            "Variable 'x' accessed before its initialized or assigned."
        );
        // Assigning first makes the read legal.
        assert_prints("var y; y = 1; print y;", &["1"]);
    }

    #[test]
    fn test_uninitialized_is_distinct_from_nil() {
        assert_prints("var z = nil; print z;", &["nil"]);
    }

    #[test]
    fn test_call_errors() {
        assert_eq!(
            runtime_error_message("\"text\"();"),
            "Can only call functions and classes."
        );
        assert_eq!(
            runtime_error_message("fun f(a, b) {} f(1);"),
            "Expected 2 arguments but got 1."
        );
        assert_eq!(
            runtime_error_message("clock(1);"),
            "Expected 0 arguments but got 1."
        );
    }

    #[test]
    fn test_property_errors() {
        assert_eq!(
            runtime_error_message("class A {} print A().missing;"),
            "Undefined property 'missing'."
        );
        assert_eq!(
            runtime_error_message("print 4.x;"),
            "Only instances have properties."
        );
        assert_eq!(
            runtime_error_message("4.x = 1;"),
            "Only instances have fields."
        );
    }

    #[test]
    fn test_superclass_must_be_class() {
        assert_eq!(
            runtime_error_message("var NotAClass = 1; class B < NotAClass {}"),
            "Superclass must be a class."
        );
    }

    #[test]
    fn test_inconsistent_mro_is_runtime_error() {
        assert_eq!(
            runtime_error_message(
                "class X {} class Y {} \
                 class A < X < Y {} class B < Y < X {} \
                 class D < A < B {}"
            ),
            "Cannot create a consistent MRO."
        );
    }

    #[test]
    fn test_super_undefined_method() {
        assert_eq!(
            runtime_error_message(
                "class A {} class B < A { m() { return super.nope(); } } B().m();"
            ),
            "Undefined property 'nope'."
        );
    }

    #[test]
    fn test_runtime_error_stops_execution() {
        let (output, handler) = run_source("print 1; print 1 / 0; print 2;");
        assert!(handler.had_runtime_error());
        assert_eq!(output.lines().collect::<Vec<_>>(), vec!["1"]);
    }

    // =========================================================================
    // Session continuity (REPL-style repeated interpret calls)
    // =========================================================================

    #[test]
    fn test_state_persists_across_interpret_calls() {
        let handler = Handler::new();
        let ids = NodeIdGenerator::new();
        let buf = SharedBuf::default();
        let mut interpreter = Interpreter::with_output(Box::new(buf.clone()));

        for line in ["var a = 1;", "fun get() { return a; }", "print get();", "a = 5;", "print get();"] {
            let tokens = Lexer::new(line, &handler).tokenize();
            let statements = loxi_par::Parser::new(tokens, &ids, &handler).parse();
            assert!(!handler.has_errors());
            let bindings = resolve_program(&statements, &handler);
            interpreter.add_bindings(bindings);
            assert!(interpreter.interpret(&statements, &handler));
        }

        let output = String::from_utf8(buf.0.borrow().clone()).unwrap();
        assert_eq!(output.lines().collect::<Vec<_>>(), vec!["1", "5"]);
    }
}
