//! loxi-sem - Static scope resolution.
//!
//! The resolver walks the parsed program once and computes, for every
//! non-global `Variable`, `Assign`, `this`, and `super` use, the lexical
//! depth and slot index of the binding it refers to. The output is a
//! side-table ([`Bindings`]) keyed on node identity; the evaluator reads a
//! variable with `get_at(depth, slot)` and never searches by name except in
//! the globals frame.
//!
//! The resolver also emits the static diagnostics that do not need runtime
//! information: reading a local in its own initializer, duplicate
//! declarations, `return` outside a function, `return value` inside an
//! initializer, `this`/`super` misuse, self-inheritance, class methods
//! named `init`, and the non-fatal unused-local warning.
//!
//! Resolution does not stop at the first diagnostic; one pass collects them
//! all.

mod scope;

use loxi_par::*;
use loxi_util::symbol::{KW_SUPER, KW_THIS, SYM_INIT};
use loxi_util::{Diagnostic, Handler, NodeId, Span, Symbol};
use rustc_hash::FxHashMap;

use scope::ScopeStack;

/// A resolved reference: `depth` enclosing environments out, then `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub depth: usize,
    pub slot: usize,
}

/// Side-table from node identity to resolved slot.
///
/// Nodes absent from the table are globals, looked up by name at runtime.
#[derive(Debug, Default)]
pub struct Bindings {
    map: FxHashMap<NodeId, Resolution>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, resolution: Resolution) {
        self.map.insert(id, resolution);
    }

    pub fn get(&self, id: NodeId) -> Option<Resolution> {
        self.map.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Merge another table into this one. Node ids are globally unique, so
    /// entries never collide; used by the REPL to accumulate resolutions
    /// across lines.
    pub fn extend(&mut self, other: Bindings) {
        self.map.extend(other.map);
    }
}

/// What kind of function body is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Method,
    Initializer,
}

/// Whether we are inside a class body, and if so whether it has
/// superclasses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

/// Resolve a program, returning the side-table. Diagnostics go to the
/// handler.
pub fn resolve_program(statements: &[Stmt], handler: &Handler) -> Bindings {
    let mut resolver = Resolver::new(handler);
    resolver.resolve_statements(statements);
    resolver.bindings
}

struct Resolver<'a> {
    scopes: ScopeStack,
    bindings: Bindings,
    current_function: FunctionKind,
    current_class: ClassKind,
    handler: &'a Handler,
}

impl<'a> Resolver<'a> {
    fn new(handler: &'a Handler) -> Self {
        Self {
            scopes: ScopeStack::new(),
            bindings: Bindings::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            handler,
        }
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Var(var) => {
                self.declare(var.name);
                if let Some(init) = &var.init {
                    self.resolve_expr(init);
                }
                self.define(var.name.name);
            }
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }
            Stmt::If(stmt) => {
                self.resolve_expr(&stmt.cond);
                self.resolve_stmt(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While(stmt) => {
                self.resolve_expr(&stmt.cond);
                self.resolve_stmt(&stmt.body);
            }
            Stmt::Break(_) => {}
            Stmt::Function(decl) => {
                if let Some(name) = decl.name {
                    self.declare(name);
                    self.define(name.name);
                }
                self.resolve_function(decl, FunctionKind::Function);
            }
            Stmt::Return(stmt) => {
                if self.current_function == FunctionKind::None {
                    self.error(
                        stmt.keyword_span,
                        "return",
                        "Can't return from top-level code.",
                    );
                }
                if let Some(value) = &stmt.value {
                    if self.current_function == FunctionKind::Initializer {
                        self.error(
                            stmt.keyword_span,
                            "return",
                            "Can't return a value from an initializer.",
                        );
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Class(class) => self.resolve_class(class),
        }
    }

    fn resolve_class(&mut self, class: &ClassDecl) {
        let enclosing = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(class.name);
        self.define(class.name.name);

        for superclass in &class.superclasses {
            if superclass.name.name == class.name.name {
                self.error(
                    superclass.name.span,
                    superclass.name.name.as_str(),
                    "A class can't inherit from itself.",
                );
            }
        }

        if !class.superclasses.is_empty() {
            self.current_class = ClassKind::Subclass;
            for superclass in &class.superclasses {
                self.resolve_variable(superclass);
            }
        }

        // Methods close over `super` (when present) and `this`, each in a
        // dedicated single-slot scope matching the runtime frames pushed at
        // class definition and method binding.
        if !class.superclasses.is_empty() {
            self.begin_scope();
            self.declare_implicit(KW_SUPER, class.name.span);
        }
        self.begin_scope();
        self.declare_implicit(KW_THIS, class.name.span);

        for method in &class.methods {
            let kind = if method.name_symbol() == Some(SYM_INIT) {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind);
        }
        for class_method in &class.class_methods {
            if class_method.name_symbol() == Some(SYM_INIT) {
                let name = class_method.name.expect("class methods are named");
                self.error(
                    name.span,
                    name.name.as_str(),
                    "Class methods can't be named 'init'.",
                );
            }
            self.resolve_function(class_method, FunctionKind::Method);
        }

        self.end_scope();
        if !class.superclasses.is_empty() {
            self.end_scope();
        }

        self.current_class = enclosing;
    }

    /// Resolve a function body: parameters and body-level locals share one
    /// scope, matching the single frame the runtime allocates per call.
    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) {
        let enclosing = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &decl.params {
            self.declare(*param);
            self.define(param.name);
        }
        self.resolve_statements(&decl.body);
        self.end_scope();

        self.current_function = enclosing;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Unary(unary) => self.resolve_expr(&unary.operand),
            Expr::Binary(binary) => {
                if let Some(left) = &binary.left {
                    self.resolve_expr(left);
                }
                self.resolve_expr(&binary.right);
            }
            Expr::Ternary(ternary) => {
                self.resolve_expr(&ternary.cond);
                self.resolve_expr(&ternary.then);
                self.resolve_expr(&ternary.otherwise);
            }
            Expr::Logical(logical) => {
                self.resolve_expr(&logical.left);
                self.resolve_expr(&logical.right);
            }
            Expr::Variable(var) => self.resolve_variable(var),
            Expr::Assign(assign) => {
                self.resolve_expr(&assign.value);
                self.resolve_local(assign.id, assign.name.name);
            }
            Expr::Call(call) => {
                self.resolve_expr(&call.callee);
                for arg in &call.args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get(get) => self.resolve_expr(&get.object),
            Expr::Set(set) => {
                self.resolve_expr(&set.value);
                self.resolve_expr(&set.object);
            }
            Expr::This(this) => {
                if self.current_class == ClassKind::None {
                    self.error(this.span, "this", "Can't use 'this' outside of a class.");
                }
                self.resolve_local(this.id, KW_THIS);
            }
            Expr::Super(sup) => {
                match self.current_class {
                    ClassKind::None => {
                        self.error(sup.span, "super", "Can't use 'super' outside of a class.")
                    }
                    ClassKind::Class => self.error(
                        sup.span,
                        "super",
                        "Can't use 'super' in a class with no superclass.",
                    ),
                    ClassKind::Subclass => {}
                }
                self.resolve_local(sup.id, KW_SUPER);
            }
            Expr::Lambda(decl) => self.resolve_function(decl, FunctionKind::Function),
        }
    }

    fn resolve_variable(&mut self, var: &VariableExpr) {
        let own_initializer = self
            .scopes
            .top()
            .and_then(|scope| scope.get(var.name.name))
            .is_some_and(|entry| !entry.defined);
        if own_initializer {
            self.error(
                var.name.span,
                var.name.name.as_str(),
                "Can't read local variable in its own initializer.",
            );
        }
        self.resolve_local(var.id, var.name.name);
    }

    /// Record the (depth, slot) of `name` for node `id`, if it resolves to
    /// a local. Globals stay out of the table.
    fn resolve_local(&mut self, id: NodeId, name: Symbol) {
        if let Some((depth, slot)) = self.scopes.resolve(name) {
            self.bindings.insert(id, Resolution { depth, slot });
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push();
    }

    /// Close the innermost scope, warning about locals that were never
    /// read.
    fn end_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            for (name, entry) in scope.unused() {
                self.handler.emit(
                    Diagnostic::warning(
                        format!("Local variable '{name}' is never used."),
                        entry.span,
                    )
                    .with_label(format!("at '{name}'")),
                );
            }
        }
    }

    /// Declare a user-written name in the innermost scope, diagnosing
    /// duplicates. No-op at global scope.
    fn declare(&mut self, ident: Ident) {
        let Some(scope) = self.scopes.top_mut() else {
            return;
        };
        if scope.declare(ident.name, ident.span) {
            self.error(
                ident.span,
                ident.name.as_str(),
                "Already a variable with this name in this scope.",
            );
        }
    }

    /// Declare and define a compiler-introduced binding (`this`, `super`)
    /// at slot 0 of a fresh scope, pre-marked used so it never warns.
    fn declare_implicit(&mut self, name: Symbol, span: Span) {
        if let Some(scope) = self.scopes.top_mut() {
            scope.declare(name, span);
            scope.define(name);
            scope.mark_used(name);
        }
    }

    fn define(&mut self, name: Symbol) {
        if let Some(scope) = self.scopes.top_mut() {
            scope.define(name);
        }
    }

    fn error(&mut self, span: Span, lexeme: &str, message: &str) {
        self.handler
            .emit(Diagnostic::error(message, span).with_label(format!("at '{lexeme}'")));
    }
}
