//! Parenthesized AST printer.
//!
//! Renders expressions and statements in prefix notation, one statement per
//! line. Used by the driver's `--emit-ast` flag and handy in tests when a
//! structural assertion is clumsier than a string comparison.

use crate::ast::*;

/// Prefix-notation printer for the AST.
pub struct AstPrinter;

impl AstPrinter {
    pub fn new() -> Self {
        Self
    }

    /// Render a whole program, one statement per line.
    pub fn print_program(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render a single statement.
    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", self.print_expr(expr)),
            Stmt::Print(expr) => format!("(print {})", self.print_expr(expr)),
            Stmt::Var(var) => match &var.init {
                Some(init) => format!("(var {} {})", var.name.name, self.print_expr(init)),
                None => format!("(var {})", var.name.name),
            },
            Stmt::Block(statements) => {
                let mut out = String::from("(block");
                for stmt in statements {
                    out.push(' ');
                    out.push_str(&self.print_stmt(stmt));
                }
                out.push(')');
                out
            }
            Stmt::If(stmt) => match &stmt.else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    self.print_expr(&stmt.cond),
                    self.print_stmt(&stmt.then_branch),
                    self.print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    self.print_expr(&stmt.cond),
                    self.print_stmt(&stmt.then_branch)
                ),
            },
            Stmt::While(stmt) => format!(
                "(while {} {})",
                self.print_expr(&stmt.cond),
                self.print_stmt(&stmt.body)
            ),
            Stmt::Break(_) => "(break)".to_string(),
            Stmt::Function(decl) => self.print_function("fun", decl),
            Stmt::Return(stmt) => match &stmt.value {
                Some(value) => format!("(return {})", self.print_expr(value)),
                None => "(return)".to_string(),
            },
            Stmt::Class(class) => {
                let mut out = format!("(class {}", class.name.name);
                for superclass in &class.superclasses {
                    out.push_str(&format!(" (< {})", superclass.name.name));
                }
                for method in &class.class_methods {
                    out.push(' ');
                    out.push_str(&self.print_function("class-method", method));
                }
                for method in &class.methods {
                    out.push(' ');
                    out.push_str(&self.print_function("method", method));
                }
                out.push(')');
                out
            }
        }
    }

    /// Render a single expression.
    pub fn print_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(value) => self.print_literal(value),
            Expr::Grouping(inner) => format!("(group {})", self.print_expr(inner)),
            Expr::Unary(unary) => {
                let op = match unary.op {
                    UnOp::Neg => "-",
                    UnOp::Not => "!",
                };
                format!("({} {})", op, self.print_expr(&unary.operand))
            }
            Expr::Binary(binary) => {
                let left = match &binary.left {
                    Some(left) => self.print_expr(left),
                    None => "_".to_string(),
                };
                format!(
                    "({} {} {})",
                    binop_lexeme(binary.op),
                    left,
                    self.print_expr(&binary.right)
                )
            }
            Expr::Ternary(ternary) => format!(
                "(?: {} {} {})",
                self.print_expr(&ternary.cond),
                self.print_expr(&ternary.then),
                self.print_expr(&ternary.otherwise)
            ),
            Expr::Logical(logical) => {
                let op = match logical.op {
                    LogicalOp::And => "and",
                    LogicalOp::Or => "or",
                };
                format!(
                    "({} {} {})",
                    op,
                    self.print_expr(&logical.left),
                    self.print_expr(&logical.right)
                )
            }
            Expr::Variable(var) => var.name.name.to_string(),
            Expr::Assign(assign) => {
                format!("(= {} {})", assign.name.name, self.print_expr(&assign.value))
            }
            Expr::Call(call) => {
                let mut out = format!("(call {}", self.print_expr(&call.callee));
                for arg in &call.args {
                    out.push(' ');
                    out.push_str(&self.print_expr(arg));
                }
                out.push(')');
                out
            }
            Expr::Get(get) => format!("(. {} {})", self.print_expr(&get.object), get.name.name),
            Expr::Set(set) => format!(
                "(= (. {} {}) {})",
                self.print_expr(&set.object),
                set.name.name,
                self.print_expr(&set.value)
            ),
            Expr::This(_) => "this".to_string(),
            Expr::Super(sup) => format!("(super {})", sup.method.name),
            Expr::Lambda(decl) => self.print_function("lambda", decl),
        }
    }

    fn print_function(&self, keyword: &str, decl: &FunctionDecl) -> String {
        let mut out = format!("({keyword}");
        if let Some(name) = decl.name {
            out.push(' ');
            out.push_str(name.name.as_str());
        }
        if !decl.is_getter {
            out.push_str(" (");
            for (i, param) in decl.params.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push_str(param.name.as_str());
            }
            out.push(')');
        }
        for stmt in &decl.body {
            out.push(' ');
            out.push_str(&self.print_stmt(stmt));
        }
        out.push(')');
        out
    }

    fn print_literal(&self, value: &LitValue) -> String {
        match value {
            LitValue::Nil => "nil".to_string(),
            LitValue::Bool(b) => b.to_string(),
            LitValue::Number(n) => n.to_string(),
            LitValue::Str(s) => format!("\"{s}\""),
        }
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

fn binop_lexeme(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::Comma => ",",
    }
}
