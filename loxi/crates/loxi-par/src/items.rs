//! Declaration parsing: classes, functions, and variables.

use std::rc::Rc;

use loxi_lex::Token;

use crate::ast::*;
use crate::Parser;

/// What kind of function is being parsed; selects diagnostic wording and
/// whether getter syntax (no parameter list) is allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FunctionKind {
    Function,
    Method,
    ClassMethod,
    Lambda,
}

impl FunctionKind {
    fn label(self) -> &'static str {
        match self {
            FunctionKind::Function => "function",
            FunctionKind::Method => "method",
            FunctionKind::ClassMethod => "class method",
            FunctionKind::Lambda => "lambda",
        }
    }

    /// Getters exist only inside class bodies.
    fn allows_getter(self) -> bool {
        matches!(self, FunctionKind::Method | FunctionKind::ClassMethod)
    }
}

impl<'a> Parser<'a> {
    /// Parse a class declaration; the `class` keyword is already consumed.
    ///
    /// ```text
    /// classDecl → "class" IDENT ( "<" IDENT )* "{" member* "}"
    /// member    → "class" function | function
    /// ```
    ///
    /// Zero or more `< IDENT` clauses list direct superclasses in order.
    /// A member prefixed with `class` is a class method; a member without a
    /// parameter list is a getter.
    pub(crate) fn class_declaration(&mut self) -> Option<Stmt> {
        let name = self.expect_ident("Expect class name.")?;

        let mut superclasses = Vec::new();
        while !self.check(Token::LBrace) && !self.is_at_end() {
            self.expect(Token::Less, "Expect '<' before superclass name.")?;
            let superclass = self.expect_ident("Expect superclass name.")?;
            superclasses.push(VariableExpr {
                id: self.ids().next(),
                name: superclass,
            });
        }

        self.expect(Token::LBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        let mut class_methods = Vec::new();
        while !self.check(Token::RBrace) && !self.is_at_end() {
            if self.match_token(Token::Class) {
                class_methods.push(self.named_function(FunctionKind::ClassMethod)?);
            } else {
                methods.push(self.named_function(FunctionKind::Method)?);
            }
        }

        self.expect(Token::RBrace, "Expect '}' after class body.")?;

        Some(Stmt::Class(ClassDecl {
            name,
            superclasses,
            methods,
            class_methods,
        }))
    }

    /// Parse a named function declaration; the `fun` keyword (or class
    /// member position) is already consumed.
    pub(crate) fn function_declaration(&mut self, kind: FunctionKind) -> Option<Stmt> {
        let decl = self.named_function(kind)?;
        Some(Stmt::Function(decl))
    }

    /// Parse `IDENT ( "(" params? ")" )? block` into a declaration.
    fn named_function(&mut self, kind: FunctionKind) -> Option<Rc<FunctionDecl>> {
        let name = self.expect_ident(&format!("Expect {} name.", kind.label()))?;
        self.finish_function(Some(name), kind)
    }

    /// Parse the parameter list and body shared by named functions and
    /// lambdas.
    ///
    /// Parameters are capped at 255; exceeding the cap is a diagnostic but
    /// parsing continues. The body parses with a fresh loop context so
    /// `break` cannot reach a loop outside the function.
    pub(crate) fn finish_function(
        &mut self,
        name: Option<Ident>,
        kind: FunctionKind,
    ) -> Option<Rc<FunctionDecl>> {
        let mut params = Vec::new();
        let mut is_getter = false;

        if kind.allows_getter() && !self.check(Token::LParen) {
            is_getter = true;
        } else {
            self.expect(
                Token::LParen,
                &format!("Expect '(' after {} name.", kind.label()),
            )?;
            if !self.check(Token::RParen) {
                loop {
                    if params.len() >= 255 {
                        self.error_at_current("Can't have more than 255 parameters.");
                    }
                    params.push(self.expect_ident("Expect parameter name.")?);
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(Token::RParen, "Expect ')' after parameters.")?;
        }

        self.expect(
            Token::LBrace,
            &format!("Expect '{{' before {} body.", kind.label()),
        )?;
        let body = self.outside_loops(|p| p.block())?;

        Some(Rc::new(FunctionDecl {
            name,
            params,
            body,
            is_getter,
        }))
    }

    /// Parse a variable declaration; the `var` keyword is already consumed.
    ///
    /// Without an initializer the variable is declared uninitialized,
    /// which is not the same as `= nil`.
    pub(crate) fn var_declaration(&mut self) -> Option<Stmt> {
        let name = self.expect_ident("Expect variable name.")?;

        let init = if self.match_token(Token::Eq) {
            Some(self.expression()?)
        } else {
            None
        };

        self.expect(Token::Semicolon, "Expect ';' after variable declaration.")?;
        Some(Stmt::Var(VarStmt { name, init }))
    }
}
