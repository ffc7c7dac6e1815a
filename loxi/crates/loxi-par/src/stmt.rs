//! Statement parsing.

use loxi_lex::Token;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parse a statement.
    pub(crate) fn statement(&mut self) -> Option<Stmt> {
        match self.current() {
            Token::Break => {
                self.advance();
                self.break_statement()
            }
            Token::For => {
                self.advance();
                self.for_statement()
            }
            Token::If => {
                self.advance();
                self.if_statement()
            }
            Token::Print => {
                self.advance();
                self.print_statement()
            }
            Token::Return => {
                self.advance();
                self.return_statement()
            }
            Token::While => {
                self.advance();
                self.while_statement()
            }
            Token::LBrace => {
                self.advance();
                Some(Stmt::Block(self.block()?))
            }
            _ => self.expression_statement(),
        }
    }

    /// Parse the statements of a block; the `{` is already consumed.
    pub(crate) fn block(&mut self) -> Option<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(Token::RBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.expect(Token::RBrace, "Expect '}' after block.")?;
        Some(statements)
    }

    fn print_statement(&mut self) -> Option<Stmt> {
        let value = self.expression()?;
        self.expect(Token::Semicolon, "Expect ';' after value.")?;
        Some(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.expression()?;
        self.expect(Token::Semicolon, "Expect ';' after value.")?;
        Some(Stmt::Expression(expr))
    }

    fn if_statement(&mut self) -> Option<Stmt> {
        self.expect(Token::LParen, "Expect '(' after 'if'.")?;
        let cond = self.expression()?;
        self.expect(Token::RParen, "Expect ')' after 'if'.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(Token::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Some(Stmt::If(IfStmt {
            cond,
            then_branch,
            else_branch,
        }))
    }

    fn while_statement(&mut self) -> Option<Stmt> {
        self.expect(Token::LParen, "Expect '(' after 'while'.")?;
        let cond = self.expression()?;
        self.expect(Token::RParen, "Expect ')' after 'while'.")?;

        let body = self.in_loop(|p| p.statement())?;
        Some(Stmt::While(WhileStmt {
            cond,
            body: Box::new(body),
        }))
    }

    /// Parse a `for` loop, desugaring it into existing nodes:
    ///
    /// ```text
    /// for (init; cond; incr) body
    ///   ⇒ { init; while (cond) { body; incr; } }
    /// ```
    ///
    /// An absent condition becomes `true`.
    fn for_statement(&mut self) -> Option<Stmt> {
        self.expect(Token::LParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_token(Token::Semicolon) {
            None
        } else if self.match_token(Token::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let cond = if !self.check(Token::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(Token::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(Token::RParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(Token::RParen, "Expect ')' after for clauses.")?;

        let mut body = self.in_loop(|p| p.statement())?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }
        let cond = cond.unwrap_or(Expr::Literal(LitValue::Bool(true)));
        body = Stmt::While(WhileStmt {
            cond,
            body: Box::new(body),
        });
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Some(body)
    }

    fn return_statement(&mut self) -> Option<Stmt> {
        let keyword = self.previous();
        let value = if !self.check(Token::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(Token::Semicolon, "Expect ';' after return value.")?;

        Some(Stmt::Return(ReturnStmt {
            keyword_span: keyword.span,
            value,
        }))
    }

    fn break_statement(&mut self) -> Option<Stmt> {
        let keyword = self.previous();
        self.expect(Token::Semicolon, "Expect ';' after 'break'.")?;
        if self.loop_depth() == 0 {
            self.error_at(keyword, "'break' only allowed inside loops.");
            return None;
        }
        Some(Stmt::Break(keyword.span))
    }
}
