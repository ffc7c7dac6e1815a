//! loxi-par - Parser (Syntactic Analyzer)
//!
//! Recursive-descent parser with panic-mode error recovery. The expression
//! grammar is driven by a Pratt loop over a named binding-power table (see
//! [`expr::bp`]); statements and declarations are plain descent.
//!
//! Error handling follows the convention of the rest of the pipeline:
//! diagnostics go to the shared [`Handler`], and a parse function that has
//! already reported returns `None`. On a failed declaration the parser
//! synchronizes - it skips forward past the next `;` or to a token that can
//! begin a declaration - and carries on, so one parse collects every syntax
//! error in the source.
//!
//! Grammar (precedence low to high):
//!
//! ```text
//! program     → declaration* EOF
//! declaration → classDecl | funDecl | varDecl | statement
//! expression  → comma
//! comma       → assignment ( "," assignment )*
//! assignment  → ( call "." IDENT | IDENT ) "=" assignment | logic_or
//! logic_or    → logic_and ( "or" logic_and )*
//! logic_and   → ternary ( "and" ternary )*
//! ternary     → equality ( "?" equality ":" ternary )?
//! equality    → comparison ( ( "!=" | "==" ) comparison )*
//! comparison  → term ( ( ">" | ">=" | "<" | "<=" ) term )*
//! term        → factor ( ( "-" | "+" ) factor )*
//! factor      → unary ( ( "/" | "*" ) unary )*
//! unary       → ( "!" | "-" ) unary | call
//! call        → primary ( "(" args? ")" | "." IDENT )*
//! ```

pub mod ast;
mod edge_cases;
pub mod expr;
pub mod items;
pub mod printer;
pub mod stmt;

pub use ast::*;
pub use printer::AstPrinter;

use loxi_lex::{SpannedToken, Token};
use loxi_util::{Diagnostic, Handler, NodeIdGenerator, Span};

/// Recursive-descent parser over a buffered token stream.
pub struct Parser<'a> {
    /// Token stream from the lexer, `Eof`-terminated.
    tokens: Vec<SpannedToken>,

    /// Current position in the token stream.
    position: usize,

    /// Nesting depth of enclosing loops; `break` outside any loop is a
    /// diagnostic. Saved and restored around function bodies so a loop
    /// does not leak into a nested function.
    loop_depth: usize,

    /// Generator for node ids. Owned by the caller so ids stay unique
    /// across REPL lines.
    ids: &'a NodeIdGenerator,

    /// Diagnostic sink.
    handler: &'a Handler,
}

impl<'a> Parser<'a> {
    /// Create a parser over an `Eof`-terminated token stream.
    pub fn new(
        tokens: Vec<SpannedToken>,
        ids: &'a NodeIdGenerator,
        handler: &'a Handler,
    ) -> Self {
        let mut tokens = tokens;
        if tokens.is_empty() {
            tokens.push(SpannedToken::new(Token::Eof, Span::DUMMY));
        }
        Self {
            tokens,
            position: 0,
            loop_depth: 0,
            ids,
            handler,
        }
    }

    /// Parse a complete program: `declaration* EOF`.
    ///
    /// Declarations that fail to parse are dropped after synchronization;
    /// their diagnostics are already in the handler.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        statements
    }

    /// Parse a single expression, for the REPL's expression-printing mode.
    pub fn parse_expression(&mut self) -> Option<Expr> {
        self.expression()
    }

    /// Parse one declaration, synchronizing on failure.
    pub(crate) fn declaration(&mut self) -> Option<Stmt> {
        let result = match self.current() {
            Token::Class => {
                self.advance();
                self.class_declaration()
            }
            // `fun` directly followed by an identifier is a declaration; a
            // bare `fun (` begins a lambda expression statement.
            Token::Fun if matches!(self.peek_ahead(1).token, Token::Ident(_)) => {
                self.advance();
                self.function_declaration(items::FunctionKind::Function)
            }
            Token::Var => {
                self.advance();
                self.var_declaration()
            }
            _ => self.statement(),
        };

        if result.is_none() {
            self.synchronize();
        }
        result
    }

    /// Panic-mode recovery: skip forward until a statement boundary.
    ///
    /// Discards tokens until just past a `;` or up to a token that can
    /// begin a declaration.
    fn synchronize(&mut self) {
        if !self.is_at_end() {
            self.advance();
        }

        while !self.is_at_end() {
            if self.previous().token == Token::Semicolon {
                return;
            }
            if self.current().starts_declaration() {
                return;
            }
            self.advance();
        }
    }

    // =========================================================================
    // Token stream helpers
    // =========================================================================

    /// The current token.
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.position].token
    }

    /// The current token with its span.
    pub(crate) fn peek(&self) -> SpannedToken {
        self.tokens[self.position]
    }

    /// The token `n` positions ahead, clamped to the trailing `Eof`.
    pub(crate) fn peek_ahead(&self, n: usize) -> SpannedToken {
        let index = (self.position + n).min(self.tokens.len() - 1);
        self.tokens[index]
    }

    /// The most recently consumed token.
    pub(crate) fn previous(&self) -> SpannedToken {
        self.tokens[self.position.saturating_sub(1)]
    }

    /// Whether the stream is exhausted.
    pub(crate) fn is_at_end(&self) -> bool {
        *self.current() == Token::Eof
    }

    /// Consume and return the current token.
    pub(crate) fn advance(&mut self) -> SpannedToken {
        let token = self.tokens[self.position];
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    /// Whether the current token equals `expected` (payload-free kinds).
    pub(crate) fn check(&self, expected: Token) -> bool {
        *self.current() == expected
    }

    /// Consume the current token if it equals `expected`.
    pub(crate) fn match_token(&mut self, expected: Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token, reporting an error if absent.
    pub(crate) fn expect(&mut self, expected: Token, message: &str) -> Option<SpannedToken> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(message);
            None
        }
    }

    /// Expect an identifier, reporting an error if absent.
    pub(crate) fn expect_ident(&mut self, message: &str) -> Option<Ident> {
        if let Token::Ident(name) = *self.current() {
            let token = self.advance();
            Some(Ident {
                name,
                span: token.span,
            })
        } else {
            self.error_at_current(message);
            None
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Report an error at the current token.
    pub(crate) fn error_at_current(&mut self, message: &str) {
        let token = self.peek();
        self.error_at(token, message);
    }

    /// Report an error at a specific token, labelled with its lexeme.
    pub(crate) fn error_at(&mut self, token: SpannedToken, message: &str) {
        let label = if token.token == Token::Eof {
            "at end".to_string()
        } else {
            format!("at '{}'", token.token)
        };
        self.handler
            .emit(Diagnostic::error(message, token.span).with_label(label));
    }

    /// The shared node-id generator.
    pub(crate) fn ids(&self) -> &NodeIdGenerator {
        self.ids
    }

    /// Current loop nesting depth.
    pub(crate) fn loop_depth(&self) -> usize {
        self.loop_depth
    }

    /// Run `body` with the loop depth incremented.
    pub(crate) fn in_loop<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        self.loop_depth += 1;
        let result = body(self);
        self.loop_depth -= 1;
        result
    }

    /// Run `body` with a fresh loop context, as at a function boundary.
    pub(crate) fn outside_loops<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::take(&mut self.loop_depth);
        let result = body(self);
        self.loop_depth = saved;
        result
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::parse_source;
    use super::*;

    #[test]
    fn test_empty_program() {
        let (statements, handler) = parse_source("");
        assert!(statements.is_empty());
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_error_recovery_keeps_later_statements() {
        let (statements, handler) = parse_source("var = 1; print 2;");
        assert!(handler.has_errors());
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Print(_)));
    }

    #[test]
    fn test_synchronize_at_declaration_keyword() {
        let (statements, handler) = parse_source("1 + ; class A {}");
        assert!(handler.has_errors());
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Class(_)));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let (_, handler) = parse_source("var = 1; var = 2;");
        assert_eq!(handler.error_count(), 2);
    }

    #[test]
    fn test_error_label_at_end() {
        let (_, handler) = parse_source("print 1");
        assert!(handler.has_errors());
        let diags = handler.take_diagnostics();
        assert_eq!(diags[0].label.as_deref(), Some("at end"));
    }
}
