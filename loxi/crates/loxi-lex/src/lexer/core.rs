//! Core lexer implementation.
//!
//! This module contains the main Lexer struct and its dispatch loop.

use loxi_util::{Handler, Span};

use crate::cursor::Cursor;
use crate::token::{SpannedToken, Token};

/// Lexer for the Lox language.
///
/// Transforms source text into a stream of tokens, reporting lexical errors
/// to the shared diagnostic handler and continuing, so one pass collects
/// every lexical diagnostic.
pub struct Lexer<'a> {
    /// Character cursor for source traversal.
    pub(crate) cursor: Cursor<'a>,

    /// Diagnostic sink for lexical errors.
    handler: &'a Handler,

    /// Starting byte offset of the current token.
    pub(crate) token_start: usize,

    /// Line number where the current token starts (1-based).
    token_start_line: u32,

    /// Column number where the current token starts (1-based).
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source code.
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Returns the next token with its span.
    ///
    /// Skips whitespace and comments, then dispatches on the current
    /// character. Unknown characters are reported and skipped, so this
    /// always makes progress and eventually returns `Eof`.
    pub fn next_token(&mut self) -> SpannedToken {
        loop {
            self.skip_whitespace_and_comments();

            self.token_start = self.cursor.position();
            self.token_start_line = self.cursor.line();
            self.token_start_column = self.cursor.column();

            if self.cursor.is_at_end() {
                return self.spanned(Token::Eof);
            }

            let token = match self.cursor.current_char() {
                '(' => {
                    self.cursor.advance();
                    Token::LParen
                }
                ')' => {
                    self.cursor.advance();
                    Token::RParen
                }
                '{' => {
                    self.cursor.advance();
                    Token::LBrace
                }
                '}' => {
                    self.cursor.advance();
                    Token::RBrace
                }
                ',' => {
                    self.cursor.advance();
                    Token::Comma
                }
                '.' => {
                    self.cursor.advance();
                    Token::Dot
                }
                '-' => {
                    self.cursor.advance();
                    Token::Minus
                }
                '+' => {
                    self.cursor.advance();
                    Token::Plus
                }
                ';' => {
                    self.cursor.advance();
                    Token::Semicolon
                }
                '*' => {
                    self.cursor.advance();
                    Token::Star
                }
                '?' => {
                    self.cursor.advance();
                    Token::Question
                }
                ':' => {
                    self.cursor.advance();
                    Token::Colon
                }
                '/' => {
                    // Comments were consumed above, so this is division.
                    self.cursor.advance();
                    Token::Slash
                }
                '!' => {
                    self.cursor.advance();
                    if self.cursor.match_char('=') {
                        Token::BangEq
                    } else {
                        Token::Bang
                    }
                }
                '=' => {
                    self.cursor.advance();
                    if self.cursor.match_char('=') {
                        Token::EqEq
                    } else {
                        Token::Eq
                    }
                }
                '<' => {
                    self.cursor.advance();
                    if self.cursor.match_char('=') {
                        Token::LessEq
                    } else {
                        Token::Less
                    }
                }
                '>' => {
                    self.cursor.advance();
                    if self.cursor.match_char('=') {
                        Token::GreaterEq
                    } else {
                        Token::Greater
                    }
                }
                '"' => self.lex_string(),
                c if c.is_ascii_digit() => self.lex_number(),
                c if is_ident_start(c) => self.lex_identifier(),
                _ => {
                    self.report_error("Unexpected character.");
                    self.cursor.advance();
                    continue;
                }
            };

            return self.spanned(token);
        }
    }

    /// Lexes the entire source into an `Eof`-terminated token vector.
    pub fn tokenize(mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token == Token::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Wraps a token with the span of the current lexeme.
    fn spanned(&self, token: Token) -> SpannedToken {
        SpannedToken::new(token, self.current_span())
    }

    /// The span from the start of the current token to the cursor.
    pub(crate) fn current_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    /// Reports a lexical error at the current token position.
    pub(crate) fn report_error(&mut self, message: impl Into<String>) {
        self.handler.error(self.current_span(), message);
    }
}

/// Whether `c` can begin an identifier.
pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether `c` can continue an identifier.
pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
