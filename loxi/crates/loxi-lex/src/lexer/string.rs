//! String literal lexing.
//!
//! Strings are delimited by double quotes and may span lines. Escape
//! sequences are not interpreted; the literal value is the raw inner text.

use loxi_util::Symbol;

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a string literal.
    ///
    /// An unterminated string at end of file is reported as a diagnostic;
    /// the text consumed so far is returned as the token payload so the
    /// parser still sees a well-formed stream.
    pub(crate) fn lex_string(&mut self) -> Token {
        self.cursor.advance();
        let content_start = self.cursor.position();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '"' {
            self.cursor.advance();
        }

        if self.cursor.is_at_end() {
            self.report_error("Unterminated string.");
            let content = self.cursor.slice_from(content_start);
            return Token::Str(Symbol::intern(content));
        }

        let content = self.cursor.slice_from(content_start);
        self.cursor.advance();
        Token::Str(Symbol::intern(content))
    }
}
