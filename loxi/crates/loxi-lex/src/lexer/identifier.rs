//! Identifier and reserved-word lexing.

use loxi_util::Symbol;

use crate::lexer::core::is_ident_continue;
use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes an identifier or reserved word.
    ///
    /// Identifiers match `[A-Za-z_][A-Za-z_0-9]*`. The lexeme is interned
    /// and checked against the pre-interned keyword table.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        self.cursor.advance();
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        let sym = Symbol::intern(text);
        Token::keyword(sym).unwrap_or(Token::Ident(sym))
    }
}
