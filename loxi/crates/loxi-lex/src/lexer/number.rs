//! Number literal lexing.
//!
//! Lox numbers match `DIGIT+ ( '.' DIGIT+ )?` and are parsed to binary64.
//! A trailing `.` without a following digit is not part of the number, so
//! `3.` lexes as the number `3` followed by a dot token.

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a number literal.
    pub(crate) fn lex_number(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let text = self.cursor.slice_from(self.token_start);
        match text.parse::<f64>() {
            Ok(value) => Token::Number(value),
            Err(_) => {
                self.report_error(format!("Invalid number literal '{text}'."));
                Token::Number(0.0)
            }
        }
    }
}
