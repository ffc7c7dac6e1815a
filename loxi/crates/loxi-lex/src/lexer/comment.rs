//! Comment lexing.
//!
//! Line comments run to the end of the line. Block comments nest: a depth
//! counter tracks `/*` and `*/` pairs until balanced.

use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Skips whitespace and comments before the next token.
    pub(crate) fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.cursor.is_at_end() {
                return;
            }

            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' => {
                    let next = self.cursor.peek_char(1);
                    if next == '/' {
                        self.skip_line_comment();
                    } else if next == '*' {
                        self.token_start = self.cursor.position();
                        self.skip_block_comment();
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Skips a line comment (from `//` to the end of the line).
    fn skip_line_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
    }

    /// Skips a block comment, tracking nesting depth until balanced.
    fn skip_block_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();
        let mut depth: u32 = 1;

        while depth > 0 && !self.cursor.is_at_end() {
            if self.cursor.current_char() == '/' && self.cursor.peek_char(1) == '*' {
                self.cursor.advance();
                self.cursor.advance();
                depth += 1;
            } else if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                depth -= 1;
            } else {
                self.cursor.advance();
            }
        }

        if depth > 0 {
            self.report_error("Unterminated block comment.");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Lexer, Token};
    use loxi_util::{Handler, Symbol};

    fn first_token(source: &str) -> Token {
        let handler = Handler::new();
        Lexer::new(source, &handler).next_token().token
    }

    #[test]
    fn test_skip_line_comment() {
        assert_eq!(
            first_token("// comment\nhello"),
            Token::Ident(Symbol::intern("hello"))
        );
    }

    #[test]
    fn test_skip_block_comment() {
        assert_eq!(
            first_token("/* comment */hello"),
            Token::Ident(Symbol::intern("hello"))
        );
    }

    #[test]
    fn test_skip_nested_block_comment() {
        assert_eq!(
            first_token("/* outer /* inner */ still outer */hello"),
            Token::Ident(Symbol::intern("hello"))
        );
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let handler = Handler::new();
        let token = Lexer::new("/* a\nb\nc */ x", &handler).next_token();
        assert_eq!(token.token, Token::Ident(Symbol::intern("x")));
        assert_eq!(token.line(), 3);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let handler = Handler::new();
        let token = Lexer::new("/* never closed", &handler).next_token();
        assert_eq!(token.token, Token::Eof);
        assert!(handler.has_errors());
    }

    #[test]
    fn test_line_comment_at_eof() {
        assert_eq!(first_token("// nothing else"), Token::Eof);
    }
}
