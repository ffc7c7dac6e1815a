//! Edge case tests for loxi-lex.

#[cfg(test)]
mod tests {
    use crate::{Lexer, Token};
    use loxi_util::{Handler, Symbol};

    fn lex_all(source: &str) -> Vec<Token> {
        let handler = Handler::new();
        Lexer::new(source, &handler)
            .tokenize()
            .into_iter()
            .map(|t| t.token)
            .filter(|t| *t != Token::Eof)
            .collect()
    }

    fn count(tokens: &[Token], needle: Token) -> usize {
        tokens.iter().filter(|t| **t == needle).count()
    }

    #[test]
    fn test_edge_empty_source() {
        assert!(lex_all("").is_empty());
    }

    #[test]
    fn test_edge_whitespace_only() {
        assert!(lex_all("  \t\r\n  \n").is_empty());
    }

    #[test]
    fn test_edge_single_char_ident() {
        assert_eq!(lex_all("x"), vec![Token::Ident(Symbol::intern("x"))]);
    }

    #[test]
    fn test_edge_long_identifier() {
        let name = "a".repeat(10_000);
        let tokens = lex_all(&format!("var {name} = 1;"));
        assert!(tokens.contains(&Token::Ident(Symbol::intern(&name))));
    }

    #[test]
    fn test_edge_braces_preserved_in_output() {
        let source = "class A { m() { if (true) { print 1; } } }";
        let tokens = lex_all(source);
        assert_eq!(count(&tokens, Token::LBrace), 3);
        assert_eq!(count(&tokens, Token::RBrace), 3);
    }

    #[test]
    fn test_edge_braces_inside_comments_not_emitted() {
        let tokens = lex_all("{ /* { nested { */ }");
        assert_eq!(count(&tokens, Token::LBrace), 1);
        assert_eq!(count(&tokens, Token::RBrace), 1);
    }

    #[test]
    fn test_edge_adjacent_operators() {
        assert_eq!(lex_all("<=="), vec![Token::LessEq, Token::Eq]);
        assert_eq!(lex_all("==="), vec![Token::EqEq, Token::Eq]);
        assert_eq!(lex_all("!!"), vec![Token::Bang, Token::Bang]);
    }

    #[test]
    fn test_edge_division_vs_comment() {
        assert_eq!(
            lex_all("1 / 2"),
            vec![Token::Number(1.0), Token::Slash, Token::Number(2.0)]
        );
        assert_eq!(lex_all("1 // 2"), vec![Token::Number(1.0)]);
    }

    #[test]
    fn test_edge_errors_do_not_stop_lexing() {
        let handler = Handler::new();
        let tokens = Lexer::new("# $ ~ print", &handler).tokenize();
        assert_eq!(handler.error_count(), 3);
        assert_eq!(tokens[0].token, Token::Print);
    }

    #[test]
    fn test_edge_lexeme_round_trip() {
        // Re-lexing the space-joined lexemes preserves identifier and
        // keyword identity.
        let source = "fun add ( a , b ) { return a + b ; }";
        let once = lex_all(source);
        let rendered = once
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(lex_all(&rendered), once);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Braces in source (outside comments and strings) survive to
            // the token stream one-for-one.
            #[test]
            fn brace_tokens_preserved(source in "[{} ;\n]{0,200}") {
                let opens = source.matches('{').count();
                let closes = source.matches('}').count();
                let tokens = lex_all(&source);
                prop_assert_eq!(count(&tokens, Token::LBrace), opens);
                prop_assert_eq!(count(&tokens, Token::RBrace), closes);
            }

            // The lexer terminates and never panics on arbitrary input.
            #[test]
            fn lexing_always_terminates(source in ".{0,400}") {
                let handler = Handler::new();
                let tokens = Lexer::new(&source, &handler).tokenize();
                prop_assert_eq!(tokens.last().map(|t| t.token), Some(Token::Eof));
            }
        }
    }
}
