//! loxi-lex - Lexical Analyzer
//!
//! Single left-to-right pass over the Unicode-decoded source, producing a
//! token stream terminated by [`Token::Eof`]. Whitespace and comments
//! (line comments and nestable block comments) are skipped; every emitted
//! token records its source [`Span`](loxi_util::Span), including the line
//! number diagnostics report.
//!
//! Lexical errors ("Unexpected character.", "Unterminated string.") are
//! reported to the shared [`Handler`](loxi_util::Handler) and lexing
//! continues, so a single pass collects every lexical diagnostic in the
//! source.

pub mod cursor;
mod edge_cases;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{SpannedToken, Token};
