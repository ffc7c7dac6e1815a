//! loxi-drv - Driver
//!
//! Orchestrates the pipeline (lex → parse → resolve → interpret), renders
//! diagnostics, and owns the process state that persists across REPL lines:
//! the interpreter (globals and accumulated resolutions), the diagnostic
//! handler, and the node-id generator.
//!
//! Exit-code contract:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 64 | bad usage |
//! | 65 | a static diagnostic was reported |
//! | 70 | a runtime error occurred |

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use loxi_lex::{Lexer, Token};
use loxi_par::{AstPrinter, Parser};
use loxi_runtime::Interpreter;
use loxi_sem::resolve_program;
use loxi_util::{Diagnostic, Handler, Level, NodeIdGenerator};

/// Result of running one source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Ok,
    HadError,
    HadRuntimeError,
}

impl RunOutcome {
    /// The process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Ok => 0,
            RunOutcome::HadError => 65,
            RunOutcome::HadRuntimeError => 70,
        }
    }
}

/// Process-wide interpreter session.
///
/// A session is reused across REPL lines; the globals frame, the global
/// name→slot map, the accumulated resolver side-table, and the sticky
/// runtime-error flag all survive from line to line. Static diagnostics are
/// cleared per line.
pub struct Session {
    handler: Handler,
    interpreter: Interpreter,
    ids: NodeIdGenerator,
    repl: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            handler: Handler::new(),
            interpreter: Interpreter::new(),
            ids: NodeIdGenerator::new(),
            repl: false,
        }
    }

    /// Run a source string through the full pipeline.
    ///
    /// In REPL mode, a line whose last token before `Eof` is not `;` is
    /// treated as a single expression: it is evaluated and its stringified
    /// value printed. Everything else runs as statements. Evaluation only
    /// happens if lexing, parsing, and resolving raised no error.
    pub fn run(&mut self, source: &str) -> RunOutcome {
        let tokens = Lexer::new(source, &self.handler).tokenize();
        debug!(tokens = tokens.len(), "lexed");

        if self.repl && is_expression_line(&tokens) {
            return self.run_expression(tokens);
        }

        let statements = Parser::new(tokens, &self.ids, &self.handler).parse();
        debug!(statements = statements.len(), "parsed");
        if self.handler.has_errors() {
            return self.finish();
        }

        let bindings = resolve_program(&statements, &self.handler);
        debug!(resolved = bindings.len(), "resolved");
        if self.handler.has_errors() {
            return self.finish();
        }

        self.interpreter.add_bindings(bindings);
        self.interpreter.interpret(&statements, &self.handler);
        self.finish()
    }

    /// REPL expression mode: evaluate and print the value.
    ///
    /// The resolver is skipped; names in a bare expression resolve as
    /// globals.
    fn run_expression(&mut self, tokens: Vec<loxi_lex::SpannedToken>) -> RunOutcome {
        let expr = Parser::new(tokens, &self.ids, &self.handler).parse_expression();
        if self.handler.has_errors() {
            return self.finish();
        }
        let Some(expr) = expr else {
            return self.finish();
        };

        match self.interpreter.evaluate_expression(&expr) {
            Ok(value) => println!("{value}"),
            Err(error) => self.handler.runtime_error(error.span, error.message),
        }
        self.finish()
    }

    /// Lex the source and print the token stream.
    pub fn emit_tokens(&mut self, source: &str) -> RunOutcome {
        let tokens = Lexer::new(source, &self.handler).tokenize();
        for token in &tokens {
            println!("[line {}] {}", token.line(), token.token);
        }
        self.finish()
    }

    /// Parse the source and print the AST in prefix notation.
    pub fn emit_ast(&mut self, source: &str) -> RunOutcome {
        let tokens = Lexer::new(source, &self.handler).tokenize();
        let statements = Parser::new(tokens, &self.ids, &self.handler).parse();
        if !self.handler.has_errors() {
            println!("{}", AstPrinter::new().print_program(&statements));
        }
        self.finish()
    }

    /// Run a script file.
    pub fn run_file(&mut self, path: &Path) -> anyhow::Result<RunOutcome> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Ok(self.run(&source))
    }

    /// Interactive prompt. Static errors clear between lines so one bad
    /// line does not poison the session; runtime errors are reported but do
    /// not end the loop.
    pub fn run_prompt(&mut self) -> io::Result<()> {
        self.repl = true;
        let stdin = io::stdin();
        let mut line = String::new();

        loop {
            print!(">>> ");
            io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }
            self.run(&line);
            self.handler.clear_static();
        }
    }

    /// Drain and render collected diagnostics, then classify the run.
    fn finish(&mut self) -> RunOutcome {
        let diagnostics = self.handler.take_diagnostics();
        for diagnostic in &diagnostics {
            eprintln!("{}", render_diagnostic(diagnostic));
        }

        let runtime_errors = self.handler.take_runtime_errors();
        for error in &runtime_errors {
            eprintln!("{}\n[line {}]", error.message, error.span.line);
        }

        if self.handler.has_errors() {
            RunOutcome::HadError
        } else if !runtime_errors.is_empty() {
            RunOutcome::HadRuntimeError
        } else {
            RunOutcome::Ok
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// A REPL line is an expression when its last token before `Eof` is not a
/// semicolon.
fn is_expression_line(tokens: &[loxi_lex::SpannedToken]) -> bool {
    if tokens.len() < 2 {
        return false;
    }
    tokens[tokens.len() - 2].token != Token::Semicolon
}

/// `[line N] Error at 'x': message` / `[line N] Warning: message`
fn render_diagnostic(diagnostic: &Diagnostic) -> String {
    let level = match diagnostic.level {
        Level::Error => "Error",
        Level::Warning => "Warning",
    };
    match &diagnostic.label {
        Some(label) => format!(
            "[line {}] {} {}: {}",
            diagnostic.span.line, level, label, diagnostic.message
        ),
        None => format!(
            "[line {}] {}: {}",
            diagnostic.span.line, level, diagnostic.message
        ),
    }
}
