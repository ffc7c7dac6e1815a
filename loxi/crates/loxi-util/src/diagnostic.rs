//! Diagnostic sink - error and warning collection.
//!
//! Every pipeline stage reports through a shared [`Handler`]. The core never
//! formats messages for the user; the driver drains the collected
//! [`Diagnostic`]s and renders them. Three channels exist:
//!
//! - `error`: static diagnostics from the lexer, parser, and resolver.
//!   Collecting continues after an error; evaluation is skipped if any were
//!   raised.
//! - `warning`: non-fatal (currently only the unused-local warning).
//! - `runtime_error`: reported once by the evaluator at the interpret
//!   boundary. Sets a sticky flag that outlives [`Handler::clear_static`],
//!   matching the REPL contract (static errors reset per line, runtime
//!   errors do not).

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::Span;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// A static error; evaluation will be skipped.
    Error,
    /// A warning; never affects control flow.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "Error"),
            Level::Warning => write!(f, "Warning"),
        }
    }
}

/// A diagnostic message with severity and location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity level.
    pub level: Level,
    /// Main message text.
    pub message: String,
    /// Source location.
    pub span: Span,
    /// Optional locus text, e.g. `at 'foo'` or `at end`. Supplied by the
    /// stage that knows the offending token; rendered by the driver.
    pub label: Option<String>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            label: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    /// Attach a locus label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Collector for diagnostics from all pipeline stages.
///
/// # Examples
///
/// ```
/// use loxi_util::{Handler, Span};
///
/// let handler = Handler::new();
/// handler.error(Span::DUMMY, "Unexpected character.");
/// assert!(handler.has_errors());
/// ```
pub struct Handler {
    /// Static diagnostics (errors and warnings), in emission order.
    diagnostics: RefCell<Vec<Diagnostic>>,

    /// Runtime error reports, kept apart from static diagnostics because
    /// the driver renders them differently and they map to a different
    /// exit code.
    runtime_errors: RefCell<Vec<Diagnostic>>,

    /// Set by any error-level static diagnostic; cleared per REPL line.
    had_error: Cell<bool>,

    /// Set by any runtime error; sticky for the process.
    had_runtime_error: Cell<bool>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            runtime_errors: RefCell::new(Vec::new()),
            had_error: Cell::new(false),
            had_runtime_error: Cell::new(false),
        }
    }

    /// Report a static error.
    pub fn error(&self, span: Span, message: impl Into<String>) {
        self.emit(Diagnostic::error(message, span));
    }

    /// Report a warning.
    pub fn warning(&self, span: Span, message: impl Into<String>) {
        self.emit(Diagnostic::warning(message, span));
    }

    /// Emit a pre-built diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        if diagnostic.level == Level::Error {
            self.had_error.set(true);
        }
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Report a runtime error. Sticky: survives [`Handler::clear_static`].
    pub fn runtime_error(&self, span: Span, message: impl Into<String>) {
        self.had_runtime_error.set(true);
        self.runtime_errors
            .borrow_mut()
            .push(Diagnostic::error(message, span));
    }

    /// Whether any static error has been reported since the last
    /// [`Handler::clear_static`].
    pub fn has_errors(&self) -> bool {
        self.had_error.get()
    }

    /// Whether any runtime error has been reported in this process.
    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    /// Number of collected error-level static diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// Drain the collected static diagnostics, leaving the error flag set.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    /// Drain the collected runtime error reports. The sticky flag stays set.
    pub fn take_runtime_errors(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.runtime_errors.borrow_mut())
    }

    /// Reset static diagnostics and the error flag, preserving the sticky
    /// runtime-error flag. Called by the REPL between lines.
    pub fn clear_static(&self) {
        self.diagnostics.borrow_mut().clear();
        self.had_error.set(false);
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handler_is_clean() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert!(!handler.had_runtime_error());
        assert_eq!(handler.error_count(), 0);
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    fn test_error_sets_flag_and_collects() {
        let handler = Handler::new();
        handler.error(Span::DUMMY, "Unexpected character.");
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
        let diags = handler.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Unexpected character.");
        // Flag survives draining; only clear_static resets it.
        assert!(handler.has_errors());
    }

    #[test]
    fn test_warning_does_not_set_error_flag() {
        let handler = Handler::new();
        handler.warning(Span::DUMMY, "Local variable 'x' is never used.");
        assert!(!handler.has_errors());
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_label() {
        let handler = Handler::new();
        handler.emit(Diagnostic::error("Expect expression.", Span::DUMMY).with_label("at end"));
        let diags = handler.take_diagnostics();
        assert_eq!(diags[0].label.as_deref(), Some("at end"));
    }

    #[test]
    fn test_clear_static_preserves_runtime_flag() {
        let handler = Handler::new();
        handler.error(Span::DUMMY, "static");
        handler.runtime_error(Span::DUMMY, "Operands must be numbers.");
        handler.clear_static();
        assert!(!handler.has_errors());
        assert!(handler.had_runtime_error());
        assert_eq!(handler.take_runtime_errors().len(), 1);
        assert!(handler.had_runtime_error());
    }

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Error), "Error");
        assert_eq!(format!("{}", Level::Warning), "Warning");
    }
}
