//! loxi-util - Core Utilities and Foundation Types
//!
//! Shared infrastructure for the Loxi interpreter pipeline:
//!
//! - [`Span`]: source location tracking for tokens and diagnostics
//! - [`Symbol`]: interned string handles for identifiers and string literals
//! - [`NodeId`]: identity for AST nodes the resolver keys its side-table on
//! - [`Handler`] / [`Diagnostic`]: the diagnostic sink shared by every stage
//!
//! The crates downstream (`loxi-lex`, `loxi-par`, `loxi-sem`,
//! `loxi-runtime`, `loxi-drv`) all depend on this one and nothing else in
//! the workspace.

pub mod diagnostic;
pub mod node_id;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use node_id::{NodeId, NodeIdGenerator};
pub use span::Span;
pub use symbol::Symbol;
