//! Lexical scope stack for the resolver.
//!
//! Each scope maps names to their local entry and hands out dense slot
//! indices in declaration order. The runtime defines values in execution
//! order, which is the same order, so a resolver slot index is directly an
//! index into the runtime frame's slot array.
//!
//! The global scope is never on the stack; a name that falls off the bottom
//! resolves as a global at runtime.

use loxi_util::{Span, Symbol};
use rustc_hash::FxHashMap;

/// State of one name in a scope.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalEntry {
    /// Flipped by `define`; reading a name that is declared but not yet
    /// defined is the own-initializer error.
    pub defined: bool,
    /// Whether any reference resolved to this entry.
    pub used: bool,
    /// Dense index within the scope's runtime frame.
    pub slot: usize,
    /// Declaration site, for the unused-local warning.
    pub span: Span,
}

/// A single lexical scope.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    bindings: FxHashMap<Symbol, LocalEntry>,
    next_slot: usize,
}

impl Scope {
    /// Declare a name, assigning it the next slot.
    ///
    /// Returns `true` if the name was already declared in this scope (a
    /// diagnostic for the caller); the entry is replaced either way, with a
    /// fresh slot.
    pub(crate) fn declare(&mut self, name: Symbol, span: Span) -> bool {
        let duplicate = self.bindings.contains_key(&name);
        let slot = self.next_slot;
        self.next_slot += 1;
        self.bindings.insert(
            name,
            LocalEntry {
                defined: false,
                used: false,
                slot,
                span,
            },
        );
        duplicate
    }

    /// Mark a declared name as defined.
    pub(crate) fn define(&mut self, name: Symbol) {
        if let Some(entry) = self.bindings.get_mut(&name) {
            entry.defined = true;
        }
    }

    /// Mark a name as used.
    pub(crate) fn mark_used(&mut self, name: Symbol) {
        if let Some(entry) = self.bindings.get_mut(&name) {
            entry.used = true;
        }
    }

    pub(crate) fn get(&self, name: Symbol) -> Option<&LocalEntry> {
        self.bindings.get(&name)
    }

    /// Entries that were never used, for the scope-exit warning.
    pub(crate) fn unused(&self) -> impl Iterator<Item = (Symbol, &LocalEntry)> {
        self.bindings
            .iter()
            .filter(|(_, entry)| !entry.used)
            .map(|(name, entry)| (*name, entry))
    }
}

/// The resolver's stack of open scopes.
#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub(crate) fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub(crate) fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub(crate) fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    /// Whether we are at global scope.
    pub(crate) fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub(crate) fn top_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    pub(crate) fn top(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// Find `name`, walking outward from the innermost scope.
    ///
    /// Returns `(depth, slot)` where depth counts enclosing scopes from the
    /// use site (0 = innermost), and marks the entry used. `None` means the
    /// name resolves as a global.
    pub(crate) fn resolve(&mut self, name: Symbol) -> Option<(usize, usize)> {
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(entry) = scope.bindings.get_mut(&name) {
                entry.used = true;
                return Some((depth, entry.slot));
            }
        }
        None
    }
}
