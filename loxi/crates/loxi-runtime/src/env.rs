//! Environments: lexically chained slot arrays.
//!
//! An environment is a frame of positionally indexed slots plus a pointer
//! to its enclosing frame. The resolver computes `(depth, slot)` for every
//! local reference, so reads and writes never search by name; only the
//! globals frame carries a name index, and that lives in the interpreter.
//!
//! Frames are shared: two closures created in the same scope alias one
//! frame, and mutations through one are visible through the other. Hence
//! `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

/// Shared handle to an environment frame.
pub type EnvRef = Rc<RefCell<Environment>>;

/// A single environment frame.
pub struct Environment {
    /// The lexically enclosing frame; `None` only for the globals frame.
    enclosing: Option<EnvRef>,
    /// Slot array, indexed by the resolver's slot assignment.
    slots: Vec<Value>,
}

impl Environment {
    /// Create the globals frame.
    pub fn global() -> EnvRef {
        Rc::new(RefCell::new(Environment {
            enclosing: None,
            slots: Vec::new(),
        }))
    }

    /// Create a frame enclosed by `parent`.
    pub fn with_enclosing(parent: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            enclosing: Some(parent),
            slots: Vec::new(),
        }))
    }

    /// Append a value, returning its slot index.
    ///
    /// Definitions execute in the same order the resolver assigned slots,
    /// so the returned index always matches the resolver's.
    pub fn define(&mut self, value: Value) -> usize {
        self.slots.push(value);
        self.slots.len() - 1
    }

    /// Read a slot of this frame.
    pub fn get(&self, slot: usize) -> Value {
        self.slots[slot].clone()
    }

    /// Write a slot of this frame.
    pub fn set(&mut self, slot: usize, value: Value) {
        self.slots[slot] = value;
    }

    /// Whether this is the globals frame.
    pub fn is_global(&self) -> bool {
        self.enclosing.is_none()
    }

    /// Number of defined slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the frame has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The frame `depth` hops out along the enclosing chain.
    fn ancestor(env: &EnvRef, depth: usize) -> EnvRef {
        let mut current = env.clone();
        for _ in 0..depth {
            let next = current
                .borrow()
                .enclosing
                .clone()
                .expect("resolver depth exceeds environment chain");
            current = next;
        }
        current
    }

    /// Read `slot` of the frame `depth` hops out.
    pub fn get_at(env: &EnvRef, depth: usize, slot: usize) -> Value {
        Self::ancestor(env, depth).borrow().get(slot)
    }

    /// Write `slot` of the frame `depth` hops out.
    pub fn assign_at(env: &EnvRef, depth: usize, slot: usize, value: Value) {
        Self::ancestor(env, depth).borrow_mut().set(slot, value);
    }
}

// Frames alias and may participate in reference cycles through closures, so
// the derived recursive Debug would overflow; print the shape only.
impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("slots", &self.slots.len())
            .field("global", &self.is_global())
            .finish()
    }
}
