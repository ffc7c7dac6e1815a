//! Node identity for AST nodes.
//!
//! The resolver's side-table is keyed on node identity, not structure: two
//! textually identical variable references must resolve independently. The
//! parser stamps a fresh [`NodeId`] on every node that can appear in the
//! side-table (`Variable`, `Assign`, `This`, `Super`).
//!
//! The [`NodeIdGenerator`] is owned by the driver session rather than the
//! parser so that successive REPL lines never reuse ids: closures created on
//! an earlier line keep their resolutions in the accumulated side-table.

use std::sync::atomic::{AtomicU32, Ordering};

/// Unique identifier for a resolvable AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Reserved id for synthesized nodes in tests.
    pub const DUMMY: NodeId = NodeId(u32::MAX);

    pub fn is_dummy(self) -> bool {
        self == Self::DUMMY
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Generator for unique [`NodeId`]s.
pub struct NodeIdGenerator {
    counter: AtomicU32,
}

impl NodeIdGenerator {
    /// Create a new generator starting from 0.
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
        }
    }

    /// Generate a new unique id.
    pub fn next(&self) -> NodeId {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        if id == u32::MAX {
            panic!("NodeId overflow: program has too many AST nodes");
        }
        NodeId(id)
    }
}

impl Default for NodeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
