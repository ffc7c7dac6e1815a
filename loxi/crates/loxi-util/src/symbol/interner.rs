//! String interner backing the [`Symbol`] type.
//!
//! Uses DashMap for lock-free lookup on the hot intern path and a read-write
//! locked index for symbol→string resolution. Interned strings are leaked to
//! obtain `'static` references; the table lives for the whole process and
//! entries are never removed, which bounds the leak by the number of distinct
//! identifiers and string literals in the source.

use std::sync::{LazyLock, RwLock};

use ahash::RandomState;
use dashmap::DashMap;

use super::{Symbol, KNOWN_SYMBOL_TEXTS};

/// Global string table.
///
/// Initialized on first use; all reserved words are interned during
/// initialization so they receive the stable indices of the `KW_*`
/// constants.
pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    for text in KNOWN_SYMBOL_TEXTS {
        table.intern(text);
    }
    table
});

/// Thread-safe string table.
pub struct StringTable {
    /// Text → symbol index.
    map: DashMap<&'static str, u32, RandomState>,

    /// Symbol index → text. Push-only.
    strings: RwLock<Vec<&'static str>>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_hasher(RandomState::new()),
            strings: RwLock::new(Vec::new()),
        }
    }

    /// Intern a string, returning its symbol.
    pub fn intern(&self, text: &str) -> Symbol {
        if let Some(entry) = self.map.get(text) {
            return Symbol(*entry);
        }

        let mut strings = self.strings.write().expect("string table poisoned");
        // A racing thread may have interned the text between the lookup and
        // taking the write lock.
        if let Some(entry) = self.map.get(text) {
            return Symbol(*entry);
        }

        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let index = strings.len() as u32;
        strings.push(leaked);
        self.map.insert(leaked, index);
        Symbol(index)
    }

    /// Resolve a symbol back to its text.
    pub fn resolve(&self, symbol: Symbol) -> &'static str {
        let strings = self.strings.read().expect("string table poisoned");
        strings
            .get(symbol.0 as usize)
            .copied()
            .unwrap_or("<unknown symbol>")
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.strings.read().expect("string table poisoned").len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
