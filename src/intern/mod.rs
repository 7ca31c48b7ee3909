//! Interned variable names
//!
//! Each distinct name is stored once; every later request for the same text
//! shares that allocation.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Immutable shared name, compared by content
///
/// Single-threaded like the rest of the engine.
#[derive(Debug, Clone, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Name text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when both symbols share one allocation
    pub(crate) fn ptr_eq(&self, other: &Symbol) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// Same allocation implies same text; separate interners may still agree.
impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Deref for Symbol {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name table producing shared [`Symbol`]s
#[derive(Debug, Default)]
pub struct Interner {
    names: HashSet<Symbol>,
}

impl Interner {
    /// Create empty interner
    pub fn new() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    /// Return the shared symbol for `name`, creating it on first use
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(existing) = self.names.get(name) {
            return existing.clone();
        }
        let symbol = Symbol(Rc::from(name));
        self.names.insert(symbol.clone());
        symbol
    }

    /// Look up without inserting
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.names.get(name).cloned()
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
