//! # Interned functor names
//!
//! The engine identifies functors by numeric [`Sym`]s; this module provides
//! the two-way mapping between those IDs and their textual names.

use std::collections::HashMap;

use crate::ast::Sym;

/// A two-way mapping between functor names and [`Sym`]s.
///
/// Each name is interned at most once, so symbol equality coincides with name
/// equality. The reserved cut functor `@cut` is interned on construction and
/// always maps to [`Sym::CUT`].
///
/// # Example
///
/// ```
/// # use hornlog::symbols::SymbolStore;
/// let mut syms = SymbolStore::new();
/// let foo = syms.get_or_insert_named("foo");
/// let bar = syms.get_or_insert_named("bar");
/// assert_ne!(foo, bar);
/// assert_eq!(foo, syms.get_or_insert_named("foo"));
/// assert_eq!(syms.name(bar), Some("bar"));
/// ```
#[derive(Debug, Clone)]
pub struct SymbolStore {
    ids: HashMap<String, Sym>,
    names: Vec<String>,
}

impl SymbolStore {
    /// The name under which the cut marker is interned.
    pub const CUT_NAME: &'static str = "@cut";

    pub fn new() -> Self {
        let mut store = Self {
            ids: HashMap::new(),
            names: Vec::new(),
        };
        let cut = store.get_or_insert_named(Self::CUT_NAME);
        debug_assert_eq!(cut, Sym::CUT);
        store
    }

    /// Intern a name, returning the existing symbol if the name is already
    /// known.
    pub fn get_or_insert_named(&mut self, name: &str) -> Sym {
        if let Some(sym) = self.ids.get(name) {
            *sym
        } else {
            let sym = Sym::from_ord(self.names.len());
            self.names.push(name.to_owned());
            self.ids.insert(name.to_owned(), sym);
            sym
        }
    }

    /// Look up a symbol by name without interning.
    pub fn get(&self, name: &str) -> Option<Sym> {
        self.ids.get(name).copied()
    }

    /// Look up the name of a symbol.
    pub fn name(&self, sym: Sym) -> Option<&str> {
        self.names.get(sym.ord()).map(String::as_str)
    }

    /// Number of interned symbols, including the reserved ones.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new()
    }
}
