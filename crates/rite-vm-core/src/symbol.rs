//! Symbol interning

use rite_vm_bytecode::Symbol;
use rustc_hash::FxHashMap;

/// Per-state symbol interner
///
/// Names are raw bytes. Symbols are numbered in interning order, so a
/// [`SymbolTable::truncate`] back to an earlier length forgets exactly the
/// names interned since then.
#[derive(Debug, Default)]
pub struct SymbolTable {
    map: FxHashMap<Box<[u8]>, Symbol>,
    names: Vec<Box<[u8]>>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the existing symbol when already present
    pub fn intern(&mut self, name: &[u8]) -> Symbol {
        if let Some(sym) = self.map.get(name) {
            return *sym;
        }
        let sym = Symbol::from_index(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        let name: Box<[u8]> = name.into();
        self.names.push(name.clone());
        self.map.insert(name, sym);
        sym
    }

    /// Symbol already assigned to `name`, without interning it
    pub fn lookup(&self, name: &[u8]) -> Option<Symbol> {
        self.map.get(name).copied()
    }

    /// Raw bytes `sym` was interned from
    pub fn name(&self, sym: Symbol) -> Option<&[u8]> {
        self.names.get(sym.index()).map(|n| &**n)
    }

    /// Name as UTF-8 text, lossily converted
    pub fn name_lossy(&self, sym: Symbol) -> Option<String> {
        self.name(sym)
            .map(|n| String::from_utf8_lossy(n).into_owned())
    }

    /// Number of distinct names interned
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name has been interned yet
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Forget every name interned at position `len` or later, returning the
    /// bytes their names occupied
    pub fn truncate(&mut self, len: usize) -> usize {
        if len >= self.names.len() {
            return 0;
        }
        let mut freed = 0;
        for name in self.names.drain(len..) {
            self.map.remove(&name);
            freed += name.len();
        }
        freed
    }
}
