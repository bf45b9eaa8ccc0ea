//! Per-runtime state
//!
//! [`State`] is the allocation/registration surface the image loader talks to.
//! Every byte a registered code unit or an interned symbol name owns is
//! booked against the state's [`MemoryManager`] so that a ceiling can be
//! enforced and rollback can hand the bytes back.

use rite_vm_bytecode::{CodeUnit, CodeUnitIndex, DebugInfo, Symbol};

use crate::error::CoreResult;
use crate::memory::MemoryManager;
use crate::symbol::SymbolTable;
use crate::table::CodeUnitTable;

/// One runtime instance's code units, symbols and memory budget
#[derive(Debug, Default)]
pub struct State {
    units: CodeUnitTable,
    symbols: SymbolTable,
    memory: MemoryManager,
}

impl State {
    /// Create a state with no memory ceiling
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state whose code units and symbols may book at most `limit` bytes
    pub fn with_memory_limit(limit: usize) -> Self {
        Self {
            memory: MemoryManager::new(limit),
            ..Self::default()
        }
    }

    /// Registered code units
    #[inline]
    pub fn code_units(&self) -> &CodeUnitTable {
        &self.units
    }

    /// Get a code unit by index
    #[inline]
    pub fn code_unit(&self, index: CodeUnitIndex) -> Option<&CodeUnit> {
        self.units.get(index)
    }

    /// Symbol interner
    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Intern a symbol name, booking its bytes the first time it is seen
    pub fn intern(&mut self, name: &[u8]) -> CoreResult<Symbol> {
        if let Some(sym) = self.symbols.lookup(name) {
            return Ok(sym);
        }
        self.memory.alloc(name.len())?;
        Ok(self.symbols.intern(name))
    }

    /// Forget every symbol interned at position `len` or later
    pub fn truncate_symbols(&mut self, len: usize) -> usize {
        let before = self.symbols.len();
        let freed = self.symbols.truncate(len);
        self.memory.free(freed);
        before - self.symbols.len()
    }

    /// Memory accounting
    #[inline]
    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    /// Book `unit`'s footprint and append it to the code unit table
    pub fn register_code_unit(&mut self, unit: CodeUnit) -> CoreResult<CodeUnitIndex> {
        let booked = unit.heap_size();
        self.memory.alloc(booked)?;
        match self.units.push(unit, booked) {
            Ok(index) => Ok(index),
            Err(err) => {
                self.memory.free(booked);
                Err(err)
            }
        }
    }

    /// Attach (or replace) the debug info of an already registered unit
    pub fn attach_debug_info(&mut self, index: usize, debug: DebugInfo) -> CoreResult<()> {
        let (unit, booked) = self.units.slot_mut(index)?;
        let incoming = debug.heap_size();
        let outgoing = unit.debug.as_ref().map_or(0, DebugInfo::heap_size);
        self.memory.alloc(incoming)?;
        self.memory.free(outgoing);
        *booked = *booked + incoming - outgoing;
        unit.debug = Some(debug);
        Ok(())
    }

    /// Free every code unit at index `len` or above, returning how many were dropped
    pub fn truncate_code_units(&mut self, len: usize) -> usize {
        let (removed, freed) = self.units.truncate(len);
        self.memory.free(freed);
        removed
    }
}
