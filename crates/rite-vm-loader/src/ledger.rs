//! Per-load record of registered code units and interned symbols
//!
//! The ledger remembers the code unit table and symbol table lengths when a
//! load begins. Dropping it without [`AllocationLedger::commit`] truncates
//! both tables back to those lengths, releasing the booked memory.

use std::ops::Range;

use rite_vm_bytecode::{CodeUnit, CodeUnitIndex};
use rite_vm_core::State;

use crate::error::Result;

/// Guard over a [`State`] for the duration of one load
pub(crate) struct AllocationLedger<'s> {
    state: &'s mut State,
    base: usize,
    symbol_base: usize,
    memory_base: usize,
    committed: bool,
}

impl<'s> AllocationLedger<'s> {
    pub(crate) fn new(state: &'s mut State) -> Self {
        let base = state.code_units().len();
        let symbol_base = state.symbols().len();
        let memory_base = state.memory().allocated();
        Self {
            state,
            base,
            symbol_base,
            memory_base,
            committed: false,
        }
    }

    /// Table length before this load registered anything
    #[inline]
    pub(crate) fn base(&self) -> usize {
        self.base
    }

    /// Number of code units registered through this ledger
    #[inline]
    pub(crate) fn registered(&self) -> usize {
        self.state.code_units().len() - self.base
    }

    #[inline]
    pub(crate) fn state(&self) -> &State {
        &*self.state
    }

    #[inline]
    pub(crate) fn state_mut(&mut self) -> &mut State {
        &mut *self.state
    }

    /// Register one decoded unit
    pub(crate) fn register(&mut self, unit: CodeUnit) -> Result<CodeUnitIndex> {
        Ok(self.state.register_code_unit(unit)?)
    }

    /// Keep everything registered so far and disarm the rollback
    pub(crate) fn commit(mut self) -> Range<usize> {
        self.committed = true;
        self.base..self.state.code_units().len()
    }
}

impl Drop for AllocationLedger<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let removed = self.state.truncate_code_units(self.base);
        let forgotten = self.state.truncate_symbols(self.symbol_base);
        tracing::debug!(
            target: "rite::load",
            base = self.base,
            removed,
            forgotten,
            allocated = self.state.memory().allocated(),
            "rolled back code unit and symbol tables"
        );
        debug_assert_eq!(self.state.memory().allocated(), self.memory_base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rite_vm_bytecode::Code;

    fn unit() -> CodeUnit {
        CodeUnit::builder().instruction(Code(7)).build()
    }

    #[test]
    fn test_drop_rolls_back() {
        let mut state = State::new();
        state.register_code_unit(unit()).unwrap();
        let before = state.memory().allocated();

        {
            let mut ledger = AllocationLedger::new(&mut state);
            assert_eq!(ledger.base(), 1);
            ledger.register(unit()).unwrap();
            ledger.register(unit()).unwrap();
            assert_eq!(ledger.registered(), 2);
        }

        assert_eq!(state.code_units().len(), 1);
        assert_eq!(state.memory().allocated(), before);
    }

    #[test]
    fn test_commit_keeps_units() {
        let mut state = State::new();
        let mut ledger = AllocationLedger::new(&mut state);
        assert_eq!(ledger.register(unit()).unwrap(), CodeUnitIndex(0));
        assert_eq!(ledger.commit(), 0..1);
        assert_eq!(state.code_units().len(), 1);
    }

    #[test]
    fn test_drop_forgets_new_symbols() {
        let mut state = State::new();
        let earlier = state.intern(b"earlier").unwrap();
        let before = state.memory().allocated();
        {
            let mut ledger = AllocationLedger::new(&mut state);
            ledger.state_mut().intern(b"transient").unwrap();
            assert_eq!(ledger.state_mut().intern(b"earlier"), Ok(earlier));
            ledger.register(unit()).unwrap();
        }
        assert_eq!(state.symbols().len(), 1);
        assert_eq!(state.symbols().lookup(b"transient"), None);
        assert_eq!(state.symbols().lookup(b"earlier"), Some(earlier));
        assert!(state.code_units().is_empty());
        assert_eq!(state.memory().allocated(), before);
    }

    #[test]
    fn test_commit_keeps_symbols() {
        let mut state = State::new();
        let mut ledger = AllocationLedger::new(&mut state);
        let sym = ledger.state_mut().intern(b"kept").unwrap();
        ledger.commit();
        assert_eq!(state.symbols().lookup(b"kept"), Some(sym));
        assert_eq!(state.memory().allocated(), 4);
    }
}
