//! Code unit arena
//!
//! Code units live in one growable table owned by the [`State`](crate::State)
//! and are addressed by [`CodeUnitIndex`]. Indices are stable for as long as
//! the unit stays registered; removing units only ever happens from the tail
//! ([`CodeUnitTable::truncate`]), which is what load rollback relies on.

use rite_vm_bytecode::{CodeUnit, CodeUnitIndex};

use crate::error::{CoreError, CoreResult};

#[derive(Debug)]
struct Slot {
    unit: CodeUnit,
    /// Bytes booked against the memory manager for this unit
    booked: usize,
}

/// Growable table of registered code units
#[derive(Debug, Default)]
pub struct CodeUnitTable {
    slots: Vec<Slot>,
}

impl CodeUnitTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered code units
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the table is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index the next pushed unit will receive
    pub fn next_index(&self) -> CoreResult<CodeUnitIndex> {
        CodeUnitIndex::try_from(self.slots.len()).map_err(|_| CoreError::OutOfMemory)
    }

    /// Append a unit whose footprint of `booked` bytes is already accounted for
    pub(crate) fn push(&mut self, unit: CodeUnit, booked: usize) -> CoreResult<CodeUnitIndex> {
        let index = self.next_index()?;
        self.slots.try_reserve(1)?;
        self.slots.push(Slot { unit, booked });
        Ok(index)
    }

    /// Get a code unit by index
    #[inline]
    pub fn get(&self, index: CodeUnitIndex) -> Option<&CodeUnit> {
        self.slots.get(index.as_usize()).map(|s| &s.unit)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> CoreResult<(&mut CodeUnit, &mut usize)> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .map(|s| (&mut s.unit, &mut s.booked))
            .ok_or(CoreError::IndexOutOfRange { index, len })
    }

    /// Drop every unit at or past `len`, returning how many were removed and
    /// the bytes they had booked
    pub(crate) fn truncate(&mut self, len: usize) -> (usize, usize) {
        if len >= self.slots.len() {
            return (0, 0);
        }
        let removed = self.slots.len() - len;
        let freed = self.slots.drain(len..).map(|s| s.booked).sum();
        (removed, freed)
    }

    /// Iterate over registered units in index order
    pub fn iter(&self) -> impl Iterator<Item = (CodeUnitIndex, &CodeUnit)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (CodeUnitIndex(i as u32), &s.unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rite_vm_bytecode::Code;

    fn unit(word: u32) -> CodeUnit {
        CodeUnit::builder().instruction(Code(word)).build()
    }

    #[test]
    fn test_push_assigns_sequential_indices() {
        let mut table = CodeUnitTable::new();
        assert_eq!(table.push(unit(1), 4).unwrap(), CodeUnitIndex(0));
        assert_eq!(table.push(unit(2), 4).unwrap(), CodeUnitIndex(1));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(CodeUnitIndex(1)).map(|u| u.iseq[0]), Some(Code(2)));
        assert!(table.get(CodeUnitIndex(2)).is_none());
    }

    #[test]
    fn test_truncate_reports_freed_bytes() {
        let mut table = CodeUnitTable::new();
        for i in 0..5 {
            table.push(unit(i), 10 + i as usize).unwrap();
        }
        assert_eq!(table.truncate(2), (3, 12 + 13 + 14));
        assert_eq!(table.len(), 2);
        assert_eq!(table.truncate(7), (0, 0));
        assert_eq!(table.next_index().unwrap(), CodeUnitIndex(2));
    }

    #[test]
    fn test_slot_mut_out_of_range() {
        let mut table = CodeUnitTable::new();
        assert_eq!(
            table.slot_mut(0).err(),
            Some(CoreError::IndexOutOfRange { index: 0, len: 0 })
        );
    }
}
