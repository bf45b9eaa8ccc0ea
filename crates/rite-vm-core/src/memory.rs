//! Memory accounting for a Rite VM instance
//!
//! Tracks heap bytes booked for code units so a runtime can enforce a ceiling
//! and the loader can hand every byte back when a load is rolled back.

use crate::error::{CoreError, CoreResult};

/// Manages the memory limit and accounting for one [`State`](crate::State)
#[derive(Debug, Clone)]
pub struct MemoryManager {
    /// Total bytes currently booked
    allocated: usize,
    /// Maximum bytes allowed
    limit: usize,
    /// Number of successful bookings
    allocation_count: usize,
    /// High-water mark of `allocated`
    peak: usize,
}

impl MemoryManager {
    /// Create a new memory manager with the specified limit
    pub fn new(limit: usize) -> Self {
        Self {
            allocated: 0,
            limit,
            allocation_count: 0,
            peak: 0,
        }
    }

    /// Create a memory manager with no practical limit
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Try to book `size` bytes. Returns `Err(CoreError::OutOfMemory)` if the limit would be exceeded.
    pub fn alloc(&mut self, size: usize) -> CoreResult<()> {
        let next = self
            .allocated
            .checked_add(size)
            .ok_or(CoreError::OutOfMemory)?;
        if next > self.limit {
            return Err(CoreError::OutOfMemory);
        }
        self.allocated = next;
        self.allocation_count += 1;
        self.peak = self.peak.max(next);
        Ok(())
    }

    /// Record release of `size` bytes
    pub fn free(&mut self, size: usize) {
        debug_assert!(size <= self.allocated, "freeing more than was booked");
        self.allocated = self.allocated.saturating_sub(size);
    }

    /// Get current booked bytes
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Get memory limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes still available under the limit
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.allocated)
    }

    /// Number of successful bookings so far
    pub fn allocation_count(&self) -> usize {
        self.allocation_count
    }

    /// Highest booked total seen
    pub fn peak(&self) -> usize {
        self.peak
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_enforced() {
        let mut mm = MemoryManager::new(100);
        assert!(mm.alloc(60).is_ok());
        assert_eq!(mm.alloc(50), Err(CoreError::OutOfMemory));
        assert_eq!(mm.allocated(), 60);
        assert_eq!(mm.remaining(), 40);
        mm.free(60);
        assert_eq!(mm.allocated(), 0);
        assert_eq!(mm.peak(), 60);
        assert_eq!(mm.allocation_count(), 1);
    }

    #[test]
    fn test_overflow_is_oom() {
        let mut mm = MemoryManager::unlimited();
        mm.alloc(10).unwrap();
        assert_eq!(mm.alloc(usize::MAX), Err(CoreError::OutOfMemory));
    }
}
