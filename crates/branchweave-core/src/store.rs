//! Persistence for range pairs.
//!
//! The store is read fresh at the start of every pass and written on every
//! mutating user action. Another tab may write the same store in between,
//! so nothing here caches pairs across calls.

use std::cell::RefCell;

use crate::error::StoreError;
use crate::types::RangePair;

/// Load/save capability for the persisted pair list.
pub trait PairStore {
    /// Load all stored pairs. A store with nothing saved yet loads as empty.
    fn load(&self) -> Result<Vec<RangePair>, StoreError>;

    /// Replace the stored pairs.
    fn save(&self, pairs: &[RangePair]) -> Result<(), StoreError>;
}

impl<T: PairStore + ?Sized> PairStore for &T {
    fn load(&self) -> Result<Vec<RangePair>, StoreError> {
        (**self).load()
    }

    fn save(&self, pairs: &[RangePair]) -> Result<(), StoreError> {
        (**self).save(pairs)
    }
}

/// In-memory pair store, for tests and pages without storage access.
#[derive(Debug, Default)]
pub struct MemoryPairStore {
    pairs: RefCell<Vec<RangePair>>,
}

impl MemoryPairStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with pairs.
    pub fn with_pairs(pairs: Vec<RangePair>) -> Self {
        Self {
            pairs: RefCell::new(pairs),
        }
    }

    /// Snapshot of the stored pairs.
    pub fn pairs(&self) -> Vec<RangePair> {
        self.pairs.borrow().clone()
    }
}

impl PairStore for MemoryPairStore {
    fn load(&self) -> Result<Vec<RangePair>, StoreError> {
        Ok(self.pairs.borrow().clone())
    }

    fn save(&self, pairs: &[RangePair]) -> Result<(), StoreError> {
        *self.pairs.borrow_mut() = pairs.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_replaces_on_save() {
        let store = MemoryPairStore::with_pairs(vec![RangePair::new("a", "b")]);
        assert_eq!(store.load().unwrap().len(), 1);

        store
            .save(&[RangePair::new("c", "d"), RangePair::new("e", "f")])
            .unwrap();
        assert_eq!(
            store.pairs(),
            vec![RangePair::new("c", "d"), RangePair::new("e", "f")]
        );
    }

    #[test]
    fn test_store_through_reference() {
        let store = MemoryPairStore::new();
        let by_ref: &MemoryPairStore = &store;
        by_ref.save(&[RangePair::new("x", "y")]).unwrap();
        assert_eq!(store.pairs(), vec![RangePair::new("x", "y")]);
    }
}
