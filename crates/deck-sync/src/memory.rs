//! In-process collection store

use crate::error::StoreError;
use crate::store::{Collection, CollectionStore};
use parking_lot::RwLock;

/// Store holding the collection in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<Collection>,
}

impl MemoryStore {
    /// Create store holding `items`
    #[must_use]
    pub fn new(items: Collection) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Copy of the stored collection
    #[must_use]
    pub fn snapshot(&self) -> Collection {
        self.items.read().clone()
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait::async_trait]
impl CollectionStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Collection, StoreError> {
        Ok(self.snapshot())
    }

    async fn replace_all(&self, items: Collection) -> Result<Collection, StoreError> {
        let mut stored = self.items.write();
        *stored = items;
        Ok(stored.clone())
    }
}
