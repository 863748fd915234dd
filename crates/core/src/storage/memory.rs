//! In-memory record and index store.

use crate::address::AddressRecord;
use crate::bigram::BigramIndex;
use crate::error::Result;
use crate::storage::{IndexStore, RecordStore};
use parking_lot::RwLock;

/// Keeps both artifacts behind `parking_lot` locks. Loading an empty store
/// yields no records and an empty index.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<AddressRecord>>,
    index: RwLock<BigramIndex>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load_all_records(&self) -> Result<Vec<AddressRecord>> {
        Ok(self.records.read().clone())
    }

    fn save_all_records(&self, records: &[AddressRecord]) -> Result<()> {
        *self.records.write() = records.to_vec();
        Ok(())
    }
}

impl IndexStore for MemoryStore {
    fn load_index(&self) -> Result<BigramIndex> {
        Ok(self.index.read().clone())
    }

    fn save_index(&self, index: &BigramIndex) -> Result<()> {
        *self.index.write() = index.clone();
        Ok(())
    }
}
