//! A searchable catalogue: one index generation and its records.

use crate::address::{AddressEntry, AddressRecord};
use crate::bigram::{build_index, BigramIndex};
use crate::error::{EngineError, Result};
use crate::search::query::execute_query;
use crate::storage::{IndexStore, RecordStore};
use std::collections::HashMap;

/// Index plus id → record map, both from the same build.
#[derive(Debug, Default)]
pub struct Catalogue {
    index: BigramIndex,
    records: HashMap<u32, AddressRecord>,
}

impl Catalogue {
    /// Pair an index with its records. Fails on a repeated record id.
    pub fn new(index: BigramIndex, records: Vec<AddressRecord>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records {
            let id = record.id;
            if by_id.insert(id, record).is_some() {
                return Err(EngineError::DuplicateRecordId(id));
            }
        }
        Ok(Self {
            index,
            records: by_id,
        })
    }

    /// Build the index for `records` in memory.
    pub fn from_records(records: Vec<AddressRecord>) -> Result<Self> {
        let index = build_index(&records);
        Self::new(index, records)
    }

    /// Load both artifacts from their stores.
    pub fn load<R, I>(records: &R, index: &I) -> Result<Self>
    where
        R: RecordStore + ?Sized,
        I: IndexStore + ?Sized,
    {
        let index = index.load_index()?;
        let records = records.load_all_records()?;
        let catalogue = Self::new(index, records)?;
        tracing::info!(
            "Loaded catalogue: {} records, {} bigrams",
            catalogue.record_count(),
            catalogue.bigram_count()
        );
        Ok(catalogue)
    }

    /// Matching addresses for `keyword`, sorted by their quoted rendering.
    pub fn search(&self, keyword: &str) -> Vec<AddressEntry> {
        execute_query(keyword, &self.index, &self.records)
    }

    pub fn record(&self, id: u32) -> Option<&AddressRecord> {
        self.records.get(&id)
    }

    pub fn index(&self) -> &BigramIndex {
        &self.index
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn bigram_count(&self) -> usize {
        self.index.len()
    }
}
