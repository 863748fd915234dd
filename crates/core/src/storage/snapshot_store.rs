//! Record and index stores as checksummed bincode snapshots.
//!
//! Loads much faster than the CSV layout and keeps postings as native
//! integers. Files are only readable by this crate.

use crate::address::AddressRecord;
use crate::bigram::BigramIndex;
use crate::error::Result;
use crate::storage::persistence::{load_snapshot, save_snapshot};
use crate::storage::{IndexStore, RecordStore};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    record_path: PathBuf,
    index_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(record_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            record_path: record_path.into(),
            index_path: index_path.into(),
        }
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }
}

impl RecordStore for SnapshotStore {
    fn load_all_records(&self) -> Result<Vec<AddressRecord>> {
        load_snapshot(&self.record_path)
    }

    fn save_all_records(&self, records: &[AddressRecord]) -> Result<()> {
        save_snapshot(records, &self.record_path)?;
        Ok(())
    }
}

impl IndexStore for SnapshotStore {
    fn load_index(&self) -> Result<BigramIndex> {
        load_snapshot(&self.index_path)
    }

    fn save_index(&self, index: &BigramIndex) -> Result<()> {
        save_snapshot(index, &self.index_path)?;
        Ok(())
    }
}
