//! Storage layer: the record and index store contract, its implementations,
//! and the upstream source reader.
//!
//! The core only talks to [`RecordStore`] and [`IndexStore`]. Both are full
//! overwrite on save and full read on load; neither promises an iteration
//! order. File-backed stores write through a temp file and rename.

/// CSV record and index files, as the published tooling lays them out.
pub mod csv_store;
/// In-memory store for tests and embedding.
pub mod memory;
/// Atomic file writes and checksummed bincode snapshots.
pub mod persistence;
/// bincode snapshot record and index files.
pub mod snapshot_store;
/// Reader for the decompressed upstream postal code CSV.
pub mod source;

pub use csv_store::CsvStore;
pub use memory::MemoryStore;
pub use snapshot_store::SnapshotStore;
pub use source::{parse_source, read_source};

use crate::address::AddressRecord;
use crate::bigram::BigramIndex;
use crate::config::{EngineConfig, StorageFormat};
use crate::error::Result;

/// Persistence of canonical address records.
pub trait RecordStore: Send + Sync {
    /// Every stored record, in no particular order.
    fn load_all_records(&self) -> Result<Vec<AddressRecord>>;
    /// Replace the stored records with `records`.
    fn save_all_records(&self, records: &[AddressRecord]) -> Result<()>;
}

/// Persistence of the bigram index.
pub trait IndexStore: Send + Sync {
    fn load_index(&self) -> Result<BigramIndex>;
    /// Replace the stored index with `index`.
    fn save_index(&self, index: &BigramIndex) -> Result<()>;
}

/// A store holding both artifacts of a build.
pub trait CatalogueStore: RecordStore + IndexStore {}

impl<T: RecordStore + IndexStore> CatalogueStore for T {}

/// Open the file store selected by `config`.
pub fn open_store(config: &EngineConfig) -> Box<dyn CatalogueStore> {
    let (records, index) = (config.record_path(), config.index_path());
    match config.storage_format {
        StorageFormat::Csv => Box::new(CsvStore::new(records, index)),
        StorageFormat::Snapshot => Box::new(SnapshotStore::new(records, index)),
    }
}
