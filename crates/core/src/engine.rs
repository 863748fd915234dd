//! Rebuild and search triggers.
//!
//! A rebuild reads the upstream rows, merges them, builds the bigram index in
//! memory and only then overwrites the stores (index first, then records).
//! Ids are reassigned on every build, so an index is only meaningful next to
//! the records it was built from: if the record save fails, the previous index
//! is put back (or an empty one if there was none) before the error returns.
//! A search loads both stores and runs the query. Neither operation guards
//! against the other running concurrently; callers serialize them.

use crate::address::{AddressEntry, RawRow};
use crate::bigram::{build_index, BigramIndex};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::merge::merge_rows;
use crate::search::Catalogue;
use crate::storage::{open_store, read_source, CatalogueStore, IndexStore, RecordStore};
use serde::Serialize;
use std::time::Instant;

/// Counts reported by a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BuildSummary {
    /// Upstream rows read.
    pub rows: usize,
    /// Canonical records after merging.
    pub records: usize,
    /// Distinct bigrams in the index.
    pub bigrams: usize,
    /// Postings across all bigrams, repetitions included.
    pub postings: usize,
}

/// Merge `rows`, build the index and overwrite both stores.
///
/// Returns the freshly built catalogue so callers holding one in memory can
/// swap it in without reloading.
pub fn rebuild_index<R, I>(
    rows: Vec<RawRow>,
    record_store: &R,
    index_store: &I,
) -> Result<(Catalogue, BuildSummary)>
where
    R: RecordStore + ?Sized,
    I: IndexStore + ?Sized,
{
    let start = Instant::now();
    let row_count = rows.len();
    let records = merge_rows(rows)?;
    tracing::info!(
        "Merged {} rows into {} address records",
        row_count,
        records.len()
    );

    let index = build_index(&records);
    let summary = BuildSummary {
        rows: row_count,
        records: records.len(),
        bigrams: index.len(),
        postings: index.posting_count(),
    };

    let previous = previous_index(index_store);
    index_store.save_index(&index)?;
    if let Err(e) = record_store.save_all_records(&records) {
        restore_index(index_store, previous.unwrap_or_default());
        return Err(e);
    }

    tracing::info!(
        "Index rebuilt in {:?}: {} records, {} bigrams, {} postings",
        start.elapsed(),
        summary.records,
        summary.bigrams,
        summary.postings
    );
    Ok((Catalogue::new(index, records)?, summary))
}

fn previous_index<I: IndexStore + ?Sized>(index_store: &I) -> Option<BigramIndex> {
    match index_store.load_index() {
        Ok(index) => Some(index),
        Err(EngineError::NotBuilt(_)) => None,
        Err(e) => {
            tracing::warn!("Previous index unreadable, an empty one replaces it on failure: {}", e);
            None
        }
    }
}

fn restore_index<I: IndexStore + ?Sized>(index_store: &I, previous: BigramIndex) {
    match index_store.save_index(&previous) {
        Ok(()) => tracing::warn!(
            "Record save failed; restored previous index ({} bigrams)",
            previous.len()
        ),
        Err(e) => tracing::error!(
            "Record save failed and the previous index could not be restored: {}",
            e
        ),
    }
}

/// Load both stores and run `keyword` against them.
pub fn search_address<R, I>(keyword: &str, record_store: &R, index_store: &I) -> Result<Vec<AddressEntry>>
where
    R: RecordStore + ?Sized,
    I: IndexStore + ?Sized,
{
    let catalogue = Catalogue::load(record_store, index_store)?;
    Ok(catalogue.search(keyword))
}

/// Triggers bound to one [`EngineConfig`] and its store.
pub struct SearchEngine {
    config: EngineConfig,
    store: Box<dyn CatalogueStore>,
}

impl SearchEngine {
    /// Engine over the file store selected by `config`.
    pub fn open(config: EngineConfig) -> Self {
        let store = open_store(&config);
        Self { config, store }
    }

    /// Engine over a caller-supplied store, e.g. [`crate::storage::MemoryStore`].
    pub fn with_store(config: EngineConfig, store: Box<dyn CatalogueStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rebuild from the configured upstream file.
    pub fn rebuild(&self) -> Result<(Catalogue, BuildSummary)> {
        let rows = read_source(&self.config.source_file, self.config.source_encoding)?;
        self.rebuild_from_rows(rows)
    }

    /// Rebuild from rows already in memory.
    pub fn rebuild_from_rows(&self, rows: Vec<RawRow>) -> Result<(Catalogue, BuildSummary)> {
        rebuild_index(rows, &*self.store, &*self.store)
    }

    /// Load the last built catalogue.
    pub fn load(&self) -> Result<Catalogue> {
        Catalogue::load(&*self.store, &*self.store)
    }

    /// Load the stores and search them.
    pub fn search(&self, keyword: &str) -> Result<Vec<AddressEntry>> {
        search_address(keyword, &*self.store, &*self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageFormat;
    use crate::address::AddressRecord;
    use crate::storage::MemoryStore;
    use std::fs;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn rows() -> Vec<RawRow> {
        vec![
            RawRow::new("1000001", "東京都", "千代田区", "千代田"),
            RawRow::new("6050874", "京都府", "京都市東山区", "弓矢町（東大路通松原上る、"),
            RawRow::new("6050874", "京都府", "京都市東山区", "松原通東大路西入）"),
            RawRow::new("9071801", "沖縄県", "八重山郡与那国町", "与那国"),
        ]
    }

    #[test]
    fn test_rebuild_then_search_memory() {
        let store = MemoryStore::new();
        let (catalogue, summary) = rebuild_index(rows(), &store, &store).unwrap();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.records, 3);
        assert_eq!(catalogue.record_count(), 3);

        let results = search_address("松原西入", &store, &store).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].detail_address2,
            "弓矢町（東大路通松原上る、松原通東大路西入）"
        );
        assert_eq!(results, catalogue.search("松原西入"));
    }

    #[test]
    fn test_search_before_build_fails_not_built() {
        let dir = TempDir::new().unwrap();
        let engine = SearchEngine::open(EngineConfig::new(dir.path()));
        assert!(matches!(engine.search("東京"), Err(EngineError::NotBuilt(_))));
    }

    #[test]
    fn test_engine_rebuild_from_source_file() {
        for format in [StorageFormat::Csv, StorageFormat::Snapshot] {
            let dir = TempDir::new().unwrap();
            let source = dir.path().join("KEN_ALL.CSV");
            fs::write(
                &source,
                "13101,\"100  \",\"1000001\",\"ﾄｳｷｮｳﾄ\",\"ﾁﾖﾀﾞｸ\",\"ﾁﾖﾀﾞ\",\"東京都\",\"千代田区\",\"千代田\",0,0,0,0,0,0\n",
            )
            .unwrap();
            let config = EngineConfig::new(dir.path())
                .with_source_encoding(crate::config::SourceEncoding::Utf8)
                .with_storage_format(format);
            let engine = SearchEngine::open(config.clone());

            let (_, summary) = engine.rebuild().unwrap();
            assert_eq!(summary.records, 1);
            assert!(config.record_path().exists());
            assert!(config.index_path().exists());

            let results = engine.search("代田").unwrap();
            assert_eq!(results.len(), 1, "format {format}");
            assert_eq!(results[0].zip_code, "1000001");
        }
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_stores() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::new(dir.path()).with_source_encoding(crate::config::SourceEncoding::Utf8);
        let engine = SearchEngine::open(config.clone());
        engine.rebuild_from_rows(rows()).unwrap();
        let before = fs::read(config.index_path()).unwrap();

        // Malformed upstream row: the build aborts before any store is touched.
        fs::write(&config.source_file, "13101,\"100  \",\"1000001\"\n").unwrap();
        assert!(matches!(
            engine.rebuild(),
            Err(EngineError::MalformedRow { .. })
        ));
        assert_eq!(fs::read(config.index_path()).unwrap(), before);
        assert_eq!(engine.search("与那国").unwrap().len(), 1);
    }

    #[test]
    fn test_rebuild_replaces_previous_generation() {
        let store = MemoryStore::new();
        rebuild_index(rows(), &store, &store).unwrap();
        rebuild_index(
            vec![RawRow::new("0600000", "北海道", "札幌市中央区", "")],
            &store,
            &store,
        )
        .unwrap();
        assert!(search_address("東京", &store, &store).unwrap().is_empty());
        assert_eq!(search_address("札幌", &store, &store).unwrap().len(), 1);
    }

    /// Record store whose `fail_on`-th save (1-based) fails.
    struct FlakyRecords {
        inner: MemoryStore,
        fail_on: usize,
        saves: AtomicUsize,
    }

    impl FlakyRecords {
        fn new(fail_on: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_on,
                saves: AtomicUsize::new(0),
            }
        }
    }

    impl RecordStore for FlakyRecords {
        fn load_all_records(&self) -> Result<Vec<AddressRecord>> {
            self.inner.load_all_records()
        }

        fn save_all_records(&self, records: &[AddressRecord]) -> Result<()> {
            if self.saves.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            self.inner.save_all_records(records)
        }
    }

    #[test]
    fn test_failed_record_save_restores_previous_index() {
        let records = FlakyRecords::new(2);
        let index = MemoryStore::new();
        rebuild_index(
            vec![RawRow::new("1000001", "東京都", "千代田区", "千代田")],
            &records,
            &index,
        )
        .unwrap();

        let err = rebuild_index(
            vec![RawRow::new("9071801", "沖縄県", "八重山郡与那国町", "与那国")],
            &records,
            &index,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));

        // Id 1 now names the Tokyo record again in both stores.
        assert!(search_address("沖縄", &records, &index).unwrap().is_empty());
        let results = search_address("東京", &records, &index).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].zip_code, "1000001");
    }

    #[test]
    fn test_failed_first_record_save_leaves_empty_index() {
        let dir = TempDir::new().unwrap();
        let index = crate::storage::CsvStore::new(
            dir.path().join("records.csv"),
            dir.path().join("index.csv"),
        );
        let records = FlakyRecords::new(1);
        records
            .inner
            .save_all_records(&[AddressRecord {
                id: 1,
                zip_code: "0600000".into(),
                prefecture: "北海道".into(),
                detail_address1: "札幌市中央区".into(),
                detail_address2: String::new(),
            }])
            .unwrap();

        assert!(rebuild_index(rows(), &records, &index).is_err());
        assert!(index.load_index().unwrap().is_empty());
        assert!(search_address("東京", &records, &index).unwrap().is_empty());
    }

    #[test]
    fn test_with_store() {
        let engine = SearchEngine::with_store(EngineConfig::default(), Box::new(MemoryStore::new()));
        engine.rebuild_from_rows(rows()).unwrap();
        assert_eq!(engine.load().unwrap().record_count(), 3);
        assert!(engine.search("").unwrap().is_empty());
    }
}
