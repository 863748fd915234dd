//! CSV record and index files.
//!
//! Record file: header `uniqueId,zipCode,prefectures,detailAddress1,detailAddress2`,
//! one row per record. Index file: header `indexKey,uniqueIds`, one row per
//! bigram with its postings joined by commas in stored order, repetitions
//! included. Every field is quoted. UTF-8 throughout.

use crate::address::AddressRecord;
use crate::bigram::BigramIndex;
use crate::config::{ID_SEPARATOR, INDEX_HEADERS, RECORD_HEADERS};
use crate::error::{EngineError, Result};
use crate::storage::persistence::{not_built_if_missing, write_atomic};
use crate::storage::{IndexStore, RecordStore};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Column layout of the record file.
#[derive(Debug, Serialize, Deserialize)]
struct RecordRow {
    #[serde(rename = "uniqueId")]
    unique_id: u32,
    #[serde(rename = "zipCode")]
    zip_code: String,
    #[serde(rename = "prefectures")]
    prefecture: String,
    #[serde(rename = "detailAddress1")]
    detail_address1: String,
    #[serde(rename = "detailAddress2")]
    detail_address2: String,
}

impl From<RecordRow> for AddressRecord {
    fn from(row: RecordRow) -> Self {
        AddressRecord {
            id: row.unique_id,
            zip_code: row.zip_code,
            prefecture: row.prefecture,
            detail_address1: row.detail_address1,
            detail_address2: row.detail_address2,
        }
    }
}

impl From<&AddressRecord> for RecordRow {
    fn from(record: &AddressRecord) -> Self {
        RecordRow {
            unique_id: record.id,
            zip_code: record.zip_code.clone(),
            prefecture: record.prefecture.clone(),
            detail_address1: record.detail_address1.clone(),
            detail_address2: record.detail_address2.clone(),
        }
    }
}

/// Join postings into the stored `1,1,42` form.
pub fn join_ids(ids: &[u32]) -> String {
    let mut out = String::with_capacity(ids.len() * 6);
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push(ID_SEPARATOR);
        }
        out.push_str(&id.to_string());
    }
    out
}

/// Parse a stored postings cell. `None` if any piece is not a decimal id.
pub fn split_ids(cell: &str) -> Option<Vec<u32>> {
    cell.split(ID_SEPARATOR)
        .map(|piece| piece.trim().parse::<u32>().ok())
        .collect()
}

/// Record and index stores backed by two CSV files.
#[derive(Debug, Clone)]
pub struct CsvStore {
    record_path: PathBuf,
    index_path: PathBuf,
}

impl CsvStore {
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

    fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
        let file = File::open(path).map_err(|e| not_built_if_missing(e, path))?;
        Ok(csv::ReaderBuilder::new().has_headers(true).from_reader(file))
    }
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'));
    builder
}

impl RecordStore for CsvStore {
    fn load_all_records(&self) -> Result<Vec<AddressRecord>> {
        let mut reader = Self::open_reader(&self.record_path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<RecordRow>() {
            records.push(row?.into());
        }
        tracing::debug!(
            "Read {} records from {:?}",
            records.len(),
            self.record_path
        );
        Ok(records)
    }

    fn save_all_records(&self, records: &[AddressRecord]) -> Result<()> {
        let bytes = write_atomic(&self.record_path, |w| {
            let mut writer = writer_builder().from_writer(w);
            writer.write_record(RECORD_HEADERS)?;
            for record in records {
                writer.serialize(RecordRow::from(record))?;
            }
            writer.flush()?;
            Ok(())
        })?;
        tracing::info!(
            "Wrote {} records to {:?} ({} bytes)",
            records.len(),
            self.record_path,
            bytes
        );
        Ok(())
    }
}

impl IndexStore for CsvStore {
    fn load_index(&self) -> Result<BigramIndex> {
        let mut reader = Self::open_reader(&self.index_path)?;
        let mut index = BigramIndex::new();
        for row in reader.records() {
            let row = row?;
            let (Some(bigram), Some(cell)) = (row.get(0), row.get(1)) else {
                return Err(EngineError::corrupt(
                    &self.index_path,
                    format!("index row with {} columns", row.len()),
                ));
            };
            let ids = split_ids(cell).ok_or_else(|| {
                EngineError::corrupt(
                    &self.index_path,
                    format!("unparsable id list for bigram '{bigram}'"),
                )
            })?;
            index.insert(bigram, ids);
        }
        tracing::debug!("Read {} bigrams from {:?}", index.len(), self.index_path);
        Ok(index)
    }

    fn save_index(&self, index: &BigramIndex) -> Result<()> {
        let bytes = write_atomic(&self.index_path, |w| {
            let mut writer = writer_builder().from_writer(w);
            writer.write_record(INDEX_HEADERS)?;
            for (bigram, ids) in index.sorted_entries() {
                writer.write_record([bigram, join_ids(ids).as_str()])?;
            }
            writer.flush()?;
            Ok(())
        })?;
        tracing::info!(
            "Wrote {} bigrams to {:?} ({} bytes)",
            index.len(),
            self.index_path,
            bytes
        );
        Ok(())
    }
}
