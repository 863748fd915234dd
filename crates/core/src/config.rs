//! Configuration for zipsearch.
//!
//! File names, CSV layouts and input limits are compile-time constants.
//! Where the stores live and how the upstream file is decoded is runtime
//! configuration, carried explicitly in [`EngineConfig`] and built from CLI
//! arguments and environment variables in the server binary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Decompressed upstream postal code file.
pub const SOURCE_FILE_NAME: &str = "KEN_ALL.CSV";

/// Record store file (CSV format).
pub const RECORD_FILE_NAME: &str = "KEN_ALL_OUTPUT.CSV";

/// Index store file (CSV format).
pub const INDEX_FILE_NAME: &str = "KEN_ALL_INDEX.CSV";

/// Record store file (snapshot format).
pub const RECORD_SNAPSHOT_NAME: &str = "KEN_ALL_OUTPUT.bin";

/// Index store file (snapshot format).
pub const INDEX_SNAPSHOT_NAME: &str = "KEN_ALL_INDEX.bin";

/// Header of the record store CSV, in column order.
pub const RECORD_HEADERS: [&str; 5] = [
    "uniqueId",
    "zipCode",
    "prefectures",
    "detailAddress1",
    "detailAddress2",
];

/// Header of the index store CSV, in column order.
pub const INDEX_HEADERS: [&str; 2] = ["indexKey", "uniqueIds"];

/// Separator between ids inside one index store cell.
pub const ID_SEPARATOR: char = ',';

/// Upstream column holding the 7-digit zip code.
pub const SOURCE_ZIP_CODE_COLUMN: usize = 2;
/// Upstream column holding the prefecture name.
pub const SOURCE_PREFECTURE_COLUMN: usize = 6;
/// Upstream column holding the city / ward name.
pub const SOURCE_DETAIL_1_COLUMN: usize = 7;
/// Upstream column holding the town area, possibly split across rows.
pub const SOURCE_DETAIL_2_COLUMN: usize = 8;

/// Opens a continuation: a town area fragment with this character and no
/// closing counterpart continues on the next row.
pub const OPEN_BRACKET: char = '（';

/// Closes a continuation.
pub const CLOSE_BRACKET: char = '）';

/// Default directory for the upstream file and both stores.
pub const DEFAULT_WORK_DIR: &str = "./data";

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum keyword length (in characters) accepted over HTTP.
///
/// Query cost grows with index size times keyword length.
pub const MAX_KEYWORD_CHARS: usize = 256;

/// Per-request timeout in seconds. Rebuilds are not bound by it.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum HTTP request body size in bytes.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Character encoding of the upstream source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceEncoding {
    /// Shift_JIS, as published by Japan Post.
    #[default]
    ShiftJis,
    /// UTF-8, for re-encoded or hand-written fixtures.
    Utf8,
}

impl FromStr for SourceEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sjis" | "shift_jis" | "shift-jis" => Ok(SourceEncoding::ShiftJis),
            "utf8" | "utf-8" => Ok(SourceEncoding::Utf8),
            other => Err(format!(
                "unknown source encoding '{other}' (expected shift_jis or utf8)"
            )),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceEncoding::ShiftJis => f.write_str("shift_jis"),
            SourceEncoding::Utf8 => f.write_str("utf8"),
        }
    }
}

/// On-disk encoding of the record and index stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageFormat {
    /// Fully quoted CSV with a header row; id lists are comma-joined.
    #[default]
    Csv,
    /// bincode payload with a CRC32 footer.
    Snapshot,
}

impl FromStr for StorageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(StorageFormat::Csv),
            "snapshot" | "bin" => Ok(StorageFormat::Snapshot),
            other => Err(format!(
                "unknown storage format '{other}' (expected csv or snapshot)"
            )),
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageFormat::Csv => f.write_str("csv"),
            StorageFormat::Snapshot => f.write_str("snapshot"),
        }
    }
}

/// Runtime configuration handed to the rebuild and search triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding both stores.
    pub work_dir: PathBuf,
    /// Decompressed upstream CSV read by a rebuild.
    pub source_file: PathBuf,
    pub source_encoding: SourceEncoding,
    pub storage_format: StorageFormat,
}

impl EngineConfig {
    /// Configuration rooted at `work_dir`, with the upstream file expected
    /// inside it under its published name.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let source_file = work_dir.join(SOURCE_FILE_NAME);
        Self {
            work_dir,
            source_file,
            source_encoding: SourceEncoding::default(),
            storage_format: StorageFormat::default(),
        }
    }

    pub fn with_source_file(mut self, source_file: impl Into<PathBuf>) -> Self {
        self.source_file = source_file.into();
        self
    }

    pub fn with_source_encoding(mut self, encoding: SourceEncoding) -> Self {
        self.source_encoding = encoding;
        self
    }

    pub fn with_storage_format(mut self, format: StorageFormat) -> Self {
        self.storage_format = format;
        self
    }

    /// Path of the record store for the configured format.
    pub fn record_path(&self) -> PathBuf {
        self.work_dir.join(match self.storage_format {
            StorageFormat::Csv => RECORD_FILE_NAME,
            StorageFormat::Snapshot => RECORD_SNAPSHOT_NAME,
        })
    }

    /// Path of the index store for the configured format.
    pub fn index_path(&self) -> PathBuf {
        self.work_dir.join(match self.storage_format {
            StorageFormat::Csv => INDEX_FILE_NAME,
            StorageFormat::Snapshot => INDEX_SNAPSHOT_NAME,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = EngineConfig::new("/tmp/zip");
        assert_eq!(config.source_file, PathBuf::from("/tmp/zip/KEN_ALL.CSV"));
        assert_eq!(
            config.record_path(),
            PathBuf::from("/tmp/zip/KEN_ALL_OUTPUT.CSV")
        );
        assert_eq!(
            config.index_path(),
            PathBuf::from("/tmp/zip/KEN_ALL_INDEX.CSV")
        );
    }

    #[test]
    fn test_snapshot_paths() {
        let config = EngineConfig::new("/tmp/zip").with_storage_format(StorageFormat::Snapshot);
        assert_eq!(
            config.record_path(),
            PathBuf::from("/tmp/zip/KEN_ALL_OUTPUT.bin")
        );
        assert_eq!(config.index_path(), PathBuf::from("/tmp/zip/KEN_ALL_INDEX.bin"));
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("SJIS".parse::<SourceEncoding>(), Ok(SourceEncoding::ShiftJis));
        assert_eq!("utf-8".parse::<SourceEncoding>(), Ok(SourceEncoding::Utf8));
        assert!("latin1".parse::<SourceEncoding>().is_err());
        assert_eq!("Snapshot".parse::<StorageFormat>(), Ok(StorageFormat::Snapshot));
        assert!("json".parse::<StorageFormat>().is_err());
    }
}
