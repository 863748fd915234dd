//! Error types for index construction and search.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Snapshot serialization error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("Corrupt store file {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Duplicate record id {0} in record store")]
    DuplicateRecordId(u32),

    #[error("Record id overflow after {0} records")]
    RecordIdOverflow(usize),

    #[error("Malformed source row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("Index has not been built yet (missing {0:?})")]
    NotBuilt(PathBuf),
}

impl EngineError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        EngineError::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Stable code for API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotBuilt(_) => "INDEX_NOT_BUILT",
            EngineError::MalformedRow { .. } | EngineError::RecordIdOverflow(_) => {
                "MALFORMED_SOURCE"
            }
            EngineError::Corrupt { .. } | EngineError::DuplicateRecordId(_) => "CORRUPT_STORE",
            _ => "INTERNAL_ERROR",
        }
    }
}
