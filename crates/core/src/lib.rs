//! # zipsearch-core
//!
//! Keyword search over a fixed postal address catalogue through a character
//! bigram inverted index.
//!
//! Building: upstream rows are merged into one record per logical address
//! (town-area names split across rows are joined), every record's text is cut
//! into overlapping two-character windows, and each window maps to the ids of
//! the records containing it. Searching: a keyword is stripped of whitespace
//! and split into characters; a record matches when every character occurs in
//! one of its bigrams.
//!
//! ```text
//! KEN_ALL.CSV → merge_rows → AddressRecord[] → build_index → BigramIndex
//!                                 ↓                              ↓
//!                           RecordStore                     IndexStore
//! keyword → split_keyword → candidates per char → AND → records → sorted entries
//! ```
//!
//! This crate has no async dependencies; the server crate drives it from
//! blocking tasks.

/// Raw rows, canonical records and search hits.
pub mod address;
/// Bigram tokenization and the inverted index.
pub mod bigram;
/// Compile-time constants and the runtime `EngineConfig`.
pub mod config;
/// Rebuild and search triggers.
pub mod engine;
/// Error type shared by every fallible operation.
pub mod error;
/// Continuation-row merging.
pub mod merge;
/// Query execution and the loaded catalogue.
pub mod search;
/// Store contract, file and memory stores, upstream source reader.
pub mod storage;

pub use address::{AddressEntry, AddressRecord, RawRow};
pub use bigram::{build_index, BigramIndex};
pub use config::EngineConfig;
pub use engine::{rebuild_index, search_address, BuildSummary, SearchEngine};
pub use error::{EngineError, Result};
pub use merge::merge_rows;
pub use search::Catalogue;
