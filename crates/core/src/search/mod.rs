//! Keyword search over a built catalogue.
//!
//! [`query`] holds the matching algorithm over a bigram index and a record
//! map. [`Catalogue`] pairs both artifacts of one build generation so queries
//! never mix an index with records from another build.

/// Loaded index and records of one build generation.
pub mod catalogue;
/// Keyword decomposition, candidate sets, AND intersection and result ordering.
pub mod query;

pub use catalogue::Catalogue;
pub use query::{candidates_for_char, execute_query, matching_ids};
