//! Character-bigram indexing.
//!
//! Addresses are indexed by every pair of adjacent characters in their search
//! text. Keywords are not cut into bigrams: they are decomposed into single
//! characters, each matched against the bigram keys that contain it.

/// Bigram inverted index and its builder.
pub mod inverted_index;
/// Keyword normalization, character decomposition and bigram windowing.
pub mod tokenizer;

pub use inverted_index::{build_index, BigramIndex};
pub use tokenizer::{bigrams, normalize_keyword, split_keyword};
