//! Bigram inverted index.
//!
//! Maps each bigram to the ids of the records whose search text contains it.
//! Postings are appended once per occurrence: a record holding the same bigram
//! at three offsets contributes its id three times. Query-side deduplication
//! absorbs the repetition; the stored lists keep it.

use crate::address::AddressRecord;
use crate::bigram::tokenizer::bigrams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bigram → postings list of record ids, in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigramIndex {
    entries: HashMap<String, Vec<u32>>,
}

impl BigramIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record.id` to the postings of every bigram of its search text.
    pub fn add_record(&mut self, record: &AddressRecord) {
        let text = record.search_text();
        for gram in bigrams(&text) {
            match self.entries.get_mut(gram) {
                Some(postings) => postings.push(record.id),
                None => {
                    self.entries.insert(gram.to_string(), vec![record.id]);
                }
            }
        }
    }

    /// Replace the postings stored for `bigram`. Used by store loaders.
    pub fn insert(&mut self, bigram: impl Into<String>, postings: Vec<u32>) {
        self.entries.insert(bigram.into(), postings);
    }

    pub fn get(&self, bigram: &str) -> Option<&[u32]> {
        self.entries.get(bigram).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> + '_ {
        self.entries
            .iter()
            .map(|(gram, postings)| (gram.as_str(), postings.as_slice()))
    }

    /// Entries ordered by bigram, for reproducible store files.
    pub fn sorted_entries(&self) -> Vec<(&str, &[u32])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Number of distinct bigrams.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total postings across all bigrams, repetitions included.
    pub fn posting_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Build a fresh index from the full record set.
pub fn build_index(records: &[AddressRecord]) -> BigramIndex {
    let mut index = BigramIndex::new();
    for record in records {
        index.add_record(record);
    }
    tracing::debug!(
        "Built bigram index: {} bigrams, {} postings from {} records",
        index.len(),
        index.posting_count(),
        records.len()
    );
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, prefecture: &str, detail1: &str, detail2: &str) -> AddressRecord {
        AddressRecord {
            id,
            zip_code: format!("{:07}", id),
            prefecture: prefecture.into(),
            detail_address1: detail1.into(),
            detail_address2: detail2.into(),
        }
    }

    #[test]
    fn test_bigrams_span_field_boundaries() {
        let index = build_index(&[record(1, "東京都", "港区", "")]);
        assert_eq!(index.get("都港"), Some(&[1][..]));
        assert_eq!(index.get("東京"), Some(&[1][..]));
        assert_eq!(index.get("港区"), Some(&[1][..]));
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_repeated_bigram_appends_repeatedly() {
        let index = build_index(&[record(3, "ああ", "ああ", "")]);
        assert_eq!(index.get("ああ"), Some(&[3, 3, 3][..]));
        assert_eq!(index.posting_count(), 3);
    }

    #[test]
    fn test_postings_follow_record_order() {
        let index = build_index(&[
            record(1, "京都府", "", ""),
            record(2, "東京都", "", ""),
            record(3, "京都府", "京都市", ""),
        ]);
        assert_eq!(index.get("京都"), Some(&[1, 2, 3, 3][..]));
    }

    #[test]
    fn test_short_text_contributes_nothing() {
        let index = build_index(&[record(1, "都", "", ""), record(2, "", "", "")]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let records = vec![
            record(1, "北海道", "札幌市中央区", "大通西"),
            record(2, "北海道", "札幌市北区", "北七条西"),
        ];
        assert_eq!(build_index(&records), build_index(&records));
    }

    #[test]
    fn test_sorted_entries() {
        let index = build_index(&[record(1, "cab", "", "")]);
        let keys: Vec<&str> = index.sorted_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ab", "ca"]);
    }
}
