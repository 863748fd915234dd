//! Keyword query execution against a bigram index.
//!
//! A keyword is stripped of whitespace and cut into single characters. For
//! each character, every bigram key containing it contributes its postings to
//! that character's candidate set. A record matches when it is a candidate for
//! every character (AND). Matches are materialized from the record map and
//! ordered by their quoted tuple rendering, not by id.

use crate::address::{AddressEntry, AddressRecord};
use crate::bigram::tokenizer::split_keyword;
use crate::bigram::BigramIndex;
use std::collections::{HashMap, HashSet};

/// Ids of every record holding a bigram that contains `c`.
pub fn candidates_for_char(index: &BigramIndex, c: char) -> HashSet<u32> {
    let mut candidates = HashSet::new();
    for (gram, postings) in index.iter() {
        if gram.contains(c) {
            candidates.extend(postings.iter().copied());
        }
    }
    candidates
}

/// Intersect the candidate sets of all `chars`. No characters, no matches.
pub fn matching_ids(index: &BigramIndex, chars: &[char]) -> HashSet<u32> {
    let mut running: Option<HashSet<u32>> = None;
    for &c in chars {
        let candidates = candidates_for_char(index, c);
        let next = match running {
            None => candidates,
            Some(mut ids) => {
                ids.retain(|id| candidates.contains(id));
                ids
            }
        };
        if next.is_empty() {
            return next;
        }
        running = Some(next);
    }
    running.unwrap_or_default()
}

/// Run `keyword` against `index` and materialize hits from `records`.
///
/// Ids present in the index but absent from `records` are skipped. An empty
/// keyword or an empty index yields an empty list.
pub fn execute_query(
    keyword: &str,
    index: &BigramIndex,
    records: &HashMap<u32, AddressRecord>,
) -> Vec<AddressEntry> {
    let chars = split_keyword(keyword);
    if chars.is_empty() || index.is_empty() {
        return Vec::new();
    }

    let ids = matching_ids(index, &chars);
    let mut results: Vec<AddressEntry> = Vec::with_capacity(ids.len());
    let mut dangling = 0usize;
    for id in &ids {
        match records.get(id) {
            Some(record) => results.push(record.entry()),
            None => dangling += 1,
        }
    }
    if dangling > 0 {
        tracing::warn!(
            "Skipped {} indexed ids with no stored record; index and record store may be out of sync",
            dangling
        );
    }

    results.sort_by_cached_key(|entry| entry.to_string());
    tracing::debug!(
        "Query '{}' ({} chars): {} ids, {} results",
        keyword,
        chars.len(),
        ids.len(),
        results.len()
    );
    results
}
