//! Keyword and address tokenization.
//!
//! Works on Unicode scalar values, so a bigram is two characters regardless of
//! how many bytes they take in UTF-8.

/// Remove every whitespace character, including the ideographic space U+3000.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Normalize a keyword and decompose it into single characters.
///
/// An empty or all-whitespace keyword yields no characters.
pub fn split_keyword(keyword: &str) -> Vec<char> {
    normalize_keyword(keyword).chars().collect()
}

/// Every window of two consecutive characters, in order, duplicates included.
/// Text shorter than two characters has none.
pub fn bigrams(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.char_indices()
        .zip(text.char_indices().skip(1))
        .map(move |((start, _), (last, c))| &text[start..last + c.len_utf8()])
}
