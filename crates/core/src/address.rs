//! Address types for zipsearch.
//!
//! A [`RawRow`] is one line of the upstream file; one logical address may be
//! spread over several of them. An [`AddressRecord`] is a logical address after
//! merging, carrying the id the index refers to. An [`AddressEntry`] is what a
//! search hands back for one matched record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four upstream columns the engine uses, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    pub zip_code: String,
    pub prefecture: String,
    pub detail_address1: String,
    /// Town area, or one fragment of it for rows that continue.
    pub detail_address2: String,
}

impl RawRow {
    pub fn new(
        zip_code: impl Into<String>,
        prefecture: impl Into<String>,
        detail_address1: impl Into<String>,
        detail_address2: impl Into<String>,
    ) -> Self {
        Self {
            zip_code: zip_code.into(),
            prefecture: prefecture.into(),
            detail_address1: detail_address1.into(),
            detail_address2: detail_address2.into(),
        }
    }
}

/// One canonical address, created once per build and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Dense 1-based id in emission order. Only stable within one build.
    pub id: u32,
    pub zip_code: String,
    pub prefecture: String,
    pub detail_address1: String,
    pub detail_address2: String,
}

impl AddressRecord {
    /// The searchable text: prefecture, then both detail fields.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.prefecture.len() + self.detail_address1.len() + self.detail_address2.len(),
        );
        text.push_str(&self.prefecture);
        text.push_str(&self.detail_address1);
        text.push_str(&self.detail_address2);
        text
    }

    pub fn entry(&self) -> AddressEntry {
        AddressEntry {
            zip_code: self.zip_code.clone(),
            prefecture: self.prefecture.clone(),
            detail_address1: self.detail_address1.clone(),
            detail_address2: self.detail_address2.clone(),
        }
    }
}

/// A search hit: the record's fields without its id.
///
/// `Display` renders the quoted tuple form `"1000001","東京都","千代田区","千代田"`,
/// which is also the sort key of a result list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressEntry {
    pub zip_code: String,
    pub prefecture: String,
    pub detail_address1: String,
    pub detail_address2: String,
}

impl fmt::Display for AddressEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\",\"{}\",\"{}\",\"{}\"",
            self.zip_code, self.prefecture, self.detail_address1, self.detail_address2
        )
    }
}
