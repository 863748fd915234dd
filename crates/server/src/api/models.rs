//! Request and response data transfer objects for the HTTP API.

use serde::{Deserialize, Serialize};
use zipsearch_core::{AddressEntry, BuildSummary};

/// Shown when a search matches nothing.
pub const NO_HITS_MESSAGE: &str = "1件もヒットしませんでした";

/// Shown after a successful rebuild.
pub const REBUILT_MESSAGE: &str = "インデックスファイルの作成が完了しました";

/// Query string of `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
}

/// One matched address.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddressHit {
    pub zip_code: String,
    pub prefecture: String,
    pub detail_address1: String,
    pub detail_address2: String,
    /// Quoted tuple rendering; results are ordered by it.
    pub formatted: String,
}

impl From<AddressEntry> for AddressHit {
    fn from(entry: AddressEntry) -> Self {
        let formatted = entry.to_string();
        AddressHit {
            zip_code: entry.zip_code,
            prefecture: entry.prefecture,
            detail_address1: entry.detail_address1,
            detail_address2: entry.detail_address2,
            formatted,
        }
    }
}

/// Response body for `GET /search`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub keyword: String,
    pub count: usize,
    pub results: Vec<AddressHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response body for `POST /index`.
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    #[serde(flatten)]
    pub summary: BuildSummary,
    pub elapsed_ms: u64,
    pub message: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub catalogue_loaded: bool,
    pub records: usize,
    pub bigrams: usize,
    pub uptime_seconds: u64,
}
