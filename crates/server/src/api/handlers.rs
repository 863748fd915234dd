//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;
use zipsearch_core::config;
use zipsearch_core::{Catalogue, SearchEngine};

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    /// Catalogue currently served. Replaced whole after a rebuild.
    pub catalogue: Arc<RwLock<Option<Arc<Catalogue>>>>,
    /// Serializes store access: rebuilds write both files, lazy loads read them.
    pub store_gate: Arc<Mutex<()>>,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: SearchEngine, prometheus_handle: PrometheusHandle) -> Self {
        Self {
            engine: Arc::new(engine),
            catalogue: Arc::new(RwLock::new(None)),
            store_gate: Arc::new(Mutex::new(())),
            prometheus_handle,
            start_time: Instant::now(),
        }
    }

    /// Load the catalogue from the stores if none is served yet.
    ///
    /// Blocking; call from `spawn_blocking`.
    pub fn load_catalogue(&self) -> Result<Arc<Catalogue>, ApiError> {
        if let Some(catalogue) = self.catalogue.read().as_ref() {
            return Ok(Arc::clone(catalogue));
        }
        let _gate = self.store_gate.lock();
        // A rebuild may have swapped one in while we waited.
        if let Some(catalogue) = self.catalogue.read().as_ref() {
            return Ok(Arc::clone(catalogue));
        }
        let catalogue = Arc::new(self.engine.load()?);
        metrics::update_catalogue_metrics(&catalogue);
        *self.catalogue.write() = Some(Arc::clone(&catalogue));
        Ok(catalogue)
    }
}

fn validate_keyword(keyword: &str) -> Result<(), ApiError> {
    let len = keyword.chars().count();
    if len > config::MAX_KEYWORD_CHARS {
        return Err(ApiError::BadRequest(format!(
            "keyword must be at most {} characters, got {}",
            config::MAX_KEYWORD_CHARS,
            len
        )));
    }
    Ok(())
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let catalogue = state.catalogue.read().clone();
    let (records, bigrams) = catalogue
        .as_ref()
        .map(|c| (c.record_count(), c.bigram_count()))
        .unwrap_or((0, 0));
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
            catalogue_loaded: catalogue.is_some(),
            records,
            bigrams,
            uptime_seconds: state.start_time.elapsed().as_secs(),
        }),
    )
}

/// `GET /search?keyword=...`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    validate_keyword(&params.keyword)?;

    let keyword = params.keyword.clone();
    let results = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let catalogue = state.load_catalogue()?;
        Ok(catalogue.search(&keyword))
    })
    .await??;

    metrics::record_search(results.len());
    let count = results.len();
    Ok(Json(SearchResponse {
        keyword: params.keyword,
        count,
        results: results.into_iter().map(AddressHit::from).collect(),
        message: (count == 0).then(|| NO_HITS_MESSAGE.to_string()),
    }))
}

/// `POST /index`
///
/// Rebuilds from the configured upstream file, then swaps the served
/// catalogue. Searches keep using the previous catalogue until the swap.
pub async fn rebuild_index(State(state): State<AppState>) -> Result<Json<RebuildResponse>, ApiError> {
    let start = Instant::now();
    let summary = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let _gate = state.store_gate.lock();
        let (catalogue, summary) = state.engine.rebuild()?;
        metrics::update_catalogue_metrics(&catalogue);
        *state.catalogue.write() = Some(Arc::new(catalogue));
        Ok(summary)
    })
    .await??;

    let elapsed = start.elapsed();
    metrics::record_rebuild(&summary, elapsed);
    tracing::info!(
        "Rebuild complete: {} records, {} bigrams in {:?}",
        summary.records,
        summary.bigrams,
        elapsed
    );
    Ok(Json(RebuildResponse {
        summary,
        elapsed_ms: elapsed.as_millis() as u64,
        message: REBUILT_MESSAGE.to_string(),
    }))
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}
