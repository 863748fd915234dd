//! zipsearch-server: CLI and HTTP front end for zipsearch.
//!
//! Index construction and query logic live in `zipsearch-core`; this crate
//! only triggers them.

/// HTTP API layer: Axum router, handlers, models and metrics.
pub mod api;
