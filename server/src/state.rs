//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the product catalog used by the estimate
//! endpoint, and the few request limits the router needs at build time.

use std::sync::Arc;

use axum::http::HeaderValue;
use estimate::Catalog;
use sqlx::PgPool;

use crate::config::{DEFAULT_MAX_IMPORT_BYTES, ServerConfig};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog: Arc<Catalog>,
    /// Upper bound on the CSV import request body.
    pub max_import_bytes: usize,
    /// Allowed CORS origin. `None` allows any origin.
    pub cors_allow_origin: Option<HeaderValue>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, catalog: Catalog) -> Self {
        Self { pool, catalog: Arc::new(catalog), max_import_bytes: DEFAULT_MAX_IMPORT_BYTES, cors_allow_origin: None }
    }

    /// Build state from loaded configuration.
    #[must_use]
    pub fn from_config(pool: PgPool, catalog: Catalog, config: &ServerConfig) -> Self {
        Self {
            max_import_bytes: config.max_import_bytes,
            cors_allow_origin: config.cors_allow_origin.clone(),
            ..Self::new(pool, catalog)
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
