//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the estimate endpoint used by the quote forms, the
//! consultation intake posted by each service landing page, and the CRM API
//! behind the dashboard. Every JSON response carries a `success` flag.

pub mod consultations;
pub mod crm;
pub mod estimates;
pub mod response;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let origin = match state.cors_allow_origin.clone() {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any);

    let import = post(crm::import_contacts).layer(DefaultBodyLimit::max(state.max_import_bytes));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/products", get(estimates::list_products))
        .route("/api/estimate", post(estimates::create_estimate))
        .route("/api/{service}/consultation", post(consultations::submit))
        .route("/api/crm/dashboard", get(crm::dashboard))
        .route("/api/crm/contacts", get(crm::list_contacts).post(crm::create_contact))
        .route("/api/crm/contacts/search/{query}", get(crm::search_contacts))
        .route("/api/crm/contacts/import", import)
        .route("/api/crm/contacts/{id}", put(crm::update_contact).delete(crm::delete_contact))
        .route("/api/crm/opportunities", get(crm::list_opportunities).post(crm::create_opportunity))
        .route("/api/crm/form-submissions", get(crm::list_submissions))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
