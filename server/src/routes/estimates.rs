//! Product catalog and coverage estimate routes.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use estimate::{CalculationResult, DEFAULT_COAT_COUNT, DisplayEstimate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::response::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub surface_area: f64,
    pub product_key: String,
    #[serde(default = "default_coat_count")]
    pub coat_count: u32,
}

fn default_coat_count() -> u32 {
    DEFAULT_COAT_COUNT
}

/// Calculation result plus the two-decimal strings a form displays.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub result: CalculationResult,
    pub display: DisplayEstimate,
}

impl From<CalculationResult> for EstimateResponse {
    fn from(result: CalculationResult) -> Self {
        let display = DisplayEstimate::from(&result);
        Self { result, display }
    }
}

/// `GET /api/products` — list the coating catalog.
pub async fn list_products(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "success": true, "products": state.catalog.products() }))
}

/// `POST /api/estimate` — compute gallons and cost for one product.
pub async fn create_estimate(
    State(state): State<AppState>,
    body: Result<Json<EstimateRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    let result = state.catalog.estimate(&req.product_key, req.surface_area, req.coat_count).inspect_err(|err| {
        tracing::debug!(error = %err, product = %req.product_key, "estimate rejected");
    })?;
    Ok(Json(json!({ "success": true, "estimate": EstimateResponse::from(result) })))
}

#[cfg(test)]
#[path = "estimates_test.rs"]
mod tests;
