//! Consultation form intake for the service landing pages.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{Value, json};

use super::response::{ApiError, ApiResult};
use crate::services::consultation::{self, ConsultationKind, ConsultationRequest};
use crate::state::AppState;

/// `POST /api/{service}/consultation` — store a consultation request.
pub async fn submit(
    State(state): State<AppState>,
    service: Result<Path<String>, PathRejection>,
    body: Result<Json<ConsultationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Path(service) = service?;
    let kind = ConsultationKind::from_slug(&service)
        .ok_or_else(|| ApiError::not_found(format!("unknown service: {service}")))?;
    let Json(req) = body?;

    let valid = consultation::validate(kind, req)?;
    let submission_id = consultation::submit(&state.pool, &valid).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "submissionId": submission_id,
            "message": valid.confirmation(),
        })),
    ))
}

#[cfg(test)]
#[path = "consultations_test.rs"]
mod tests;
