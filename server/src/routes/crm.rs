//! CRM dashboard API: contacts, opportunities, and the submission inbox.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use super::response::{ApiError, ApiResult};
use crate::services::contact::{self, ContactFilter, ContactInput, ContactPatchInput, ContactStatus};
use crate::services::dashboard;
use crate::services::import;
use crate::services::opportunity::{self, OpportunityInput, OpportunityStage};
use crate::services::submission::{self, SubmissionFilter, SubmissionStatus};
use crate::services::validation::ValidationError;
use crate::state::AppState;

const IMPORT_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct ContactListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpportunityListQuery {
    pub stage: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionListQuery {
    pub status: Option<String>,
    pub source: Option<String>,
    pub limit: Option<i64>,
}

/// Invalid query-string filters are reported as 400.
fn bad_filter(err: ValidationError) -> ApiError {
    ApiError::bad_request(err.to_string())
}

/// `GET /api/crm/dashboard` — headline counts and recent submissions.
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let stats = dashboard::dashboard_stats(&state.pool).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

/// `GET /api/crm/contacts` — newest contacts first.
pub async fn list_contacts(
    State(state): State<AppState>,
    query: Result<Query<ContactListQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let status = ContactStatus::parse_field(query.status.as_deref()).map_err(bad_filter)?;
    let filter = ContactFilter::new(status, query.limit, query.offset);

    let contacts = contact::list_contacts(&state.pool, filter).await?;
    Ok(Json(json!({ "success": true, "contacts": contacts })))
}

/// `GET /api/crm/contacts/search/{query}`
pub async fn search_contacts(
    State(state): State<AppState>,
    query: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(query) = query?;
    if query.trim().is_empty() {
        return Err(ApiError::bad_request("search query is required"));
    }

    let contacts = contact::search_contacts(&state.pool, &query).await?;
    Ok(Json(json!({ "success": true, "contacts": contacts })))
}

/// `POST /api/crm/contacts`
pub async fn create_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(input) = body?;
    let new_contact = contact::validate_new_contact(&input)?;
    let created = contact::create_contact(&state.pool, &new_contact).await?;

    info!(contact_id = %created.id, source = %created.source, "contact created");
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "contact": created }))))
}

/// `PUT /api/crm/contacts/{id}` — update only the provided fields.
pub async fn update_contact(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<ContactPatchInput>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    let Json(input) = body?;
    let patch = contact::validate_patch(&input)?;
    let updated = contact::update_contact(&state.pool, id, &patch).await?;
    Ok(Json(json!({ "success": true, "contact": updated })))
}

/// `DELETE /api/crm/contacts/{id}`
pub async fn delete_contact(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    contact::delete_contact(&state.pool, id).await?;

    info!(contact_id = %id, "contact deleted");
    Ok(Json(json!({ "success": true })))
}

/// `POST /api/crm/contacts/import` — bulk import from a CSV upload.
///
/// Rows that fail validation or repeat an existing email are skipped; only
/// the remaining rows are inserted.
pub async fn import_contacts(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Value>> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMPORT_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }
    let bytes = upload.ok_or_else(|| ApiError::bad_request(format!("multipart field `{IMPORT_FIELD}` is required")))?;

    let parsed = import::parse_contacts_csv(&bytes)?;
    let outcome = if parsed.contacts.is_empty() {
        contact::InsertOutcome::default()
    } else {
        contact::insert_many(&state.pool, &parsed.contacts).await?
    };
    let skipped = parsed.errors.len() + parsed.duplicates + outcome.duplicates;

    info!(imported = outcome.inserted, skipped, "contacts imported");
    Ok(Json(json!({
        "success": true,
        "imported": outcome.inserted,
        "skipped": skipped,
        "errors": parsed.errors,
    })))
}

/// `GET /api/crm/opportunities`
pub async fn list_opportunities(
    State(state): State<AppState>,
    query: Result<Query<OpportunityListQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let stage = OpportunityStage::parse_field(query.stage.as_deref()).map_err(bad_filter)?;

    let opportunities = opportunity::list_opportunities(&state.pool, stage).await?;
    Ok(Json(json!({ "success": true, "opportunities": opportunities })))
}

/// `POST /api/crm/opportunities`
pub async fn create_opportunity(
    State(state): State<AppState>,
    body: Result<Json<OpportunityInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(input) = body?;
    let new_opportunity = opportunity::validate_new_opportunity(&input)?;
    let created = opportunity::create_opportunity(&state.pool, &new_opportunity).await?;

    info!(opportunity_id = %created.id, stage = %created.stage, "opportunity created");
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "opportunity": created }))))
}

/// `GET /api/crm/form-submissions`
pub async fn list_submissions(
    State(state): State<AppState>,
    query: Result<Query<SubmissionListQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let status = SubmissionStatus::parse_field(query.status.as_deref()).map_err(bad_filter)?;
    let filter = SubmissionFilter::new(status, query.source, query.limit);

    let submissions = submission::list_submissions(&state.pool, &filter).await?;
    Ok(Json(json!({ "success": true, "submissions": submissions })))
}

#[cfg(test)]
#[path = "crm_test.rs"]
mod tests;
