//! JSON error envelope shared by every API route.
//!
//! Failures render as `{ "success": false, "error": "..." }` with a non-2xx
//! status. Database details are logged and replaced by a generic message.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use estimate::EstimateError;
use serde_json::json;

use crate::services::consultation::ConsultationError;
use crate::services::contact::ContactError;
use crate::services::import::ImportError;
use crate::services::opportunity::OpportunityError;
use crate::services::validation::ValidationError;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Log `err` and hide it behind a 500.
    #[must_use]
    pub fn internal(err: &dyn std::error::Error) -> Self {
        tracing::error!(error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "success": false, "error": self.message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::internal(&err)
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Validation(e) => e.into(),
            ContactError::NotFound(_) => Self::not_found(err.to_string()),
            ContactError::DuplicateEmail(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            ContactError::Database(e) => Self::internal(&e),
        }
    }
}

impl From<OpportunityError> for ApiError {
    fn from(err: OpportunityError) -> Self {
        match err {
            OpportunityError::Validation(e) => e.into(),
            OpportunityError::ContactNotFound(_) => Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            OpportunityError::Database(e) => Self::internal(&e),
        }
    }
}

impl From<ConsultationError> for ApiError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::Contact(e) => e.into(),
            ConsultationError::Database(e) => Self::internal(&e),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<EstimateError> for ApiError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::InvalidSurfaceArea(_)
            | EstimateError::InvalidCoatCount(_)
            | EstimateError::AreaTooLarge(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            EstimateError::UnknownProduct(_) => Self::not_found(err.to_string()),
            EstimateError::InvalidCatalog(_) => Self::internal(&err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

#[cfg(test)]
#[path = "response_test.rs"]
mod tests;
