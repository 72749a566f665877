//! Form submission service — the inbox behind every landing-page form.

use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::validation::ValidationError;

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    New,
    Reviewed,
    Archived,
}

impl SubmissionStatus {
    pub const ALL: [Self; 3] = [Self::New, Self::Reviewed, Self::Archived];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reviewed => "reviewed",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }

    /// Parse an optional status query value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the accepted values.
    pub fn parse_field(raw: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(v) => Self::parse(v)
                .map(Some)
                .ok_or_else(|| ValidationError::new("status", "must be one of new, reviewed, archived")),
        }
    }
}

/// Row from the `form_submissions` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub id: Uuid,
    pub form_type: String,
    pub source: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub details: serde_json::Value,
    pub contact_id: Option<Uuid>,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub form_type: String,
    pub source: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub details: serde_json::Value,
    pub contact_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub source: Option<String>,
    pub limit: i64,
}

impl SubmissionFilter {
    #[must_use]
    pub fn new(status: Option<SubmissionStatus>, source: Option<String>, limit: Option<i64>) -> Self {
        Self {
            status,
            source: source.map(|s| s.trim().to_ascii_lowercase()).filter(|s| !s.is_empty()),
            limit: limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT),
        }
    }
}

const SUBMISSION_COLUMNS: &str =
    "id, form_type, source, name, email, phone, company, message, details, contact_id, status, created_at";

/// List submissions, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_submissions(pool: &PgPool, filter: &SubmissionFilter) -> Result<Vec<FormSubmission>, sqlx::Error> {
    let sql = format!(
        "SELECT {SUBMISSION_COLUMNS}
         FROM form_submissions
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::text IS NULL OR source = $2)
         ORDER BY created_at DESC, id
         LIMIT $3"
    );
    let rows = sqlx::query_as::<_, FormSubmission>(&sql)
        .bind(filter.status.map(SubmissionStatus::as_str))
        .bind(filter.source.as_deref())
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert one submission and return its ID.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn insert_submission(conn: &mut PgConnection, submission: &NewSubmission) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO form_submissions
            (id, form_type, source, name, email, phone, company, message, details, contact_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(id)
    .bind(&submission.form_type)
    .bind(&submission.source)
    .bind(&submission.name)
    .bind(&submission.email)
    .bind(&submission.phone)
    .bind(&submission.company)
    .bind(&submission.message)
    .bind(&submission.details)
    .bind(submission.contact_id)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}
