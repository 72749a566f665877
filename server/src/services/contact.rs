//! Contact service — CRUD, search, lead upsert, and bulk import.
//!
//! DESIGN
//! ======
//! Emails are the natural key: they are stored lowercase under a unique
//! index, so lead capture from consultation forms and CSV imports can both
//! rely on `ON CONFLICT (email)` instead of read-then-write races.
//!
//! Validation is pure (`validate_*`) and runs in route handlers before any
//! query, so malformed requests never touch the pool.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::validation::{self, MAX_LONG_TEXT_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, ValidationError};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;
pub const MAX_SEARCH_RESULTS: i64 = 50;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("contact not found: {0}")]
    NotFound(Uuid),
    #[error("a contact with email {0} already exists")]
    DuplicateEmail(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactStatus {
    Lead,
    Prospect,
    Customer,
    Inactive,
}

impl ContactStatus {
    pub const ALL: [Self; 4] = [Self::Lead, Self::Prospect, Self::Customer, Self::Inactive];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Prospect => "prospect",
            Self::Customer => "customer",
            Self::Inactive => "inactive",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }

    /// Parse an optional status field.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the accepted values.
    pub fn parse_field(raw: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(v) => Self::parse(v)
                .map(Some)
                .ok_or_else(|| ValidationError::new("status", "must be one of lead, prospect, customer, inactive")),
        }
    }
}

/// Row from the `contacts` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: String,
    pub status: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Unvalidated contact payload as sent by the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Validated contact ready for insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: String,
    pub status: ContactStatus,
    pub notes: Option<String>,
}

/// Unvalidated partial update. Absent fields are left unchanged; for the
/// optional columns an empty string clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatchInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Validated partial update. `Some(None)` clears an optional column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub source: Option<String>,
    pub status: Option<ContactStatus>,
    pub notes: Option<Option<String>>,
}

impl ContactPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl ContactFilter {
    /// Clamp raw paging values into range.
    #[must_use]
    pub fn new(status: Option<ContactStatus>, limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            status,
            limit: limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Outcome of a bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub duplicates: usize,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate a full contact payload.
///
/// # Errors
///
/// Returns the first failing field.
pub fn validate_new_contact(input: &ContactInput) -> Result<NewContact, ValidationError> {
    Ok(NewContact {
        first_name: validation::required("firstName", &input.first_name, MAX_NAME_LEN)?,
        last_name: validation::optional("lastName", Some(&input.last_name), MAX_NAME_LEN)?.unwrap_or_default(),
        email: validation::email("email", &input.email)?,
        phone: validation::phone("phone", input.phone.as_deref())?,
        company: validation::optional("company", input.company.as_deref(), MAX_SHORT_TEXT_LEN)?,
        source: validation::optional("source", input.source.as_deref(), MAX_SHORT_TEXT_LEN)?
            .unwrap_or_else(|| "website".to_owned()),
        status: ContactStatus::parse_field(input.status.as_deref())?.unwrap_or(ContactStatus::Lead),
        notes: validation::optional("notes", input.notes.as_deref(), MAX_LONG_TEXT_LEN)?,
    })
}

/// Validate a partial update.
///
/// # Errors
///
/// Returns the first failing field, or an error when no field is present.
pub fn validate_patch(input: &ContactPatchInput) -> Result<ContactPatch, ValidationError> {
    let patch = ContactPatch {
        first_name: input
            .first_name
            .as_deref()
            .map(|v| validation::required("firstName", v, MAX_NAME_LEN))
            .transpose()?,
        last_name: input
            .last_name
            .as_deref()
            .map(|v| validation::optional("lastName", Some(v), MAX_NAME_LEN).map(Option::unwrap_or_default))
            .transpose()?,
        email: input.email.as_deref().map(|v| validation::email("email", v)).transpose()?,
        phone: input.phone.as_deref().map(|v| validation::phone("phone", Some(v))).transpose()?,
        company: input
            .company
            .as_deref()
            .map(|v| validation::optional("company", Some(v), MAX_SHORT_TEXT_LEN))
            .transpose()?,
        source: input
            .source
            .as_deref()
            .map(|v| validation::required("source", v, MAX_SHORT_TEXT_LEN))
            .transpose()?,
        status: ContactStatus::parse_field(input.status.as_deref())?,
        notes: input
            .notes
            .as_deref()
            .map(|v| validation::optional("notes", Some(v), MAX_LONG_TEXT_LEN))
            .transpose()?,
    };

    if patch.is_empty() {
        return Err(ValidationError::new("body", "must contain at least one field to update"));
    }
    Ok(patch)
}

/// Build an `ILIKE` pattern matching `query` as a literal substring.
#[must_use]
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// QUERIES
// =============================================================================

const CONTACT_COLUMNS: &str =
    "id, first_name, last_name, email, phone, company, source, status, notes, created_at, updated_at";

/// List contacts, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_contacts(pool: &PgPool, filter: ContactFilter) -> Result<Vec<Contact>, ContactError> {
    let sql = format!(
        "SELECT {CONTACT_COLUMNS}
         FROM contacts
         WHERE ($1::text IS NULL OR status = $1)
         ORDER BY created_at DESC, id
         LIMIT $2 OFFSET $3"
    );
    let rows = sqlx::query_as::<_, Contact>(&sql)
        .bind(filter.status.map(ContactStatus::as_str))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Case-insensitive substring search over names, email, company, and phone.
///
/// # Errors
///
/// Returns a validation error for a blank query, or a database error.
pub async fn search_contacts(pool: &PgPool, query: &str) -> Result<Vec<Contact>, ContactError> {
    if query.trim().is_empty() {
        return Err(ValidationError::new("query", "is required").into());
    }

    let sql = format!(
        "SELECT {CONTACT_COLUMNS}
         FROM contacts
         WHERE first_name ILIKE $1
            OR last_name ILIKE $1
            OR (first_name || ' ' || last_name) ILIKE $1
            OR email ILIKE $1
            OR company ILIKE $1
            OR phone ILIKE $1
         ORDER BY created_at DESC, id
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, Contact>(&sql)
        .bind(like_pattern(query))
        .bind(MAX_SEARCH_RESULTS)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert one contact.
///
/// # Errors
///
/// Returns [`ContactError::DuplicateEmail`] if the email is taken.
pub async fn create_contact(pool: &PgPool, contact: &NewContact) -> Result<Contact, ContactError> {
    let sql = format!(
        "INSERT INTO contacts (id, first_name, last_name, email, phone, company, source, status, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {CONTACT_COLUMNS}"
    );
    sqlx::query_as::<_, Contact>(&sql)
        .bind(Uuid::new_v4())
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.company)
        .bind(&contact.source)
        .bind(contact.status.as_str())
        .bind(&contact.notes)
        .fetch_one(pool)
        .await
        .map_err(|e| map_unique_violation(e, &contact.email))
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns [`ContactError::NotFound`] for an unknown ID and
/// [`ContactError::DuplicateEmail`] when changing to a taken email.
pub async fn update_contact(pool: &PgPool, id: Uuid, patch: &ContactPatch) -> Result<Contact, ContactError> {
    let sql = format!(
        "UPDATE contacts SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            email = COALESCE($4, email),
            phone = CASE WHEN $5 THEN $6 ELSE phone END,
            company = CASE WHEN $7 THEN $8 ELSE company END,
            source = COALESCE($9, source),
            status = COALESCE($10, status),
            notes = CASE WHEN $11 THEN $12 ELSE notes END,
            updated_at = now()
         WHERE id = $1
         RETURNING {CONTACT_COLUMNS}"
    );
    let email = patch.email.clone().unwrap_or_default();
    sqlx::query_as::<_, Contact>(&sql)
        .bind(id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(patch.phone.is_some())
        .bind(patch.phone.clone().flatten())
        .bind(patch.company.is_some())
        .bind(patch.company.clone().flatten())
        .bind(&patch.source)
        .bind(patch.status.map(ContactStatus::as_str))
        .bind(patch.notes.is_some())
        .bind(patch.notes.clone().flatten())
        .fetch_optional(pool)
        .await
        .map_err(|e| map_unique_violation(e, &email))?
        .ok_or(ContactError::NotFound(id))
}

/// Delete a contact. Linked opportunities and submissions keep their rows
/// with a null `contact_id`.
///
/// # Errors
///
/// Returns [`ContactError::NotFound`] for an unknown ID.
pub async fn delete_contact(pool: &PgPool, id: Uuid) -> Result<(), ContactError> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = $1").bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(ContactError::NotFound(id));
    }
    Ok(())
}

/// Find or create the contact behind an inbound lead and return its ID.
/// Existing contacts keep their stored details.
///
/// # Errors
///
/// Returns a database error if the upsert fails.
pub async fn upsert_lead(conn: &mut PgConnection, contact: &NewContact) -> Result<Uuid, ContactError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO contacts (id, first_name, last_name, email, phone, company, source, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (email) DO UPDATE SET updated_at = now()
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(&contact.first_name)
    .bind(&contact.last_name)
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(&contact.company)
    .bind(&contact.source)
    .bind(contact.status.as_str())
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Insert many contacts in one transaction, skipping emails that already
/// exist.
///
/// # Errors
///
/// Returns a database error; the transaction is rolled back.
pub async fn insert_many(pool: &PgPool, contacts: &[NewContact]) -> Result<InsertOutcome, ContactError> {
    let mut tx = pool.begin().await?;
    let mut outcome = InsertOutcome::default();

    for contact in contacts {
        let result = sqlx::query(
            "INSERT INTO contacts (id, first_name, last_name, email, phone, company, source, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.company)
        .bind(&contact.source)
        .bind(contact.status.as_str())
        .bind(&contact.notes)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            outcome.duplicates += 1;
        } else {
            outcome.inserted += 1;
        }
    }

    tx.commit().await?;
    Ok(outcome)
}

fn map_unique_violation(err: sqlx::Error, email: &str) -> ContactError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ContactError::DuplicateEmail(email.to_owned()),
        _ => ContactError::Database(err),
    }
}

#[cfg(test)]
#[path = "contact_test.rs"]
mod tests;
