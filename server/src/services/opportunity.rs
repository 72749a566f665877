//! Opportunity service — sales pipeline rows linked to contacts.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::validation::{self, MAX_SHORT_TEXT_LEN, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum OpportunityError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("contact not found: {0}")]
    ContactNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpportunityStage {
    New,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl OpportunityStage {
    pub const ALL: [Self; 6] = [Self::New, Self::Qualified, Self::Proposal, Self::Negotiation, Self::Won, Self::Lost];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }

    /// Open stages count toward pipeline value.
    #[must_use]
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Won | Self::Lost)
    }

    /// Parse an optional stage field.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the accepted values.
    pub fn parse_field(raw: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match raw.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(None),
            Some(v) => Self::parse(v).map(Some).ok_or_else(|| {
                ValidationError::new("stage", "must be one of new, qualified, proposal, negotiation, won, lost")
            }),
        }
    }
}

/// Row from the `opportunities` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: Uuid,
    pub contact_id: Option<Uuid>,
    pub title: String,
    pub value: f64,
    pub stage: String,
    pub service: Option<String>,
    pub expected_close_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityInput {
    #[serde(default)]
    pub title: String,
    pub contact_id: Option<Uuid>,
    pub value: Option<f64>,
    pub stage: Option<String>,
    pub service: Option<String>,
    pub expected_close_date: Option<Date>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOpportunity {
    pub title: String,
    pub contact_id: Option<Uuid>,
    pub value: f64,
    pub stage: OpportunityStage,
    pub service: Option<String>,
    pub expected_close_date: Option<Date>,
}

/// Validate an opportunity payload.
///
/// # Errors
///
/// Returns the first failing field.
pub fn validate_new_opportunity(input: &OpportunityInput) -> Result<NewOpportunity, ValidationError> {
    let value = input.value.unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new("value", "must be zero or a positive amount"));
    }

    Ok(NewOpportunity {
        title: validation::required("title", &input.title, MAX_SHORT_TEXT_LEN)?,
        contact_id: input.contact_id,
        value,
        stage: OpportunityStage::parse_field(input.stage.as_deref())?.unwrap_or(OpportunityStage::New),
        service: validation::optional("service", input.service.as_deref(), MAX_SHORT_TEXT_LEN)?,
        expected_close_date: input.expected_close_date,
    })
}

const OPPORTUNITY_COLUMNS: &str =
    "id, contact_id, title, value, stage, service, expected_close_date, created_at, updated_at";

/// List opportunities, newest first, optionally filtered by stage.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_opportunities(
    pool: &PgPool,
    stage: Option<OpportunityStage>,
) -> Result<Vec<Opportunity>, OpportunityError> {
    let sql = format!(
        "SELECT {OPPORTUNITY_COLUMNS}
         FROM opportunities
         WHERE ($1::text IS NULL OR stage = $1)
         ORDER BY created_at DESC, id"
    );
    let rows = sqlx::query_as::<_, Opportunity>(&sql)
        .bind(stage.map(OpportunityStage::as_str))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert one opportunity.
///
/// # Errors
///
/// Returns [`OpportunityError::ContactNotFound`] if `contact_id` does not
/// reference an existing contact.
pub async fn create_opportunity(pool: &PgPool, opp: &NewOpportunity) -> Result<Opportunity, OpportunityError> {
    let sql = format!(
        "INSERT INTO opportunities (id, contact_id, title, value, stage, service, expected_close_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {OPPORTUNITY_COLUMNS}"
    );
    sqlx::query_as::<_, Opportunity>(&sql)
        .bind(Uuid::new_v4())
        .bind(opp.contact_id)
        .bind(&opp.title)
        .bind(opp.value)
        .bind(opp.stage.as_str())
        .bind(&opp.service)
        .bind(opp.expected_close_date)
        .fetch_one(pool)
        .await
        .map_err(|err| match (&err, opp.contact_id) {
            (sqlx::Error::Database(db), Some(contact_id)) if db.is_foreign_key_violation() => {
                OpportunityError::ContactNotFound(contact_id)
            }
            _ => OpportunityError::Database(err),
        })
}

#[cfg(test)]
#[path = "opportunity_test.rs"]
mod tests;
