//! Consultation intake for the service landing pages.
//!
//! DESIGN
//! ======
//! Each landing page posts the same core fields plus page-specific extras
//! (roof type, building size, pool dimensions, ...). The core fields are
//! validated; everything else is kept verbatim as the submission's
//! `details` JSON. A submission is written together with the contact upsert
//! in one transaction so the inbox never shows an orphaned lead.

use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::contact::{self, ContactStatus, NewContact};
use super::submission::{self, NewSubmission};
use super::validation::{self, MAX_LONG_TEXT_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, ValidationError};

pub const FORM_TYPE: &str = "consultation";

#[derive(Debug, thiserror::Error)]
pub enum ConsultationError {
    #[error(transparent)]
    Contact(#[from] contact::ContactError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Service lines that accept consultation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultationKind {
    FirePrevention,
    CommercialSolar,
    ResidentialSolar,
    SpecialtyCoatings,
}

impl ConsultationKind {
    pub const ALL: [Self; 4] =
        [Self::FirePrevention, Self::CommercialSolar, Self::ResidentialSolar, Self::SpecialtyCoatings];

    /// URL segment, also stored as the submission/contact source.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::FirePrevention => "fire-prevention",
            Self::CommercialSolar => "commercial-solar",
            Self::ResidentialSolar => "residential-solar",
            Self::SpecialtyCoatings => "specialty-coatings",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FirePrevention => "fire prevention",
            Self::CommercialSolar => "commercial solar",
            Self::ResidentialSolar => "residential solar",
            Self::SpecialtyCoatings => "specialty coatings",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

/// Raw consultation form body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsultationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    /// Page-specific fields, stored as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidConsultation {
    pub kind: ConsultationKind,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub details: Value,
}

impl ValidConsultation {
    fn lead(&self) -> NewContact {
        let (first_name, last_name) = validation::split_name(&self.name);
        NewContact {
            first_name,
            last_name,
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            source: self.kind.slug().to_owned(),
            status: ContactStatus::Lead,
            notes: None,
        }
    }

    fn submission(&self, contact_id: Uuid) -> NewSubmission {
        NewSubmission {
            form_type: FORM_TYPE.to_owned(),
            source: self.kind.slug().to_owned(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            message: self.message.clone(),
            details: self.details.clone(),
            contact_id: Some(contact_id),
        }
    }

    /// Text shown to the visitor after a successful submission.
    #[must_use]
    pub fn confirmation(&self) -> String {
        let (first_name, _) = validation::split_name(&self.name);
        format!(
            "Thanks {first_name}! Our {} team will contact you within one business day.",
            self.kind.label()
        )
    }
}

/// Validate a consultation request for `kind`.
///
/// # Errors
///
/// Returns the first failing field.
pub fn validate(kind: ConsultationKind, req: ConsultationRequest) -> Result<ValidConsultation, ValidationError> {
    Ok(ValidConsultation {
        kind,
        name: validation::required("name", &req.name, MAX_NAME_LEN)?,
        email: validation::email("email", &req.email)?,
        phone: validation::phone("phone", req.phone.as_deref())?,
        company: validation::optional("company", req.company.as_deref(), MAX_SHORT_TEXT_LEN)?,
        message: validation::optional("message", req.message.as_deref(), MAX_LONG_TEXT_LEN)?,
        details: Value::Object(req.extra),
    })
}

/// Store a validated consultation: upsert the lead, then record the
/// submission. Returns the submission ID.
///
/// # Errors
///
/// Returns a database error; nothing is written in that case.
pub async fn submit(pool: &PgPool, consultation: &ValidConsultation) -> Result<Uuid, ConsultationError> {
    let mut tx = pool.begin().await?;
    let contact_id = contact::upsert_lead(&mut tx, &consultation.lead()).await?;
    let submission_id = submission::insert_submission(&mut tx, &consultation.submission(contact_id)).await?;
    tx.commit().await?;

    info!(
        %submission_id,
        %contact_id,
        source = consultation.kind.slug(),
        "consultation request stored"
    );
    Ok(submission_id)
}

#[cfg(test)]
#[path = "consultation_test.rs"]
mod tests;
