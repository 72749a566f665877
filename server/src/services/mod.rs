//! Domain services behind the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and persistence so route handlers stay
//! focused on request parsing and status mapping. Coverage math lives in the
//! `estimate` crate; nothing here recomputes it.

pub mod consultation;
pub mod contact;
pub mod dashboard;
pub mod import;
pub mod opportunity;
pub mod submission;
pub mod validation;
