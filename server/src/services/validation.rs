//! Field validation shared by the consultation, contact, and import paths.
//!
//! Every helper trims its input and returns the cleaned value, so callers
//! store exactly what was checked.

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_SHORT_TEXT_LEN: usize = 200;
pub const MAX_LONG_TEXT_LEN: usize = 5000;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 20;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Non-empty text of at most `max` characters.
pub fn required(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    check_len(field, value, max)?;
    Ok(value.to_owned())
}

/// Optional text; blank becomes `None`.
pub fn optional(field: &'static str, value: Option<&str>, max: usize) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => {
            check_len(field, v, max)?;
            Ok(Some(v.to_owned()))
        }
    }
}

/// Lowercased email address with a plausible `local@domain.tld` shape.
pub fn email(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = required(field, value, MAX_EMAIL_LEN)?.to_ascii_lowercase();
    if is_email_shaped(&value) {
        Ok(value)
    } else {
        Err(ValidationError::new(field, "must be a valid email address"))
    }
}

/// Optional phone number with 7 to 20 digits; separators are allowed and kept.
pub fn phone(field: &'static str, value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(value) = optional(field, value, MAX_SHORT_TEXT_LEN)? else {
        return Ok(None);
    };

    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')' | '.');
    if !value.chars().all(allowed) {
        return Err(ValidationError::new(field, "may only contain digits, spaces, and + - ( ) ."));
    }

    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(ValidationError::new(
            field,
            format!("must have between {MIN_PHONE_DIGITS} and {MAX_PHONE_DIGITS} digits"),
        ));
    }
    Ok(Some(value))
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(field, format!("must be at most {max} characters")));
    }
    Ok(())
}

fn is_email_shaped(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && !domain.starts_with('.') && !domain.contains("..")
}

/// Split a single "full name" value at the first whitespace run.
#[must_use]
pub fn split_name(full: &str) -> (String, String) {
    let full = full.trim();
    match full.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_owned(), rest.trim().to_owned()),
        None => (full.to_owned(), String::new()),
    }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
