//! CSV contact import.
//!
//! DESIGN
//! ======
//! Spreadsheets exported from other tools disagree on header spelling, so
//! headers are normalized (lowercase, letters and digits only) and matched
//! against a small alias table. Parsing is pure: it yields validated
//! contacts plus per-row errors, and the route decides whether anything is
//! written.

use serde::Serialize;

use super::contact::{ContactInput, NewContact, validate_new_contact};
use super::validation::split_name;

pub const IMPORT_SOURCE: &str = "csv-import";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV file is empty")]
    Empty,
    #[error("CSV header has no email column")]
    MissingEmailColumn,
    #[error("CSV header has no name column")]
    MissingNameColumn,
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Company,
    Source,
    Status,
    Notes,
}

/// Lowercase a header and drop everything but ASCII letters and digits.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Map a header cell to the contact field it feeds, if any.
#[must_use]
pub fn classify_header(raw: &str) -> Option<Column> {
    match normalize_header(raw).as_str() {
        "firstname" | "first" | "givenname" => Some(Column::FirstName),
        "lastname" | "last" | "surname" | "familyname" => Some(Column::LastName),
        "name" | "fullname" | "contactname" => Some(Column::FullName),
        "email" | "emailaddress" | "mail" => Some(Column::Email),
        "phone" | "phonenumber" | "mobile" | "telephone" | "tel" => Some(Column::Phone),
        "company" | "companyname" | "organization" | "organisation" | "business" => Some(Column::Company),
        "source" | "leadsource" => Some(Column::Source),
        "status" | "leadstatus" => Some(Column::Status),
        "notes" | "note" | "comments" => Some(Column::Notes),
        _ => None,
    }
}

/// A data row that could not be imported. `row` counts lines after the
/// header, starting at 1, so blank lines still advance it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    pub contacts: Vec<NewContact>,
    pub errors: Vec<RowError>,
    /// Rows repeating an email already seen earlier in the same file.
    pub duplicates: usize,
}

/// Parse and validate a CSV upload.
///
/// # Errors
///
/// Returns [`ImportError`] when the file has no header or lacks the email
/// or name columns. Problems with individual rows are reported in
/// [`ParsedImport::errors`] instead.
pub fn parse_contacts_csv(bytes: &[u8]) -> Result<ParsedImport, ImportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ImportError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?;
    let header_line = headers.position().map_or(1, csv::Position::line);
    let columns: Vec<Option<Column>> = headers.iter().map(classify_header).collect();
    if !columns.contains(&Some(Column::Email)) {
        return Err(ImportError::MissingEmailColumn);
    }
    if !columns.iter().any(|c| matches!(c, Some(Column::FirstName | Column::FullName))) {
        return Err(ImportError::MissingNameColumn);
    }

    let mut parsed = ParsedImport::default();
    let mut seen = std::collections::HashSet::new();

    let mut last_row = 0;
    for record in reader.records() {
        let position = match &record {
            Ok(record) => record.position(),
            Err(err) => err.position(),
        };
        let row = position
            .and_then(|p| usize::try_from(p.line().saturating_sub(header_line)).ok())
            .unwrap_or(last_row + 1);
        last_row = row;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                parsed.errors.push(RowError { row, message: err.to_string() });
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }

        let input = row_to_input(&columns, &record);
        match validate_new_contact(&input) {
            Ok(contact) => {
                if seen.insert(contact.email.clone()) {
                    parsed.contacts.push(contact);
                } else {
                    parsed.duplicates += 1;
                }
            }
            Err(err) => parsed.errors.push(RowError { row, message: err.to_string() }),
        }
    }

    Ok(parsed)
}

fn row_to_input(columns: &[Option<Column>], record: &csv::StringRecord) -> ContactInput {
    let mut input = ContactInput::default();
    let mut full_name = None;

    for (column, value) in columns.iter().zip(record.iter()) {
        let Some(column) = column else { continue };
        if value.is_empty() {
            continue;
        }
        let value = value.to_owned();
        match column {
            Column::FirstName => input.first_name = value,
            Column::LastName => input.last_name = value,
            Column::FullName => full_name = Some(value),
            Column::Email => input.email = value,
            Column::Phone => input.phone = Some(value),
            Column::Company => input.company = Some(value),
            Column::Source => input.source = Some(value),
            Column::Status => input.status = Some(value),
            Column::Notes => input.notes = Some(value),
        }
    }

    if input.first_name.is_empty() {
        if let Some(full) = full_name {
            let (first, last) = split_name(&full);
            input.first_name = first;
            if input.last_name.is_empty() {
                input.last_name = last;
            }
        }
    }
    if input.source.is_none() {
        input.source = Some(IMPORT_SOURCE.to_owned());
    }
    input
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
