//! Two-decimal presentation of estimate results.

use std::fmt;

use serde::Serialize;

use crate::CalculationResult;

/// Format a value with exactly two decimal places.
#[must_use]
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

/// Format a value as dollars with thousands separators, e.g. `$1,671.43`.
#[must_use]
pub fn format_currency(value: f64) -> String {
    let fixed = format_amount(value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// String fields a form shows next to the raw numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEstimate {
    pub gallons_needed: String,
    pub total_cost: String,
}

impl From<&CalculationResult> for DisplayEstimate {
    fn from(result: &CalculationResult) -> Self {
        Self { gallons_needed: format_amount(result.gallons_needed), total_cost: format_amount(result.total_cost) }
    }
}

/// Multi-line human summary of a result.
pub struct EstimateSummary<'a>(pub &'a CalculationResult);

impl fmt::Display for EstimateSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let coats = if r.coat_count == 1 { "coat" } else { "coats" };
        writeln!(f, "Product:        {}", r.product_name)?;
        writeln!(f, "Surface area:   {} sq ft", format_amount(r.surface_area))?;
        writeln!(f, "Coats:          {} {coats}", r.coat_count)?;
        writeln!(f, "Gallons needed: {}", format_amount(r.gallons_needed))?;
        write!(f, "Total cost:     {}", format_currency(r.total_cost))
    }
}
