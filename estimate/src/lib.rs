//! Coverage and material-cost estimates for coating products.
//!
//! This crate owns the one piece of arithmetic shared by every landing page
//! that quotes a coating job: surface area divided by a product's coverage
//! rate, multiplied by the number of coats, priced per gallon. Both `server`
//! and `cli` call [`calculate`]; display formatting lives in [`format`] so the
//! computed values always keep full precision.

mod catalog;
mod format;

use serde::{Deserialize, Serialize};

pub use catalog::{Catalog, PRAETORIAN_LINE, Product};
pub use format::{DisplayEstimate, EstimateSummary, format_amount, format_currency};

/// Coat counts offered by the quote forms.
pub const COAT_OPTIONS: [u32; 3] = [1, 2, 3];

/// Coat count used when a caller does not pick one.
pub const DEFAULT_COAT_COUNT: u32 = 1;

/// Error returned when an estimate or catalog cannot be produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    /// Surface area was zero, negative, or not a finite number.
    #[error("surface area must be a positive number of square feet (got {0})")]
    InvalidSurfaceArea(f64),
    /// Coat count was zero.
    #[error("coat count must be at least 1 (got {0})")]
    InvalidCoatCount(u32),
    /// Surface area was valid but too large for the result to be represented.
    #[error("surface area {0} is too large to estimate")]
    AreaTooLarge(f64),
    /// No product with the requested key exists in the catalog.
    #[error("unknown product: {0}")]
    UnknownProduct(String),
    /// A catalog definition failed validation.
    #[error("invalid product catalog: {0}")]
    InvalidCatalog(String),
}

/// Inputs for a single estimate.
#[derive(Clone, Copy, Debug)]
pub struct CalculationInput<'a> {
    /// Area to coat, in square feet.
    pub surface_area: f64,
    /// Product selected from a [`Catalog`].
    pub product: &'a Product,
    /// Number of coats to apply.
    pub coat_count: u32,
}

/// Material quantity and cost for one estimate.
///
/// Values are unrounded; use [`DisplayEstimate`] or [`EstimateSummary`] to
/// present them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub surface_area: f64,
    pub product_name: String,
    pub coat_count: u32,
    pub gallons_needed: f64,
    pub total_cost: f64,
}

/// Reject surface areas that cannot be coated.
///
/// # Errors
///
/// Returns [`EstimateError::InvalidSurfaceArea`] for zero, negative, NaN, or
/// infinite values.
pub fn validate_surface_area(surface_area: f64) -> Result<f64, EstimateError> {
    if surface_area.is_finite() && surface_area > 0.0 {
        Ok(surface_area)
    } else {
        Err(EstimateError::InvalidSurfaceArea(surface_area))
    }
}

/// Compute gallons needed and total material cost.
///
/// # Errors
///
/// Returns [`EstimateError::InvalidSurfaceArea`] or
/// [`EstimateError::InvalidCoatCount`] when the inputs are out of range, and
/// [`EstimateError::AreaTooLarge`] when gallons or cost overflow. No result is
/// produced in any of these cases.
pub fn calculate(input: &CalculationInput<'_>) -> Result<CalculationResult, EstimateError> {
    let surface_area = validate_surface_area(input.surface_area)?;
    if input.coat_count == 0 {
        return Err(EstimateError::InvalidCoatCount(input.coat_count));
    }

    let product = input.product;
    let gallons_per_coat = surface_area / product.coverage_per_gallon;
    let gallons_needed = gallons_per_coat * f64::from(input.coat_count);
    let total_cost = gallons_needed * product.price_per_gallon;
    if !gallons_needed.is_finite() || !total_cost.is_finite() {
        return Err(EstimateError::AreaTooLarge(surface_area));
    }

    Ok(CalculationResult {
        surface_area,
        product_name: product.name.to_string(),
        coat_count: input.coat_count,
        gallons_needed,
        total_cost,
    })
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
