//! Product tables.
//!
//! A catalog is plain data: every product differs only in its key, name,
//! coverage rate and price. The built-in table is the Praetorian line the
//! pool and painter pages quote; deployments can swap in a YAML file with the
//! same shape.

use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CalculationInput, CalculationResult, EstimateError, calculate};

/// A coating product with its per-coat coverage and unit price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub key: Cow<'static, str>,
    pub name: Cow<'static, str>,
    /// Square feet one gallon covers per coat.
    pub coverage_per_gallon: f64,
    /// Currency units per gallon.
    pub price_per_gallon: f64,
}

impl Product {
    #[must_use]
    pub const fn new(key: &'static str, name: &'static str, coverage_per_gallon: f64, price_per_gallon: f64) -> Self {
        Self { key: Cow::Borrowed(key), name: Cow::Borrowed(name), coverage_per_gallon, price_per_gallon }
    }
}

pub const PRAETORIAN_LINE: [Product; 3] = [
    Product::new("standard", "Praetorian Standard", 250.0, 75.99),
    Product::new("premium", "Praetorian Premium", 200.0, 99.99),
    Product::new("ultra-shield", "Praetorian Ultra Shield", 175.0, 129.99),
];

#[derive(Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

/// An ordered, validated set of products addressable by key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The built-in Praetorian product line.
    #[must_use]
    pub fn builtin() -> Self {
        Self { products: PRAETORIAN_LINE.to_vec() }
    }

    /// Build a catalog from a product list.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::InvalidCatalog`] if the list is empty, a key
    /// is blank or repeated, or a coverage/price value is not a positive
    /// finite number.
    pub fn new(products: Vec<Product>) -> Result<Self, EstimateError> {
        if products.is_empty() {
            return Err(EstimateError::InvalidCatalog("catalog has no products".into()));
        }

        let mut seen = HashSet::new();
        for product in &products {
            let key = product.key.trim();
            if key.is_empty() {
                return Err(EstimateError::InvalidCatalog(format!("product `{}` has an empty key", product.name)));
            }
            if !seen.insert(key.to_ascii_lowercase()) {
                return Err(EstimateError::InvalidCatalog(format!("duplicate product key `{key}`")));
            }
            if !is_positive(product.coverage_per_gallon) {
                return Err(EstimateError::InvalidCatalog(format!(
                    "product `{key}` coverage must be positive (got {})",
                    product.coverage_per_gallon
                )));
            }
            if !is_positive(product.price_per_gallon) {
                return Err(EstimateError::InvalidCatalog(format!(
                    "product `{key}` price must be positive (got {})",
                    product.price_per_gallon
                )));
            }
        }

        Ok(Self { products })
    }

    /// Parse a catalog from YAML with a top-level `products` list.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::InvalidCatalog`] for malformed YAML or a
    /// catalog that fails [`Catalog::new`] validation.
    pub fn from_yaml_str(raw: &str) -> Result<Self, EstimateError> {
        let file: CatalogFile =
            serde_yaml::from_str(raw).map_err(|e| EstimateError::InvalidCatalog(e.to_string()))?;
        Self::new(file.products)
    }

    /// Read and parse a YAML catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::InvalidCatalog`] if the file cannot be read or
    /// parsed.
    pub fn from_path(path: &Path) -> Result<Self, EstimateError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EstimateError::InvalidCatalog(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&raw)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by key, ignoring ASCII case and surrounding space.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Product> {
        let key = key.trim();
        self.products.iter().find(|p| p.key.eq_ignore_ascii_case(key))
    }

    /// Look up `product_key` and run [`calculate`] against it.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::UnknownProduct`] for a missing key, otherwise
    /// whatever [`calculate`] returns.
    pub fn estimate(
        &self,
        product_key: &str,
        surface_area: f64,
        coat_count: u32,
    ) -> Result<CalculationResult, EstimateError> {
        let product = self
            .get(product_key)
            .ok_or_else(|| EstimateError::UnknownProduct(product_key.trim().to_owned()))?;
        calculate(&CalculationInput { surface_area, product, coat_count })
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
