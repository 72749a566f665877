use super::*;

const TOLERANCE: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn product(key: &str) -> Product {
    Catalog::builtin().get(key).cloned().expect("builtin product")
}

fn run(area: f64, key: &str, coats: u32) -> CalculationResult {
    let product = product(key);
    calculate(&CalculationInput { surface_area: area, product: &product, coat_count: coats }).expect("valid input")
}

// =============================================================================
// calculate
// =============================================================================

#[test]
fn premium_two_coats_on_500_sq_ft() {
    let result = run(500.0, "premium", 2);
    assert!(approx(result.gallons_needed, 5.0));
    assert!(approx(result.total_cost, 499.95));
    assert_eq!(result.product_name, "Praetorian Premium");
    assert_eq!(result.coat_count, 2);
    assert!(approx(result.surface_area, 500.0));
}

#[test]
fn standard_one_coat_on_1000_sq_ft() {
    let result = run(1000.0, "standard", 1);
    assert!(approx(result.gallons_needed, 4.0));
    assert!(approx(result.total_cost, 303.96));
}

#[test]
fn ultra_shield_three_coats_on_750_sq_ft() {
    let result = run(750.0, "ultra-shield", 3);
    assert!(approx(result.gallons_needed, 750.0 / 175.0 * 3.0));
    assert!(approx(result.gallons_needed, 12.857_142_857_142_858));
    assert!(approx(result.total_cost, 750.0 / 175.0 * 3.0 * 129.99));
    assert_eq!(format_amount(result.total_cost), "1671.30");
}

#[test]
fn results_follow_the_coverage_formula_for_every_product() {
    for product in Catalog::builtin().products() {
        for area in [1.0, 42.5, 500.0, 12_345.6] {
            for coats in COAT_OPTIONS {
                let result =
                    calculate(&CalculationInput { surface_area: area, product, coat_count: coats }).expect("valid input");
                let gallons = (area / product.coverage_per_gallon) * f64::from(coats);
                assert!(approx(result.gallons_needed, gallons), "{} {area} {coats}", product.key);
                assert!(approx(result.total_cost, result.gallons_needed * product.price_per_gallon));
            }
        }
    }
}

#[test]
fn more_coats_strictly_increase_gallons_and_cost() {
    for product in Catalog::builtin().products() {
        let mut previous: Option<CalculationResult> = None;
        for coats in COAT_OPTIONS {
            let result =
                calculate(&CalculationInput { surface_area: 640.0, product, coat_count: coats }).expect("valid input");
            if let Some(prev) = previous {
                assert!(result.gallons_needed > prev.gallons_needed);
                assert!(result.total_cost > prev.total_cost);
            }
            previous = Some(result);
        }
    }
}

#[test]
fn larger_area_strictly_increases_gallons_and_cost() {
    let product = product("premium");
    let mut previous: Option<CalculationResult> = None;
    for area in [0.5, 10.0, 99.9, 100.0, 2_500.0, 1_000_000.0] {
        let result =
            calculate(&CalculationInput { surface_area: area, product: &product, coat_count: 2 }).expect("valid input");
        if let Some(prev) = previous {
            assert!(result.gallons_needed > prev.gallons_needed);
            assert!(result.total_cost > prev.total_cost);
        }
        previous = Some(result);
    }
}

#[test]
fn non_positive_surface_area_is_rejected() {
    let product = product("standard");
    for area in [0.0, -10.0, -0.001, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = calculate(&CalculationInput { surface_area: area, product: &product, coat_count: 1 })
            .expect_err("area should be rejected");
        assert!(matches!(err, EstimateError::InvalidSurfaceArea(_)), "{area}");
    }
}

#[test]
fn zero_coats_is_rejected() {
    let product = product("standard");
    let err = calculate(&CalculationInput { surface_area: 100.0, product: &product, coat_count: 0 })
        .expect_err("zero coats should be rejected");
    assert_eq!(err, EstimateError::InvalidCoatCount(0));
}

#[test]
fn overflowing_totals_are_rejected() {
    let product = product("ultra-shield");
    let err = calculate(&CalculationInput { surface_area: 1e308, product: &product, coat_count: 3 })
        .expect_err("cost overflows f64");
    assert_eq!(err, EstimateError::AreaTooLarge(1e308));

    let catalog = Catalog::builtin();
    assert!(matches!(catalog.estimate("premium", f64::MAX, 3), Err(EstimateError::AreaTooLarge(_))));
}

#[test]
fn surface_area_is_checked_before_coat_count() {
    let product = product("standard");
    let err = calculate(&CalculationInput { surface_area: 0.0, product: &product, coat_count: 0 })
        .expect_err("both inputs invalid");
    assert!(matches!(err, EstimateError::InvalidSurfaceArea(_)));
}

#[test]
fn error_messages_prompt_for_correction() {
    assert_eq!(
        EstimateError::InvalidSurfaceArea(-10.0).to_string(),
        "surface area must be a positive number of square feet (got -10)"
    );
    assert_eq!(EstimateError::UnknownProduct("gold".into()).to_string(), "unknown product: gold");
}

// =============================================================================
// catalog
// =============================================================================

#[test]
fn builtin_catalog_lists_praetorian_line_in_order() {
    let catalog = Catalog::builtin();
    let keys: Vec<&str> = catalog.products().iter().map(|p| &*p.key).collect();
    assert_eq!(keys, ["standard", "premium", "ultra-shield"]);
    assert_eq!(Catalog::default(), catalog);
}

#[test]
fn catalog_lookup_ignores_case_and_whitespace() {
    let catalog = Catalog::builtin();
    assert_eq!(catalog.get(" Premium ").map(|p| &*p.name), Some("Praetorian Premium"));
    assert!(catalog.get("platinum").is_none());
}

#[test]
fn catalog_estimate_reports_unknown_product() {
    let err = Catalog::builtin().estimate("platinum", 100.0, 1).expect_err("unknown key");
    assert_eq!(err, EstimateError::UnknownProduct("platinum".into()));
}

#[test]
fn catalog_estimate_matches_direct_calculation() {
    let via_catalog = Catalog::builtin().estimate("premium", 500.0, 2).expect("valid");
    assert_eq!(via_catalog, run(500.0, "premium", 2));
}

#[test]
fn catalog_parses_yaml() {
    let raw = r"
products:
  - key: deck-guard
    name: Deck Guard
    coveragePerGallon: 300
    pricePerGallon: 49.5
  - key: roof-seal
    name: Roof Seal
    coveragePerGallon: 120.0
    pricePerGallon: 210
";
    let catalog = Catalog::from_yaml_str(raw).expect("yaml catalog");
    assert_eq!(catalog.products().len(), 2);
    let roof = catalog.get("roof-seal").expect("roof seal");
    assert!(approx(roof.coverage_per_gallon, 120.0));
    assert!(approx(roof.price_per_gallon, 210.0));
}

#[test]
fn catalog_rejects_invalid_definitions() {
    let empty = Catalog::new(Vec::new()).expect_err("empty");
    assert!(matches!(empty, EstimateError::InvalidCatalog(_)));

    let duplicate = Catalog::new(vec![
        Product::new("a", "A", 100.0, 10.0),
        Product::new("A", "Also A", 100.0, 10.0),
    ])
    .expect_err("duplicate");
    assert!(duplicate.to_string().contains("duplicate product key"));

    let zero_coverage = Catalog::new(vec![Product::new("a", "A", 0.0, 10.0)]).expect_err("coverage");
    assert!(zero_coverage.to_string().contains("coverage must be positive"));

    let negative_price = Catalog::new(vec![Product::new("a", "A", 100.0, -1.0)]).expect_err("price");
    assert!(negative_price.to_string().contains("price must be positive"));

    let blank_key = Catalog::new(vec![Product::new("  ", "Blank", 100.0, 1.0)]).expect_err("blank");
    assert!(blank_key.to_string().contains("empty key"));
}

#[test]
fn catalog_rejects_malformed_yaml() {
    let err = Catalog::from_yaml_str("products: [not, a, product]").expect_err("malformed");
    assert!(matches!(err, EstimateError::InvalidCatalog(_)));
}

// =============================================================================
// formatting
// =============================================================================

#[test]
fn format_amount_uses_two_decimals() {
    assert_eq!(format_amount(5.0), "5.00");
    assert_eq!(format_amount(12.857_142_857), "12.86");
    assert_eq!(format_amount(5.0 * 99.99), "499.95");
}

#[test]
fn format_currency_groups_thousands() {
    assert_eq!(format_currency(0.0), "$0.00");
    assert_eq!(format_currency(303.96), "$303.96");
    assert_eq!(format_currency(1_671.428_571), "$1,671.43");
    assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
    assert_eq!(format_currency(-42.5), "-$42.50");
}

#[test]
fn display_estimate_keeps_raw_values_untouched() {
    let result = run(750.0, "ultra-shield", 3);
    let display = DisplayEstimate::from(&result);
    assert_eq!(display.gallons_needed, "12.86");
    assert_eq!(display.total_cost, "1671.30");
    assert!(approx(result.total_cost, 750.0 / 175.0 * 3.0 * 129.99));
}

#[test]
fn summary_renders_every_field() {
    let result = run(500.0, "premium", 2);
    let text = EstimateSummary(&result).to_string();
    assert!(text.contains("Praetorian Premium"));
    assert!(text.contains("500.00 sq ft"));
    assert!(text.contains("2 coats"));
    assert!(text.contains("Gallons needed: 5.00"));
    assert!(text.ends_with("$499.95"));
}

#[test]
fn result_serializes_with_camel_case_fields() {
    let value = serde_json::to_value(run(1000.0, "standard", 1)).expect("serialize");
    assert_eq!(value["productName"], "Praetorian Standard");
    assert_eq!(value["coatCount"], 1);
    assert!(value.get("gallonsNeeded").is_some());
    assert!(value.get("totalCost").is_some());
}
