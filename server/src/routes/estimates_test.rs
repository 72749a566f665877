use super::*;
use crate::routes::app;
use crate::state::test_helpers::{empty_request, json_request, send, test_app_state};
use axum::http::StatusCode;

#[tokio::test]
async fn products_lists_builtin_catalog() {
    let (status, body) = send(app(test_app_state()), empty_request("GET", "/api/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let keys: Vec<&str> = body["products"].as_array().unwrap().iter().map(|p| p["key"].as_str().unwrap()).collect();
    assert_eq!(keys, ["standard", "premium", "ultra-shield"]);
    assert_eq!(body["products"][1]["coveragePerGallon"], 200.0);
}

#[tokio::test]
async fn estimate_returns_values_and_display_strings() {
    let request = json_request(
        "POST",
        "/api/estimate",
        &json!({ "surfaceArea": 750, "productKey": "ultra-shield", "coatCount": 3 }),
    );
    let (status, body) = send(app(test_app_state()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let estimate = &body["estimate"];
    assert_eq!(estimate["productName"], "Praetorian Ultra Shield");
    assert_eq!(estimate["coatCount"], 3);
    let gallons = estimate["gallonsNeeded"].as_f64().unwrap();
    assert!((gallons - 750.0 / 175.0 * 3.0).abs() < 1e-9);
    assert_eq!(estimate["display"]["gallonsNeeded"], "12.86");
    assert_eq!(estimate["display"]["totalCost"], "1671.30");
}

#[tokio::test]
async fn estimate_defaults_to_one_coat() {
    let request = json_request("POST", "/api/estimate", &json!({ "surfaceArea": 1000, "productKey": "standard" }));
    let (status, body) = send(app(test_app_state()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estimate"]["coatCount"], 1);
    assert_eq!(body["estimate"]["display"]["totalCost"], "303.96");
}

#[tokio::test]
async fn non_positive_area_is_unprocessable() {
    for area in [0.0, -10.0] {
        let request =
            json_request("POST", "/api/estimate", &json!({ "surfaceArea": area, "productKey": "premium", "coatCount": 2 }));
        let (status, body) = send(app(test_app_state()), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("surface area must be"));
    }
}

#[tokio::test]
async fn overflowing_area_is_unprocessable() {
    let request = json_request(
        "POST",
        "/api/estimate",
        &json!({ "surfaceArea": 1e308, "productKey": "ultra-shield", "coatCount": 3 }),
    );
    let (status, body) = send(app(test_app_state()), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("too large to estimate"));
}

#[tokio::test]
async fn zero_coats_is_unprocessable() {
    let request =
        json_request("POST", "/api/estimate", &json!({ "surfaceArea": 100, "productKey": "premium", "coatCount": 0 }));
    let (status, _) = send(app(test_app_state()), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let request =
        json_request("POST", "/api/estimate", &json!({ "surfaceArea": 100, "productKey": "gold", "coatCount": 1 }));
    let (status, body) = send(app(test_app_state()), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown product: gold");
}

#[tokio::test]
async fn malformed_body_keeps_envelope() {
    let request = json_request("POST", "/api/estimate", &json!({ "productKey": "premium" }));
    let (status, body) = send(app(test_app_state()), request).await;
    assert!(status.is_client_error());
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}
