use super::*;
use crate::routes::app;
use crate::state::test_helpers::{json_request, send, test_app_state};

#[tokio::test]
async fn unknown_service_is_not_found() {
    let request = json_request("POST", "/api/pool-cleaning/consultation", &json!({ "name": "A", "email": "a@b.co" }));
    let (status, body) = send(app(test_app_state()), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unknown service: pool-cleaning");
}

#[tokio::test]
async fn invalid_request_is_unprocessable() {
    let request = json_request(
        "POST",
        "/api/fire-prevention/consultation",
        &json!({ "name": "Dana", "email": "dana-at-example" }),
    );
    let (status, body) = send(app(test_app_state()), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "email must be a valid email address");
}

#[tokio::test]
async fn missing_name_is_reported_first() {
    let request = json_request("POST", "/api/commercial-solar/consultation", &json!({ "email": "bad" }));
    let (status, body) = send(app(test_app_state()), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "name is required");
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn valid_request_is_created() {
    let mut state = test_app_state();
    state.pool = crate::state::test_helpers::live_pool().await;
    let email = crate::state::test_helpers::unique_email("route-consult");
    let request = json_request(
        "POST",
        "/api/residential-solar/consultation",
        &json!({ "name": "Robin Hale", "email": email, "roofType": "tile" }),
    );
    let (status, body) = send(app(state), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["submissionId"].is_string());
    assert_eq!(
        body["message"],
        "Thanks Robin! Our residential solar team will contact you within one business day."
    );
}
