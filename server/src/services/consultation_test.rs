use super::*;
#[cfg(feature = "live-db-tests")]
use crate::state::test_helpers;

fn request(json: &str) -> ConsultationRequest {
    serde_json::from_str(json).expect("request should parse")
}

#[test]
fn kind_slugs_round_trip() {
    for kind in ConsultationKind::ALL {
        assert_eq!(ConsultationKind::from_slug(kind.slug()), Some(kind));
    }
    assert_eq!(ConsultationKind::from_slug("crm"), None);
    assert_eq!(ConsultationKind::from_slug("Fire-Prevention"), None);
}

#[test]
fn extra_fields_become_details() {
    let req = request(
        r#"{"name":"Sam Rivera","email":"Sam@Example.com","propertyType":"warehouse","squareFootage":42000}"#,
    );
    let valid = validate(ConsultationKind::FirePrevention, req).unwrap();
    assert_eq!(valid.email, "sam@example.com");
    assert_eq!(valid.details["propertyType"], "warehouse");
    assert_eq!(valid.details["squareFootage"], 42000);
    assert!(valid.details.get("name").is_none());
}

#[test]
fn validation_reports_first_bad_field() {
    let missing_name = validate(ConsultationKind::CommercialSolar, request(r#"{"email":"a@b.co"}"#)).unwrap_err();
    assert_eq!(missing_name.field, "name");

    let bad_email =
        validate(ConsultationKind::CommercialSolar, request(r#"{"name":"Kim","email":"kim-at-home"}"#)).unwrap_err();
    assert_eq!(bad_email.field, "email");

    let bad_phone = validate(
        ConsultationKind::CommercialSolar,
        request(r#"{"name":"Kim","email":"kim@home.net","phone":"call me"}"#),
    )
    .unwrap_err();
    assert_eq!(bad_phone.field, "phone");
}

#[test]
fn lead_splits_name_and_tags_source() {
    let valid = validate(
        ConsultationKind::ResidentialSolar,
        request(r#"{"name":"Jordan Lee Park","email":"jordan@example.com","company":" "}"#),
    )
    .unwrap();
    let lead = valid.lead();
    assert_eq!(lead.first_name, "Jordan");
    assert_eq!(lead.last_name, "Lee Park");
    assert_eq!(lead.source, "residential-solar");
    assert_eq!(lead.status, ContactStatus::Lead);
    assert_eq!(lead.company, None);
}

#[test]
fn submission_links_contact_and_form_type() {
    let valid = validate(
        ConsultationKind::SpecialtyCoatings,
        request(r#"{"name":"Pat","email":"pat@example.com","message":"Pool resurfacing","poolSize":"16x32"}"#),
    )
    .unwrap();
    let contact_id = Uuid::new_v4();
    let sub = valid.submission(contact_id);
    assert_eq!(sub.form_type, FORM_TYPE);
    assert_eq!(sub.source, "specialty-coatings");
    assert_eq!(sub.contact_id, Some(contact_id));
    assert_eq!(sub.message.as_deref(), Some("Pool resurfacing"));
    assert_eq!(sub.details["poolSize"], "16x32");
}

#[test]
fn confirmation_uses_first_name_and_service_label() {
    let valid = validate(
        ConsultationKind::FirePrevention,
        request(r#"{"name":"Alex Morgan","email":"alex@example.com"}"#),
    )
    .unwrap();
    assert_eq!(
        valid.confirmation(),
        "Thanks Alex! Our fire prevention team will contact you within one business day."
    );
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn submit_reuses_existing_contact() {
    let pool = test_helpers::live_pool().await;
    let email = test_helpers::unique_email("consult");
    let body = format!(r#"{{"name":"Repeat Visitor","email":"{email}"}}"#);

    let first = validate(ConsultationKind::CommercialSolar, request(&body)).unwrap();
    let second = validate(ConsultationKind::FirePrevention, request(&body)).unwrap();
    let a = submit(&pool, &first).await.unwrap();
    let b = submit(&pool, &second).await.unwrap();
    assert_ne!(a, b);

    let contact_ids = sqlx::query_scalar::<_, Option<Uuid>>("SELECT contact_id FROM form_submissions WHERE email = $1")
        .bind(&email)
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(contact_ids.len(), 2);
    assert_eq!(contact_ids[0], contact_ids[1]);
}
