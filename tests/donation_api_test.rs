//! Integration tests for donation submission, search, and notifications.

mod helpers;

use chrono::{Duration, Utc};
use http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_donation_upload_requires_image() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("api_donor1", "donor").await;
    let expiry = (Utc::now().date_naive() + Duration::days(180)).to_string();

    let (content_type, body) = helpers::donation_multipart("Paracetamol", "10", &expiry, None);
    let response = app
        .request_raw("POST", "/api/donations", &content_type, body, Some(donor))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_donation_upload_happy_path() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("api_donor2", "donor").await;
    let expiry = (Utc::now().date_naive() + Duration::days(180)).to_string();

    let png = helpers::tiny_png();
    let (content_type, body) =
        helpers::donation_multipart("Paracetamol", "10", &expiry, Some(&png));
    let response = app
        .request_raw("POST", "/api/donations", &content_type, body, Some(donor))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let donation_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Fresh submissions are available but unapproved.
    let (qty, status, approval) = app.donation_state(donation_id).await.unwrap();
    assert_eq!(qty, 10);
    assert_eq!(status, "available");
    assert_eq!(approval, "pending");

    // The tracking code is surfaced to the donor.
    assert!(
        response.body["tracking_code"]
            .as_str()
            .unwrap()
            .starts_with("DON-")
    );
}

#[tokio::test]
async fn test_donation_upload_rejects_past_expiry() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("api_donor3", "donor").await;
    let expiry = (Utc::now().date_naive() - Duration::days(1)).to_string();

    let png = helpers::tiny_png();
    let (content_type, body) = helpers::donation_multipart("Old Pills", "5", &expiry, Some(&png));
    let response = app
        .request_raw("POST", "/api/donations", &content_type, body, Some(donor))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_only_shows_matchable_donations() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("api_donor4", "donor").await;
    let recipient = app.create_user("api_recipient4", "recipient").await;
    let expiry = Utc::now().date_naive() + Duration::days(90);

    app.seed_donation(donor, "Visible Med", 5, expiry, "available", "approved")
        .await;
    app.seed_donation(donor, "Unapproved Med", 5, expiry, "available", "pending")
        .await;
    app.seed_donation(donor, "Reserved Med", 5, expiry, "reserved", "approved")
        .await;

    let response = app
        .request("GET", "/api/donations/search", None, Some(recipient))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let names: Vec<&str> = response.body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Visible Med"));
    assert!(!names.contains(&"Unapproved Med"));
    assert!(!names.contains(&"Reserved Med"));
}

#[tokio::test]
async fn test_search_date_range_validation() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let recipient = app.create_user("api_recipient5", "recipient").await;

    let response = app
        .request(
            "GET",
            "/api/donations/search?start_date=2027-06-01&end_date=2027-01-01",
            None,
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_autocomplete_suggestions() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("api_donor6", "donor").await;
    let expiry = Utc::now().date_naive() + Duration::days(90);
    app.seed_donation(donor, "Amoxicillin 250mg", 5, expiry, "available", "approved")
        .await;
    app.seed_donation(donor, "Amoxicillin 500mg", 5, expiry, "available", "approved")
        .await;

    // Queries under two characters return nothing.
    let response = app
        .request("GET", "/api/donations/autocomplete?q=a", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["suggestions"].as_array().unwrap().len(), 0);

    let response = app
        .request("GET", "/api/donations/autocomplete?q=amox", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let suggestions = response.body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 2);
}

#[tokio::test]
async fn test_donor_delete_keeps_image_when_requested() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("api_donor7", "donor").await;
    let recipient = app.create_user("api_recipient7", "recipient").await;
    let expiry = Utc::now().date_naive() + Duration::days(90);

    let donation = app
        .seed_donation(donor, "Requested Med", 5, expiry, "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Requested Med",
                "quantity": "1",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Someone else's donation cannot be deleted.
    let response = app
        .request(
            "DELETE",
            &format!("/api/donations/{donation}"),
            None,
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // The donor can; the matched request keeps its row with a nulled
    // reference.
    let response = app
        .request(
            "DELETE",
            &format!("/api/donations/{donation}"),
            None,
            Some(donor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.donation_state(donation).await.is_none());
}

#[tokio::test]
async fn test_notification_center_flow() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("api_donor8", "donor").await;
    let admin = app.create_user("api_admin8", "admin").await;
    let expiry = Utc::now().date_naive() + Duration::days(90);

    let donation = app
        .seed_donation(donor, "Notify Med", 5, expiry, "available", "pending")
        .await;

    // Approval produces one unread notification for the donor.
    app.request(
        "POST",
        &format!("/api/admin/donations/{donation}/approve"),
        None,
        Some(admin),
    )
    .await;

    let response = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(donor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 1);

    let response = app.request("GET", "/api/notifications", None, Some(donor)).await;
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    let notification_id = items[0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PUT",
            &format!("/api/notifications/{notification_id}/read"),
            None,
            Some(donor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(donor),
        )
        .await;
    assert_eq!(response.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_self_request_is_refused() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("api_donor9", "donor").await;
    let expiry = Utc::now().date_naive() + Duration::days(90);
    let donation = app
        .seed_donation(donor, "My Own Med", 5, expiry, "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "My Own Med",
                "quantity": "1",
                "donation_id": donation,
            })),
            Some(donor),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
