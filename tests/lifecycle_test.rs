//! End-to-end tests for the donation/request lifecycle state machine.

mod helpers;

use chrono::{Duration, Utc};
use http::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn far_expiry() -> chrono::NaiveDate {
    Utc::now().date_naive() + Duration::days(365)
}

fn claim_date() -> String {
    (Utc::now().date_naive() + Duration::days(7)).to_string()
}

#[tokio::test]
async fn test_match_deliver_claim_happy_path() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor1", "donor").await;
    let recipient = app.create_user("recipient1", "recipient").await;
    let admin = app.create_user("admin1", "admin").await;

    let donation = app
        .seed_donation(donor, "Amoxicillin", 10, far_expiry(), "available", "approved")
        .await;

    // Recipient matches the donation with a request for 4 units.
    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Amoxicillin",
                "quantity": "4",
                "urgency": "high",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Matching reserves the donation without touching the quantity.
    let (qty, status, _) = app.donation_state(donation).await.unwrap();
    assert_eq!(qty, 10);
    assert_eq!(status, "reserved");

    let (req_status, approval, matched) = app.request_state(request_id).await.unwrap();
    assert_eq!(req_status, "matched");
    assert_eq!(approval, "pending");
    assert_eq!(matched, Some(donation));

    // The donor hears about the match.
    assert_eq!(app.notification_count(donor, "request_matched").await, 1);

    // Admin approves the request with a claim date.
    let response = app
        .request(
            "POST",
            &format!("/api/admin/requests/{request_id}/approve"),
            Some(json!({ "claim_ready_date": claim_date() })),
            Some(admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    // Recipient is told the claim date; donor gets the delivery deadline.
    assert_eq!(app.notification_count(recipient, "request_approved").await, 1);
    assert_eq!(app.notification_count(donor, "request_approved").await, 1);

    // Donor delivers: quantity drops, remainder reopens for matching.
    let response = app
        .request(
            "POST",
            &format!("/api/requests/{request_id}/deliver"),
            None,
            Some(donor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let (qty, status, _) = app.donation_state(donation).await.unwrap();
    assert_eq!(qty, 6);
    assert_eq!(status, "available");

    let (req_status, _, _) = app.request_state(request_id).await.unwrap();
    assert_eq!(req_status, "fulfilled");

    // Recipient claims. Terminal.
    let response = app
        .request(
            "POST",
            &format!("/api/requests/{request_id}/claim"),
            None,
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let (req_status, _, _) = app.request_state(request_id).await.unwrap();
    assert_eq!(req_status, "claimed");
}

#[tokio::test]
async fn test_exact_delivery_exhausts_donation() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor2", "donor").await;
    let recipient = app.create_user("recipient2", "recipient").await;

    let donation = app
        .seed_donation(donor, "Ibuprofen", 4, far_expiry(), "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Ibuprofen",
                "quantity": "4",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/requests/{request_id}/deliver"),
            None,
            Some(donor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let (qty, status, _) = app.donation_state(donation).await.unwrap();
    assert_eq!(qty, 0);
    assert_eq!(status, "delivered");
}

#[tokio::test]
async fn test_second_delivery_is_rejected() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor3", "donor").await;
    let recipient = app.create_user("recipient3", "recipient").await;

    let donation = app
        .seed_donation(donor, "Cetirizine", 10, far_expiry(), "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Cetirizine",
                "quantity": "3",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let first = app
        .request(
            "POST",
            &format!("/api/requests/{request_id}/deliver"),
            None,
            Some(donor),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);

    // A second delivery must not decrement the stock again.
    let second = app
        .request(
            "POST",
            &format!("/api/requests/{request_id}/deliver"),
            None,
            Some(donor),
        )
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);

    let (qty, _, _) = app.donation_state(donation).await.unwrap();
    assert_eq!(qty, 7);
}

#[tokio::test]
async fn test_claim_before_fulfillment_fails() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor4", "donor").await;
    let recipient = app.create_user("recipient4", "recipient").await;

    let donation = app
        .seed_donation(donor, "Loratadine", 5, far_expiry(), "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Loratadine",
                "quantity": "2",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/requests/{request_id}/claim"),
            None,
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_STATE");
}

#[tokio::test]
async fn test_insufficient_quantity_blocks_match() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor5", "donor").await;
    let recipient = app.create_user("recipient5", "recipient").await;

    let donation = app
        .seed_donation(donor, "Metformin", 3, far_expiry(), "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Metformin",
                "quantity": "5",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INSUFFICIENT_QUANTITY");

    // The donation must stay untouched.
    let (qty, status, _) = app.donation_state(donation).await.unwrap();
    assert_eq!(qty, 3);
    assert_eq!(status, "available");
}

#[tokio::test]
async fn test_missing_donation_creates_unmatched_request() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let recipient = app.create_user("recipient6", "recipient").await;

    // A failed lookup never blocks request creation.
    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Omeprazole",
                "quantity": "2",
                "donation_id": Uuid::new_v4(),
            })),
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let (status, approval, matched) = app.request_state(request_id).await.unwrap();
    assert_eq!(status, "pending");
    assert_eq!(approval, "pending");
    assert_eq!(matched, None);
}

#[tokio::test]
async fn test_admin_rejection_restores_reserved_donation() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor7", "donor").await;
    let recipient = app.create_user("recipient7", "recipient").await;
    let admin = app.create_user("admin7", "admin").await;

    let donation = app
        .seed_donation(donor, "Aspirin", 8, far_expiry(), "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Aspirin",
                "quantity": "4",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/admin/requests/{request_id}/reject"),
            Some(json!({ "reason": "Insufficient documentation" })),
            Some(admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    // Donation is available again with its quantity unchanged.
    let (qty, status, _) = app.donation_state(donation).await.unwrap();
    assert_eq!(qty, 8);
    assert_eq!(status, "available");

    // The request row is gone and the recipient was told once, with the
    // reason embedded.
    assert!(app.request_state(request_id).await.is_none());
    assert_eq!(app.notification_count(recipient, "request_rejected").await, 1);
}

#[tokio::test]
async fn test_recipient_delete_restores_reserved_donation() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor8", "donor").await;
    let recipient = app.create_user("recipient8", "recipient").await;

    let donation = app
        .seed_donation(donor, "Vitamin D", 6, far_expiry(), "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Vitamin D",
                "quantity": "6",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let response = app
        .request(
            "DELETE",
            &format!("/api/requests/{request_id}"),
            None,
            Some(recipient),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let (qty, status, _) = app.donation_state(donation).await.unwrap();
    assert_eq!(qty, 6);
    assert_eq!(status, "available");
    assert!(app.request_state(request_id).await.is_none());
}

#[tokio::test]
async fn test_claim_date_validation_on_approval() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let recipient = app.create_user("recipient9", "recipient").await;
    let admin = app.create_user("admin9", "admin").await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({ "medicine_name": "Insulin", "quantity": "1" })),
            Some(recipient),
        )
        .await;
    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Missing claim date.
    let response = app
        .request(
            "POST",
            &format!("/api/admin/requests/{request_id}/approve"),
            Some(json!({ "claim_ready_date": null })),
            Some(admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_CLAIM_DATE");

    // Historical claim date.
    let yesterday = (Utc::now().date_naive() - Duration::days(1)).to_string();
    let response = app
        .request(
            "POST",
            &format!("/api/admin/requests/{request_id}/approve"),
            Some(json!({ "claim_ready_date": yesterday })),
            Some(admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_CLAIM_DATE");

    // The request is still pending.
    let (_, approval, _) = app.request_state(request_id).await.unwrap();
    assert_eq!(approval, "pending");
}

#[tokio::test]
async fn test_donation_approval_and_rejection() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor10", "donor").await;
    let admin = app.create_user("admin10", "admin").await;

    let approved = app
        .seed_donation(donor, "Paracetamol", 10, far_expiry(), "available", "pending")
        .await;
    let rejected = app
        .seed_donation(donor, "Expired Syrup", 2, far_expiry(), "available", "pending")
        .await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/donations/{approved}/approve"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let (_, _, approval) = app.donation_state(approved).await.unwrap();
    assert_eq!(approval, "approved");
    assert_eq!(app.notification_count(donor, "donation_approved").await, 1);

    // Approving twice trips the state guard.
    let response = app
        .request(
            "POST",
            &format!("/api/admin/donations/{approved}/approve"),
            None,
            Some(admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Rejection without a reason is refused.
    let response = app
        .request(
            "POST",
            &format!("/api/admin/donations/{rejected}/reject"),
            Some(json!({ "reason": "" })),
            Some(admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Rejection deletes the row outright and notifies the donor.
    let response = app
        .request(
            "POST",
            &format!("/api/admin/donations/{rejected}/reject"),
            Some(json!({ "reason": "Packaging damaged" })),
            Some(admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert!(app.donation_state(rejected).await.is_none());
    assert_eq!(app.notification_count(donor, "donation_rejected").await, 1);
}

#[tokio::test]
async fn test_only_matched_donor_may_deliver() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("donor11", "donor").await;
    let other = app.create_user("donor11b", "donor").await;
    let recipient = app.create_user("recipient11", "recipient").await;

    let donation = app
        .seed_donation(donor, "Azithromycin", 5, far_expiry(), "available", "approved")
        .await;

    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({
                "medicine_name": "Azithromycin",
                "quantity": "2",
                "donation_id": donation,
            })),
            Some(recipient),
        )
        .await;
    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/requests/{request_id}/deliver"),
            None,
            Some(other),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_auth_boundaries() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let recipient = app.create_user("recipient12", "recipient").await;

    // No principal header at all.
    let response = app.request("GET", "/api/donations", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Admin surface refuses non-admins.
    let response = app
        .request("GET", "/api/admin/dashboard", None, Some(recipient))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
