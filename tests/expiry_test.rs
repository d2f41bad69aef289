//! Integration tests for the expiry-alert and cleanup sweeps.

mod helpers;

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::expiry_alert::ExpiryAlertRepository;
use healthbridge_database::repositories::notification::NotificationRepository;
use healthbridge_database::repositories::request::RequestRepository;
use healthbridge_database::repositories::user::UserRepository;
use healthbridge_service::expiry::{
    AlertSweep, AlertSweepOptions, CleanupSweep, CleanupSweepOptions,
};
use healthbridge_service::notification::Notifier;

fn alert_sweep(app: &helpers::TestApp) -> AlertSweep {
    AlertSweep::new(
        Arc::new(DonationRepository::new(app.db_pool.clone())),
        Arc::new(ExpiryAlertRepository::new(app.db_pool.clone())),
        Arc::new(UserRepository::new(app.db_pool.clone())),
        Arc::new(Notifier::new(Arc::new(NotificationRepository::new(
            app.db_pool.clone(),
        )))),
    )
}

fn cleanup_sweep(app: &helpers::TestApp) -> CleanupSweep {
    CleanupSweep::new(
        Arc::new(DonationRepository::new(app.db_pool.clone())),
        Arc::new(RequestRepository::new(app.db_pool.clone())),
        Arc::clone(&app.storage),
        Arc::new(Notifier::new(Arc::new(NotificationRepository::new(
            app.db_pool.clone(),
        )))),
    )
}

#[tokio::test]
async fn test_alert_sweep_is_rerun_safe() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("sweep_donor1", "donor").await;
    let today = Utc::now().date_naive();
    let donation = app
        .seed_donation(
            donor,
            "Amlodipine",
            5,
            today + Duration::days(5),
            "available",
            "approved",
        )
        .await;

    let sweep = alert_sweep(&app);

    let first = sweep
        .run_at(today, AlertSweepOptions::default())
        .await
        .unwrap();
    assert_eq!(first.alerts_sent, 1);
    assert_eq!(first.skipped_duplicates, 0);

    // Re-running with identical parameters on the same day must not
    // double-notify: one ledger entry, one notification.
    let second = sweep
        .run_at(today, AlertSweepOptions::default())
        .await
        .unwrap();
    assert_eq!(second.alerts_sent, 0);
    assert_eq!(second.skipped_duplicates, 1);

    assert_eq!(app.ledger_count(donation).await, 1);
    assert_eq!(app.notification_count(donor, "medicine_expiring").await, 1);

    // The single ledger entry is keyed to the donor's email at five days
    // before expiry.
    let ledger = ExpiryAlertRepository::new(app.db_pool.clone())
        .find_by_donation(donation)
        .await
        .unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].days_before_expiry, 5);
    assert_eq!(ledger[0].recipient_email, "sweep_donor1@test.com");
}

#[tokio::test]
async fn test_alert_sweep_force_resends() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("sweep_donor2", "donor").await;
    let today = Utc::now().date_naive();
    app.seed_donation(
        donor,
        "Simvastatin",
        5,
        today + Duration::days(2),
        "available",
        "approved",
    )
    .await;

    let sweep = alert_sweep(&app);
    sweep
        .run_at(today, AlertSweepOptions::default())
        .await
        .unwrap();

    let forced = sweep
        .run_at(
            today,
            AlertSweepOptions {
                force: true,
                ..AlertSweepOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(forced.alerts_sent, 1);

    assert_eq!(app.notification_count(donor, "medicine_expiring").await, 2);
}

#[tokio::test]
async fn test_alert_sweep_window_excludes_later_expiry() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("sweep_donor3", "donor").await;
    let today = Utc::now().date_naive();
    let donation = app
        .seed_donation(
            donor,
            "Lisinopril",
            5,
            today + Duration::days(15),
            "available",
            "approved",
        )
        .await;

    let sweep = alert_sweep(&app);
    let report = sweep
        .run_at(today, AlertSweepOptions::default())
        .await
        .unwrap();

    // Expiring in 15 days with a 10-day window: zero alerts, zero ledger
    // entries.
    assert_eq!(report.alerts_sent, 0);
    assert_eq!(app.ledger_count(donation).await, 0);
    assert_eq!(app.notification_count(donor, "medicine_expiring").await, 0);
}

#[tokio::test]
async fn test_alert_sweep_critical_only_caps_window() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("sweep_donor4", "donor").await;
    let today = Utc::now().date_naive();
    let soon = app
        .seed_donation(
            donor,
            "Prednisone",
            5,
            today + Duration::days(2),
            "available",
            "approved",
        )
        .await;
    let later = app
        .seed_donation(
            donor,
            "Gabapentin",
            5,
            today + Duration::days(8),
            "available",
            "approved",
        )
        .await;

    let sweep = alert_sweep(&app);
    let report = sweep
        .run_at(
            today,
            AlertSweepOptions {
                critical_only: true,
                ..AlertSweepOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(report.window_days, 3);
    assert_eq!(report.alerts_sent, 1);
    assert_eq!(app.ledger_count(soon).await, 1);
    assert_eq!(app.ledger_count(later).await, 0);
}

#[tokio::test]
async fn test_alert_sweep_dry_run_records_nothing() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("sweep_donor5", "donor").await;
    let today = Utc::now().date_naive();
    let donation = app
        .seed_donation(
            donor,
            "Warfarin",
            5,
            today + Duration::days(4),
            "available",
            "approved",
        )
        .await;

    let sweep = alert_sweep(&app);
    let report = sweep
        .run_at(
            today,
            AlertSweepOptions {
                dry_run: true,
                ..AlertSweepOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(report.alerts_sent, 1);
    assert_eq!(app.ledger_count(donation).await, 0);
    assert_eq!(app.notification_count(donor, "medicine_expiring").await, 0);
}

#[tokio::test]
async fn test_cleanup_cascades_requests_and_notifies() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("cleanup_donor1", "donor").await;
    let recipient = app.create_user("cleanup_recipient1", "recipient").await;
    let today = Utc::now().date_naive();

    // Expired 10 days ago, past the default 7-day grace period.
    let donation = app
        .seed_donation(
            donor,
            "Old Cough Syrup",
            5,
            today - Duration::days(10),
            "reserved",
            "approved",
        )
        .await;

    // A request still references it.
    let response = app
        .request(
            "POST",
            "/api/requests",
            Some(json!({ "medicine_name": "Old Cough Syrup", "quantity": "2" })),
            Some(recipient),
        )
        .await;
    let request_id: Uuid = response.body["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    sqlx::query("UPDATE medicine_requests SET matched_donation_id = $1, status = 'matched' WHERE id = $2")
        .bind(donation)
        .bind(request_id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let sweep = cleanup_sweep(&app);
    let report = sweep
        .run_at(today, CleanupSweepOptions::default())
        .await
        .unwrap();

    assert_eq!(report.donations_deleted, 1);
    assert_eq!(report.requests_cancelled, 1);

    assert!(app.donation_state(donation).await.is_none());
    assert!(app.request_state(request_id).await.is_none());
    assert_eq!(app.notification_count(recipient, "system").await, 1);
    assert_eq!(app.notification_count(donor, "system").await, 1);
}

#[tokio::test]
async fn test_cleanup_respects_grace_period_and_force() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("cleanup_donor2", "donor").await;
    let today = Utc::now().date_naive();

    // Expired three days ago: inside the 7-day grace period.
    let donation = app
        .seed_donation(
            donor,
            "Recently Expired",
            5,
            today - Duration::days(3),
            "available",
            "approved",
        )
        .await;

    let sweep = cleanup_sweep(&app);

    let report = sweep
        .run_at(today, CleanupSweepOptions::default())
        .await
        .unwrap();
    assert_eq!(report.donations_deleted, 0);
    assert!(app.donation_state(donation).await.is_some());

    // Force removes every expired donation regardless of grace.
    let report = sweep
        .run_at(
            today,
            CleanupSweepOptions {
                force: true,
                ..CleanupSweepOptions::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(report.donations_deleted, 1);
    assert!(app.donation_state(donation).await.is_none());
}

#[tokio::test]
async fn test_cleanup_dry_run_deletes_nothing() {
    let _guard = helpers::serial().lock().await;
    let Some(app) = helpers::TestApp::new().await else {
        eprintln!("skipped: HEALTHBRIDGE_TEST_DATABASE_URL not set");
        return;
    };

    let donor = app.create_user("cleanup_donor3", "donor").await;
    let today = Utc::now().date_naive();
    let donation = app
        .seed_donation(
            donor,
            "Ancient Tablets",
            5,
            today - Duration::days(30),
            "available",
            "approved",
        )
        .await;

    let sweep = cleanup_sweep(&app);
    let report = sweep
        .run_at(
            today,
            CleanupSweepOptions {
                dry_run: true,
                ..CleanupSweepOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(report.donations_deleted, 1);
    assert!(app.donation_state(donation).await.is_some());
    assert_eq!(app.notification_count(donor, "system").await, 0);
}
