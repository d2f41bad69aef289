//! Shared test helpers for integration tests.
//!
//! Integration tests need a PostgreSQL database; set
//! `HEALTHBRIDGE_TEST_DATABASE_URL` to run them. Without it every test
//! returns early (skipped) so the suite stays green on machines with no
//! database.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use chrono::NaiveDate;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use healthbridge_api::router::build_router;
use healthbridge_api::state::AppState;
use healthbridge_core::config::AppConfig;
use healthbridge_core::config::database::DatabaseConfig;
use healthbridge_core::config::storage::StorageConfig;
use healthbridge_storage::manager::StorageManager;
use healthbridge_storage::providers::LocalBlobStore;

/// Serializes tests touching the shared database.
pub fn serial() -> &'static tokio::sync::Mutex<()> {
    static LOCK: OnceLock<tokio::sync::Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| tokio::sync::Mutex::new(()))
}

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// Database pool for direct queries.
    pub db_pool: PgPool,
    /// Blob storage rooted in a per-run temp directory.
    pub storage: Arc<StorageManager>,
}

impl TestApp {
    /// Create a new test application, or `None` when no test database is
    /// configured.
    pub async fn new() -> Option<Self> {
        let url = std::env::var("HEALTHBRIDGE_TEST_DATABASE_URL").ok()?;

        let mut config = test_config(&url);

        let db_pool = healthbridge_database::connection::DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database")
            .into_pool();

        healthbridge_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        Self::clean_database(&db_pool).await;

        let storage_root = std::env::temp_dir().join(format!("hb-test-{}", Uuid::new_v4()));
        config.storage.root = storage_root.to_string_lossy().into_owned();
        let store = LocalBlobStore::new(&config.storage.root)
            .await
            .expect("Failed to init storage");
        let storage = StorageManager::with_store(Arc::new(store));

        let state = AppState::build(config, db_pool.clone(), storage);
        let storage = Arc::clone(&state.storage_manager);
        let router = build_router(state);

        Some(Self {
            router,
            db_pool,
            storage,
        })
    }

    /// Clean all test data from the database.
    async fn clean_database(pool: &PgPool) {
        let tables = [
            "expiry_alerts",
            "notifications",
            "medicine_requests",
            "donations",
            "users",
        ];

        for table in &tables {
            let query = format!("DELETE FROM {table}");
            let _ = sqlx::query(&query).execute(pool).await;
        }
    }

    /// Create a test user and return their ID.
    pub async fn create_user(&self, username: &str, role: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, email, username, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5, $6::user_role)",
        )
        .bind(id)
        .bind(format!("{username}@test.com"))
        .bind(username)
        .bind(username)
        .bind("Tester")
        .bind(role)
        .execute(&self.db_pool)
        .await
        .expect("Failed to create test user");
        id
    }

    /// Seed a donation directly, bypassing the upload flow.
    pub async fn seed_donation(
        &self,
        donor_id: Uuid,
        name: &str,
        quantity: i32,
        expiry_date: NaiveDate,
        status: &str,
        approval: &str,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO donations \
             (id, name, quantity, expiry_date, donor_id, image_path, status, approval_status, tracking_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7::donation_status, $8::approval_status, $9)",
        )
        .bind(id)
        .bind(name)
        .bind(quantity)
        .bind(expiry_date)
        .bind(donor_id)
        .bind(format!("donations/{id}/image.jpg"))
        .bind(status)
        .bind(approval)
        .bind(format!("DON-{}", &id.simple().to_string()[..8].to_uppercase()))
        .execute(&self.db_pool)
        .await
        .expect("Failed to seed donation");
        id
    }

    /// Fetch a donation's (quantity, status, approval_status).
    pub async fn donation_state(&self, donation_id: Uuid) -> Option<(i32, String, String)> {
        sqlx::query_as(
            "SELECT quantity, status::text, approval_status::text FROM donations WHERE id = $1",
        )
        .bind(donation_id)
        .fetch_optional(&self.db_pool)
        .await
        .expect("Failed to fetch donation state")
    }

    /// Fetch a request's (status, approval_status, matched_donation_id).
    pub async fn request_state(&self, request_id: Uuid) -> Option<(String, String, Option<Uuid>)> {
        sqlx::query_as(
            "SELECT status::text, approval_status::text, matched_donation_id \
             FROM medicine_requests WHERE id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.db_pool)
        .await
        .expect("Failed to fetch request state")
    }

    /// Count notifications of a kind addressed to a user.
    pub async fn notification_count(&self, user_id: Uuid, kind: &str) -> i64 {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND kind = $2::notification_kind",
        )
        .bind(user_id)
        .bind(kind)
        .fetch_one(&self.db_pool)
        .await
        .expect("Failed to count notifications")
    }

    /// Count alert-ledger entries for a donation.
    pub async fn ledger_count(&self, donation_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM expiry_alerts WHERE donation_id = $1")
            .bind(donation_id)
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count ledger entries")
    }

    /// Make a JSON HTTP request to the test app.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<Uuid>,
    ) -> TestResponse {
        let body_bytes = body
            .map(|b| serde_json::to_vec(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.request_raw(method, path, "application/json", body_bytes, user)
            .await
    }

    /// Make an HTTP request with an explicit content type and raw body.
    pub async fn request_raw(
        &self,
        method: &str,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
        user: Option<Uuid>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type);

        if let Some(user_id) = user {
            req = req.header("X-User-Id", user_id.to_string());
        }

        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body.
    pub body: Value,
}

fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        server: Default::default(),
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_seconds: 5,
            idle_timeout_seconds: 60,
        },
        storage: StorageConfig::default(),
        worker: Default::default(),
        logging: Default::default(),
    }
}

/// Build a multipart body for the donation upload endpoint.
pub fn donation_multipart(
    name: &str,
    quantity: &str,
    expiry_date: &str,
    image: Option<&[u8]>,
) -> (String, Vec<u8>) {
    let boundary = "HBTESTBOUNDARY";
    let mut body: Vec<u8> = Vec::new();

    for (field, value) in [
        ("name", name),
        ("quantity", quantity),
        ("expiry_date", expiry_date),
    ] {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (
        format!("multipart/form-data; boundary={boundary}"),
        body,
    )
}

/// Minimal valid PNG bytes (signature + empty IHDR is enough for format
/// detection).
pub fn tiny_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89,
    ]
}
