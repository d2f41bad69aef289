//! Expiry alert ledger repository.

use sqlx::PgPool;
use uuid::Uuid;

use healthbridge_core::error::{AppError, ErrorKind};
use healthbridge_core::result::AppResult;
use healthbridge_entity::expiry::ExpiryAlert;

/// Repository for the expiry-alert deduplication ledger.
#[derive(Debug, Clone)]
pub struct ExpiryAlertRepository {
    pool: PgPool,
}

impl ExpiryAlertRepository {
    /// Create a new expiry alert repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an alert if no entry exists for the
    /// `(donation, days_before_expiry, recipient_email)` triple.
    ///
    /// Returns `true` when a new ledger row was inserted. The unique
    /// constraint makes this safe under concurrent sweep invocations.
    pub async fn record_if_absent(
        &self,
        donation_id: Uuid,
        days_before_expiry: i32,
        recipient_email: &str,
        alert_type: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO expiry_alerts (donation_id, days_before_expiry, recipient_email, alert_type) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (donation_id, days_before_expiry, recipient_email) DO NOTHING",
        )
        .bind(donation_id)
        .bind(days_before_expiry)
        .bind(recipient_email)
        .bind(alert_type)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record alert", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether an alert was already recorded for the triple.
    pub async fn exists(
        &self,
        donation_id: Uuid,
        days_before_expiry: i32,
        recipient_email: &str,
    ) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM expiry_alerts \
             WHERE donation_id = $1 AND days_before_expiry = $2 AND recipient_email = $3)",
        )
        .bind(donation_id)
        .bind(days_before_expiry)
        .bind(recipient_email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check alert ledger", e))
    }

    /// All ledger entries for a donation.
    pub async fn find_by_donation(&self, donation_id: Uuid) -> AppResult<Vec<ExpiryAlert>> {
        sqlx::query_as::<_, ExpiryAlert>(
            "SELECT * FROM expiry_alerts WHERE donation_id = $1 ORDER BY created_at DESC",
        )
        .bind(donation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list alerts", e))
    }
}
