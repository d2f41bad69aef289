//! Medicine request repository implementation.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use healthbridge_core::error::{AppError, ErrorKind};
use healthbridge_core::result::AppResult;
use healthbridge_core::types::pagination::{PageRequest, PageResponse};
use healthbridge_entity::donation::ApprovalStatus;
use healthbridge_entity::request::{CreateRequest, MedicineRequest, RequestStatus};

/// A claimed request joined with its delivered donation, for the admin
/// dashboard's completed-pickups panel.
#[derive(Debug, Clone, serde::Serialize, FromRow)]
pub struct CompletedPickup {
    /// Medicine that changed hands.
    pub medicine_name: String,
    /// Quantity requested (text column).
    pub quantity: String,
    /// Donor display name.
    pub donor_name: String,
    /// Recipient display name.
    pub recipient_name: String,
    /// When the donor delivered.
    pub delivered_date: DateTime<Utc>,
    /// When the recipient claimed.
    pub claimed_date: DateTime<Utc>,
    /// Request tracking code.
    pub tracking_code: String,
}

/// Repository for medicine request CRUD and queries.
#[derive(Debug, Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    /// Create a new request repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new unmatched request.
    ///
    /// Matched creation reserves the donation in the same transaction and
    /// therefore goes through the lifecycle repository instead.
    pub async fn create(&self, data: &CreateRequest) -> AppResult<MedicineRequest> {
        sqlx::query_as::<_, MedicineRequest>(
            "INSERT INTO medicine_requests \
             (medicine_name, quantity, urgency, reason, recipient_id, matched_donation_id, status, tracking_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&data.medicine_name)
        .bind(&data.quantity)
        .bind(data.urgency)
        .bind(&data.reason)
        .bind(data.recipient_id)
        .bind(data.matched_donation_id)
        .bind(data.status)
        .bind(&data.tracking_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create request", e))
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, request_id: Uuid) -> AppResult<Option<MedicineRequest>> {
        sqlx::query_as::<_, MedicineRequest>("SELECT * FROM medicine_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find request", e))
    }

    /// List requests by recipient, newest first.
    pub async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<MedicineRequest>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM medicine_requests WHERE recipient_id = $1")
                .bind(recipient_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count requests", e)
                })?;

        let requests = sqlx::query_as::<_, MedicineRequest>(
            "SELECT * FROM medicine_requests WHERE recipient_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(recipient_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list requests", e))?;

        Ok(PageResponse::new(
            requests,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Requests still referencing a donation as their match.
    pub async fn find_by_matched_donation(
        &self,
        donation_id: Uuid,
    ) -> AppResult<Vec<MedicineRequest>> {
        sqlx::query_as::<_, MedicineRequest>(
            "SELECT * FROM medicine_requests WHERE matched_donation_id = $1",
        )
        .bind(donation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find matched requests", e))
    }

    /// Requests pending review, most urgent first, FIFO within a tier.
    pub async fn find_pending_review(&self) -> AppResult<Vec<MedicineRequest>> {
        sqlx::query_as::<_, MedicineRequest>(
            "SELECT * FROM medicine_requests WHERE approval_status = 'pending' \
             ORDER BY CASE urgency \
                 WHEN 'critical' THEN 1 \
                 WHEN 'high' THEN 2 \
                 WHEN 'medium' THEN 3 \
                 WHEN 'low' THEN 4 \
             END, created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pending requests", e)
        })
    }

    /// Most recently approved requests.
    pub async fn find_recent_approved(&self, limit: i64) -> AppResult<Vec<MedicineRequest>> {
        sqlx::query_as::<_, MedicineRequest>(
            "SELECT * FROM medicine_requests WHERE approval_status = 'approved' \
             ORDER BY reviewed_at DESC NULLS LAST LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list recent approvals", e)
        })
    }

    /// Claimed requests whose matched donation was fully delivered.
    pub async fn find_completed_pickups(&self) -> AppResult<Vec<CompletedPickup>> {
        sqlx::query_as::<_, CompletedPickup>(
            "SELECT r.medicine_name, r.quantity, \
                    TRIM(du.first_name || ' ' || du.last_name) AS donor_name, \
                    TRIM(ru.first_name || ' ' || ru.last_name) AS recipient_name, \
                    d.last_update AS delivered_date, \
                    r.updated_at AS claimed_date, \
                    r.tracking_code \
             FROM medicine_requests r \
             JOIN donations d ON d.id = r.matched_donation_id \
             JOIN users du ON du.id = d.donor_id \
             JOIN users ru ON ru.id = r.recipient_id \
             WHERE r.status = 'claimed' AND d.status = 'delivered' \
             ORDER BY r.updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list completed pickups", e)
        })
    }

    /// Stamp an approval decision with the claim-ready date.
    pub async fn approve(
        &self,
        request_id: Uuid,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
        claim_ready_date: NaiveDate,
    ) -> AppResult<MedicineRequest> {
        sqlx::query_as::<_, MedicineRequest>(
            "UPDATE medicine_requests SET approval_status = 'approved', reviewed_by = $2, \
             reviewed_at = $3, claim_ready_date = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .bind(reviewed_by)
        .bind(reviewed_at)
        .bind(claim_ready_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to approve request", e))
    }

    /// Update the lifecycle status of a request.
    pub async fn set_status(&self, request_id: Uuid, status: RequestStatus) -> AppResult<()> {
        sqlx::query("UPDATE medicine_requests SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(request_id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update request status", e)
            })?;
        Ok(())
    }

    /// Delete a request row.
    pub async fn delete(&self, request_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM medicine_requests WHERE id = $1")
            .bind(request_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete request", e)
            })?;
        Ok(result.rows_affected())
    }

    /// Count all requests.
    pub async fn count_all(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM medicine_requests")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count requests", e))
    }

    /// Count requests by approval status.
    pub async fn count_by_approval(&self, approval: ApprovalStatus) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM medicine_requests WHERE approval_status = $1")
            .bind(approval)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count requests", e))
    }
}
