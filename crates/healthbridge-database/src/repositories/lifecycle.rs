//! Transactional cross-entity lifecycle mutations.
//!
//! Every operation here touches both a donation and a request and must be
//! atomic: a failure mid-operation rolls the whole mutation back.
//! Notification emission is deliberately *not* part of these transactions;
//! callers emit after commit so a sink failure cannot undo the state
//! change.

use sqlx::PgPool;
use uuid::Uuid;

use healthbridge_core::error::{AppError, ErrorKind};
use healthbridge_core::result::AppResult;
use healthbridge_entity::donation::DonationStatus;
use healthbridge_entity::request::{CreateRequest, MedicineRequest};

/// Repository owning multi-entity transactions.
#[derive(Debug, Clone)]
pub struct LifecycleRepository {
    pool: PgPool,
}

impl LifecycleRepository {
    /// Create a new lifecycle repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atomically reserve a donation and create the matched request.
    ///
    /// The reservation re-checks `available`/`approved` inside the
    /// transaction, so a donation raced away by another request fails with
    /// a conflict instead of double-reserving.
    pub async fn reserve_and_create_request(
        &self,
        donation_id: Uuid,
        data: &CreateRequest,
    ) -> AppResult<MedicineRequest> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let reserved = sqlx::query(
            "UPDATE donations SET status = 'reserved', last_update = NOW() \
             WHERE id = $1 AND status = 'available' AND approval_status = 'approved'",
        )
        .bind(donation_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reserve donation", e))?;

        if reserved.rows_affected() == 0 {
            return Err(AppError::conflict(
                "Donation is no longer available for matching",
            ));
        }

        let request = sqlx::query_as::<_, MedicineRequest>(
            "INSERT INTO medicine_requests \
             (medicine_name, quantity, urgency, reason, recipient_id, matched_donation_id, status, tracking_code) \
             VALUES ($1, $2, $3, $4, $5, $6, 'matched', $7) RETURNING *",
        )
        .bind(&data.medicine_name)
        .bind(&data.quantity)
        .bind(data.urgency)
        .bind(&data.reason)
        .bind(data.recipient_id)
        .bind(donation_id)
        .bind(&data.tracking_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create request", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit match", e)
        })?;

        Ok(request)
    }

    /// Atomically apply a delivery: write the donation's new quantity and
    /// status, and mark the request fulfilled.
    pub async fn deliver(
        &self,
        donation_id: Uuid,
        new_quantity: i32,
        new_status: DonationStatus,
        request_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "UPDATE donations SET quantity = $2, status = $3, last_update = NOW() WHERE id = $1",
        )
        .bind(donation_id)
        .bind(new_quantity)
        .bind(new_status)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update donation", e))?;

        sqlx::query(
            "UPDATE medicine_requests SET status = 'fulfilled', updated_at = NOW() WHERE id = $1",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update request", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit delivery", e)
        })?;

        Ok(())
    }

    /// Atomically delete a request, reverting its reserved donation to
    /// `available` first when one is bound.
    ///
    /// The quantity is untouched: stock is only decremented at delivery.
    pub async fn remove_request_restoring_donation(
        &self,
        request_id: Uuid,
        donation_to_restore: Option<Uuid>,
    ) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        if let Some(donation_id) = donation_to_restore {
            sqlx::query(
                "UPDATE donations SET status = 'available', last_update = NOW() \
                 WHERE id = $1 AND status = 'reserved'",
            )
            .bind(donation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to restore donation", e)
            })?;
        }

        let deleted = sqlx::query("DELETE FROM medicine_requests WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete request", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit removal", e)
        })?;

        Ok(deleted.rows_affected())
    }
}
