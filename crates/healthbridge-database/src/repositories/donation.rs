//! Donation repository implementation.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use healthbridge_core::error::{AppError, ErrorKind};
use healthbridge_core::result::AppResult;
use healthbridge_core::types::pagination::{PageRequest, PageResponse};
use healthbridge_entity::donation::{ApprovalStatus, CreateDonation, Donation, DonationStatus};

/// Repository for donation CRUD and queries.
#[derive(Debug, Clone)]
pub struct DonationRepository {
    pool: PgPool,
}

impl DonationRepository {
    /// Create a new donation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new donation (available / pending review).
    pub async fn create(&self, data: &CreateDonation) -> AppResult<Donation> {
        sqlx::query_as::<_, Donation>(
            "INSERT INTO donations (name, quantity, expiry_date, donor_id, image_path, notes, tracking_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.quantity)
        .bind(data.expiry_date)
        .bind(data.donor_id)
        .bind(&data.image_path)
        .bind(&data.notes)
        .bind(&data.tracking_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create donation", e))
    }

    /// Find a donation by ID.
    pub async fn find_by_id(&self, donation_id: Uuid) -> AppResult<Option<Donation>> {
        sqlx::query_as::<_, Donation>("SELECT * FROM donations WHERE id = $1")
            .bind(donation_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find donation", e))
    }

    /// List donations by donor, newest first.
    pub async fn find_by_donor(
        &self,
        donor_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Donation>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM donations WHERE donor_id = $1")
            .bind(donor_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count donations", e)
            })?;

        let donations = sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE donor_id = $1 \
             ORDER BY donated_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(donor_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list donations", e))?;

        Ok(PageResponse::new(
            donations,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Search matchable donations (approved and available) by name and
    /// expiry-date range.
    pub async fn search_matchable(
        &self,
        name_query: Option<&str>,
        expiry_from: Option<NaiveDate>,
        expiry_to: Option<NaiveDate>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Donation>> {
        let pattern = name_query.map(|q| format!("%{q}%"));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM donations \
             WHERE approval_status = 'approved' AND status = 'available' \
               AND ($1::text IS NULL OR name ILIKE $1) \
               AND ($2::date IS NULL OR expiry_date >= $2) \
               AND ($3::date IS NULL OR expiry_date <= $3)",
        )
        .bind(&pattern)
        .bind(expiry_from)
        .bind(expiry_to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count search", e))?;

        let donations = sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations \
             WHERE approval_status = 'approved' AND status = 'available' \
               AND ($1::text IS NULL OR name ILIKE $1) \
               AND ($2::date IS NULL OR expiry_date >= $2) \
               AND ($3::date IS NULL OR expiry_date <= $3) \
             ORDER BY expiry_date ASC LIMIT $4 OFFSET $5",
        )
        .bind(&pattern)
        .bind(expiry_from)
        .bind(expiry_to)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search donations", e))?;

        Ok(PageResponse::new(
            donations,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Distinct medicine names matching a substring, for autocomplete.
    pub async fn autocomplete_names(&self, query: &str, limit: i64) -> AppResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT DISTINCT name FROM donations WHERE name ILIKE $1 ORDER BY name LIMIT $2",
        )
        .bind(format!("%{query}%"))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to autocomplete names", e))
    }

    /// Whether the donor already donated a medicine with this name.
    pub async fn exists_by_donor_and_name(&self, donor_id: Uuid, name: &str) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM donations WHERE donor_id = $1 AND name ILIKE $2)",
        )
        .bind(donor_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check donor stock", e))
    }

    /// Donations pending review, newest first.
    pub async fn find_pending_review(&self) -> AppResult<Vec<Donation>> {
        sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE approval_status = 'pending' ORDER BY donated_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pending donations", e)
        })
    }

    /// Most recently approved donations.
    pub async fn find_recent_approved(&self, limit: i64) -> AppResult<Vec<Donation>> {
        sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE approval_status = 'approved' \
             ORDER BY reviewed_at DESC NULLS LAST LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list recent approvals", e)
        })
    }

    /// Stamp an admin review decision.
    pub async fn set_review(
        &self,
        donation_id: Uuid,
        approval: ApprovalStatus,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> AppResult<Donation> {
        sqlx::query_as::<_, Donation>(
            "UPDATE donations SET approval_status = $2, reviewed_by = $3, reviewed_at = $4, \
             last_update = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(donation_id)
        .bind(approval)
        .bind(reviewed_by)
        .bind(reviewed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to review donation", e))
    }

    /// Update the stock status of a donation.
    pub async fn set_status(&self, donation_id: Uuid, status: DonationStatus) -> AppResult<()> {
        sqlx::query("UPDATE donations SET status = $2, last_update = NOW() WHERE id = $1")
            .bind(donation_id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update donation status", e)
            })?;
        Ok(())
    }

    /// Delete a donation row.
    pub async fn delete(&self, donation_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(donation_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete donation", e)
            })?;
        Ok(result.rows_affected())
    }

    /// Donations whose expiry date falls within `[today, today + days]`.
    pub async fn find_expiring_within(
        &self,
        today: NaiveDate,
        days: i64,
    ) -> AppResult<Vec<Donation>> {
        let until = today + chrono::Duration::days(days);
        sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE expiry_date >= $1 AND expiry_date <= $2 \
             ORDER BY expiry_date ASC",
        )
        .bind(today)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find expiring donations", e)
        })
    }

    /// Donations whose expiry date is strictly before the cutoff.
    pub async fn find_expired_before(&self, cutoff: NaiveDate) -> AppResult<Vec<Donation>> {
        sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE expiry_date < $1 ORDER BY expiry_date ASC",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find expired donations", e)
        })
    }

    /// Count all donations.
    pub async fn count_all(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM donations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count donations", e))
    }

    /// Count donations by approval status.
    pub async fn count_by_approval(&self, approval: ApprovalStatus) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM donations WHERE approval_status = $1")
            .bind(approval)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count donations", e))
    }
}
