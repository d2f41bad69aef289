//! Medicine search and cached autocomplete.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;

use healthbridge_core::error::AppError;
use healthbridge_core::types::pagination::{PageRequest, PageResponse};
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_entity::donation::Donation;

/// Autocomplete suggestions are cached this long.
const AUTOCOMPLETE_TTL: Duration = Duration::from_secs(300);
/// Minimum query length before suggestions are computed.
const MIN_QUERY_LEN: usize = 2;
/// Maximum number of suggestions returned.
const MAX_SUGGESTIONS: i64 = 10;

/// Search filters for the recipient-facing medicine catalogue.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Name substring, case-insensitive.
    pub query: Option<String>,
    /// Only medicines expiring on or after this date.
    pub expiry_from: Option<NaiveDate>,
    /// Only medicines expiring on or before this date.
    pub expiry_to: Option<NaiveDate>,
}

/// Searches matchable donations and serves autocomplete suggestions.
#[derive(Clone)]
pub struct MedicineSearchService {
    /// Donation repository.
    donation_repo: Arc<DonationRepository>,
    /// Autocomplete suggestion cache keyed by normalized query.
    suggestion_cache: Cache<String, Vec<String>>,
}

impl std::fmt::Debug for MedicineSearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedicineSearchService").finish()
    }
}

impl MedicineSearchService {
    /// Creates a new search service.
    pub fn new(donation_repo: Arc<DonationRepository>) -> Self {
        Self {
            donation_repo,
            suggestion_cache: Cache::builder()
                .time_to_live(AUTOCOMPLETE_TTL)
                .max_capacity(10_000)
                .build(),
        }
    }

    /// Searches approved, available donations.
    ///
    /// Only matchable stock is visible to recipients; unreviewed and
    /// reserved donations never appear here.
    pub async fn search(
        &self,
        filters: SearchFilters,
        page: PageRequest,
    ) -> Result<PageResponse<Donation>, AppError> {
        if let (Some(from), Some(to)) = (filters.expiry_from, filters.expiry_to) {
            if from > to {
                return Err(AppError::validation("Start date cannot be after end date"));
            }
        }

        let query = filters
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        self.donation_repo
            .search_matchable(query, filters.expiry_from, filters.expiry_to, &page)
            .await
    }

    /// Returns autocomplete suggestions for a medicine-name prefix.
    ///
    /// Results are cached for five minutes per normalized query.
    pub async fn autocomplete(&self, query: &str) -> Result<Vec<String>, AppError> {
        let normalized = query.trim().to_lowercase();
        if normalized.len() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        if let Some(cached) = self.suggestion_cache.get(&normalized).await {
            return Ok(cached);
        }

        let mut names = self
            .donation_repo
            .autocomplete_names(&normalized, MAX_SUGGESTIONS)
            .await?;
        names.sort();
        names.dedup();

        self.suggestion_cache
            .insert(normalized, names.clone())
            .await;

        Ok(names)
    }
}
