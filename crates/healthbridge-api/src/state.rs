//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use healthbridge_core::config::AppConfig;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::expiry_alert::ExpiryAlertRepository;
use healthbridge_database::repositories::lifecycle::LifecycleRepository;
use healthbridge_database::repositories::notification::NotificationRepository;
use healthbridge_database::repositories::request::RequestRepository;
use healthbridge_database::repositories::user::UserRepository;
use healthbridge_service::admin::AdminService;
use healthbridge_service::donation::{DonationService, MedicineSearchService};
use healthbridge_service::notification::{NotificationService, Notifier};
use healthbridge_service::request::RequestService;
use healthbridge_storage::manager::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Image blob storage.
    pub storage_manager: Arc<StorageManager>,

    /// User repository.
    pub user_repo: Arc<UserRepository>,
    /// Donation repository.
    pub donation_repo: Arc<DonationRepository>,
    /// Request repository.
    pub request_repo: Arc<RequestRepository>,
    /// Notification repository.
    pub notification_repo: Arc<NotificationRepository>,
    /// Expiry alert ledger repository.
    pub expiry_alert_repo: Arc<ExpiryAlertRepository>,
    /// Cross-entity transactional repository.
    pub lifecycle_repo: Arc<LifecycleRepository>,

    /// Notification sink.
    pub notifier: Arc<Notifier>,
    /// Donation service.
    pub donation_service: Arc<DonationService>,
    /// Medicine search and autocomplete service.
    pub search_service: Arc<MedicineSearchService>,
    /// Request service.
    pub request_service: Arc<RequestService>,
    /// Admin review service.
    pub admin_service: Arc<AdminService>,
    /// Notification center service.
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    /// Wire the full dependency graph from a pool, storage manager, and
    /// configuration.
    pub fn build(config: AppConfig, db_pool: PgPool, storage_manager: StorageManager) -> Self {
        let storage_manager = Arc::new(storage_manager);

        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let donation_repo = Arc::new(DonationRepository::new(db_pool.clone()));
        let request_repo = Arc::new(RequestRepository::new(db_pool.clone()));
        let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));
        let expiry_alert_repo = Arc::new(ExpiryAlertRepository::new(db_pool.clone()));
        let lifecycle_repo = Arc::new(LifecycleRepository::new(db_pool.clone()));

        let notifier = Arc::new(Notifier::new(Arc::clone(&notification_repo)));

        let donation_service = Arc::new(DonationService::new(
            Arc::clone(&donation_repo),
            Arc::clone(&request_repo),
            Arc::clone(&storage_manager),
        ));
        let search_service = Arc::new(MedicineSearchService::new(Arc::clone(&donation_repo)));
        let request_service = Arc::new(RequestService::new(
            Arc::clone(&request_repo),
            Arc::clone(&donation_repo),
            Arc::clone(&lifecycle_repo),
            Arc::clone(&user_repo),
            Arc::clone(&notifier),
        ));
        let admin_service = Arc::new(AdminService::new(
            Arc::clone(&donation_repo),
            Arc::clone(&request_repo),
            Arc::clone(&lifecycle_repo),
            Arc::clone(&user_repo),
            Arc::clone(&storage_manager),
            Arc::clone(&notifier),
        ));
        let notification_service =
            Arc::new(NotificationService::new(Arc::clone(&notification_repo)));

        Self {
            config: Arc::new(config),
            db_pool,
            storage_manager,
            user_repo,
            donation_repo,
            request_repo,
            notification_repo,
            expiry_alert_repo,
            lifecycle_repo,
            notifier,
            donation_service,
            search_service,
            request_service,
            admin_service,
            notification_service,
        }
    }
}
