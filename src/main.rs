//! HealthBridge Server — medicine donation matching platform.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use healthbridge_api::router::build_router;
use healthbridge_api::state::AppState;
use healthbridge_core::config::AppConfig;
use healthbridge_core::error::AppError;
use healthbridge_database::connection::DatabasePool;
use healthbridge_database::migration;
use healthbridge_database::repositories::donation::DonationRepository;
use healthbridge_database::repositories::expiry_alert::ExpiryAlertRepository;
use healthbridge_database::repositories::notification::NotificationRepository;
use healthbridge_database::repositories::request::RequestRepository;
use healthbridge_database::repositories::user::UserRepository;
use healthbridge_service::expiry::{AlertSweep, CleanupSweep};
use healthbridge_service::notification::Notifier;
use healthbridge_storage::manager::StorageManager;
use healthbridge_worker::executor::JobExecutor;
use healthbridge_worker::jobs::{ExpiredCleanupHandler, ExpiryAlertHandler, NotificationTrimHandler};
use healthbridge_worker::scheduler::CronScheduler;

#[tokio::main]
async fn main() {
    let env = std::env::var("HEALTHBRIDGE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting HealthBridge v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = DatabasePool::connect(&config.database).await?.into_pool();
    migration::run_migrations(&db_pool).await?;

    let storage_manager = StorageManager::new(&config.storage).await?;

    let state = AppState::build(config.clone(), db_pool.clone(), storage_manager);

    let mut scheduler = if config.worker.enabled {
        Some(start_worker(&config, &state).await?)
    } else {
        tracing::info!("Background worker disabled by configuration");
        None
    };

    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.shutdown().await?;
    }
    db_pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wire the sweep job handlers and start the cron scheduler.
async fn start_worker(config: &AppConfig, state: &AppState) -> Result<CronScheduler, AppError> {
    let alert_sweep = Arc::new(AlertSweep::new(
        Arc::new(DonationRepository::new(state.db_pool.clone())),
        Arc::new(ExpiryAlertRepository::new(state.db_pool.clone())),
        Arc::new(UserRepository::new(state.db_pool.clone())),
        Arc::new(Notifier::new(Arc::new(NotificationRepository::new(
            state.db_pool.clone(),
        )))),
    ));
    let cleanup_sweep = Arc::new(CleanupSweep::new(
        Arc::new(DonationRepository::new(state.db_pool.clone())),
        Arc::new(RequestRepository::new(state.db_pool.clone())),
        Arc::clone(&state.storage_manager),
        Arc::new(Notifier::new(Arc::new(NotificationRepository::new(
            state.db_pool.clone(),
        )))),
    ));

    let mut executor = JobExecutor::new();
    executor.register(Arc::new(ExpiryAlertHandler::new(
        alert_sweep,
        config.worker.alert_days,
    )));
    executor.register(Arc::new(ExpiredCleanupHandler::new(
        cleanup_sweep,
        config.worker.cleanup_days_past_expiry,
    )));
    executor.register(Arc::new(NotificationTrimHandler::new(
        Arc::new(NotificationRepository::new(state.db_pool.clone())),
        config.worker.notification_retention_days,
    )));

    let scheduler = CronScheduler::new(Arc::new(executor)).await?;
    scheduler.register_default_tasks().await?;
    scheduler.start().await?;

    Ok(scheduler)
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
