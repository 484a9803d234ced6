use std::sync::Arc;

use chrono::{DateTime, Utc};
use saweria_relay_core::{
    DonationRepositoryTrait, DonationService, DonationServiceTrait, InMemoryDonationRepository,
};
use saweria_relay_storage_sqlite::{
    db::{self, write_actor},
    donations::DonationRepository,
};
use tokio::signal::ctrl_c;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, StorageBackend};

pub struct AppState {
    pub donation_service: Arc<dyn DonationServiceTrait>,
    pub started_at: DateTime<Utc>,
    /// Resolved database file when running on SQLite.
    pub db_path: Option<String>,
}

pub fn init_tracing() {
    let log_format = std::env::var("RELAY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (repository, db_path): (Arc<dyn DonationRepositoryTrait>, Option<String>) =
        match config.storage {
            StorageBackend::Sqlite => {
                let db_path = db::init(&config.db_path)?;
                info!("Database path in use: {}", db_path);
                let pool = db::create_pool(&db_path)?;
                db::run_migrations(&pool)?;
                let writer = write_actor::spawn_writer((*pool).clone());
                let repository: Arc<dyn DonationRepositoryTrait> =
                    Arc::new(DonationRepository::new(pool, writer));
                (repository, Some(db_path))
            }
            StorageBackend::Memory => {
                warn!(
                    "Using in-memory storage (capacity {}); donations are lost on restart",
                    config.queue_capacity
                );
                let repository: Arc<dyn DonationRepositoryTrait> =
                    Arc::new(InMemoryDonationRepository::new(config.queue_capacity));
                (repository, None)
            }
        };

    let donation_service = Arc::new(DonationService::new(repository, config.retention));
    info!("Donation store ready ({})", donation_service.backend_name());

    Ok(Arc::new(AppState {
        donation_service,
        started_at: Utc::now(),
        db_path,
    }))
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
