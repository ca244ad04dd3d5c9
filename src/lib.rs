#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::database::{self, user_repo::PgUserRepository};
use crate::adapters::memory::InMemoryUserRepository;
use crate::api::ServiceContainer;
use crate::config::{Config, StorageBackend};
use crate::services::health_service::HealthService;
use crate::services::rate_limit_service::RateLimitService;
use crate::services::repository::UserRepository;
use crate::services::user_service::UserService;
use std::sync::Arc;
use tokio::sync::watch;

/// Fully wired services, ready to be handed to the routers.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    repository: Option<Arc<dyn UserRepository>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, repository: None }
    }

    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn UserRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Wires every service on top of the configured repository.
    ///
    /// # Errors
    /// Returns an error if no repository was supplied.
    pub fn build(self) -> anyhow::Result<App> {
        let repository = self.repository.ok_or_else(|| anyhow::anyhow!("a user repository is required"))?;

        let services = ServiceContainer {
            user_service: UserService::new(Arc::clone(&repository)),
            rate_limit_service: RateLimitService::new(self.config.server.trusted_proxies),
        };

        Ok(App { services, health_service: HealthService::new(repository) })
    }
}

/// Opens the storage backend selected by the configuration.
///
/// # Errors
/// Returns an error if the database is unreachable or its migrations fail.
pub async fn init_repository(config: &Config) -> anyhow::Result<Arc<dyn UserRepository>> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool = database::init_pool(&config.database).await?;
            database::run_migrations(&pool).await?;
            Ok(Arc::new(PgUserRepository::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; users will not survive a restart");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
    }
}

/// Routes panics through tracing so they reach the configured log sink.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic payload");
        let location = panic_info.location().map(ToString::to_string).unwrap_or_default();

        tracing::error!(panic.message = %message, panic.location = %location, "Process panicked");
    }));
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}
