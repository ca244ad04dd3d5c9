pub mod records;
pub mod user_repo;

use crate::config::DatabaseConfig;
use backon::{ExponentialBuilder, Retryable};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

pub type DbPool = Pool<Postgres>;

/// Initializes the database connection pool, retrying the first connection with backoff.
///
/// # Errors
/// Returns an error if no URL is configured or the database stays unreachable after all retries.
pub async fn init_pool(config: &DatabaseConfig) -> anyhow::Result<DbPool> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("a database URL is required for the postgres storage backend"))?;

    let options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs));

    let retry_strategy = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(10))
        .with_max_times(config.connect_retries);

    let pool = (|| options.clone().connect(url))
        .retry(retry_strategy)
        .notify(|e, duration| {
            tracing::warn!(error = %e, retry_in = ?duration, "Database unreachable, retrying");
        })
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations.
///
/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
