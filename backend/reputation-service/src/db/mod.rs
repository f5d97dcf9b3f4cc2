//! Data access layer: connection pool plus the repositories the calculator
//! is constructed from. Each repository is a trait so tests can substitute
//! in-memory fakes for Postgres.

pub mod metrics;
pub mod reputation;
pub mod users;

pub use metrics::{MetricsReader, PgMetricsReader};
pub use reputation::{PgReputationStore, ReputationStore};
pub use users::{PgUserDirectory, UserDirectory};

use crate::config::Config;
use crate::error::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Create the service's Postgres pool
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_max_connections.min(5))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database_url)
        .await?;

    tracing::info!(
        service = %config.service_name,
        max_connections = config.db_max_connections,
        "Database pool initialized"
    );

    Ok(pool)
}
