use reputation_service::{
    config::Config,
    db::{self, PgMetricsReader, PgReputationStore, PgUserDirectory},
    jobs::RecalcBatchJob,
    services::ReputationService,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    tracing::info!("Starting Reputation Service batch recalculation...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        staleness_window_hours = config.staleness_window_hours,
        "Configuration loaded"
    );

    // Initialize database pool
    let pool = Arc::new(db::create_pool(&config).await?);

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&*pool)
        .await
        .map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            e
        })?;
    tracing::info!("Migrations completed successfully");

    // Wire the calculation engine to its Postgres repositories
    let service = Arc::new(ReputationService::new(
        Arc::new(PgUserDirectory::new(pool.clone())),
        Arc::new(PgMetricsReader::new(pool.clone())),
        Arc::new(PgReputationStore::new(pool.clone())),
        &config,
    ));

    // One full recompute-all pass (admin operation)
    let job = RecalcBatchJob::new(service);
    let stats = job.run().await?;

    if stats.users_failed > 0 {
        return Err(format!(
            "{} of {} users failed to recalculate",
            stats.users_failed, stats.users_processed
        )
        .into());
    }

    Ok(())
}
