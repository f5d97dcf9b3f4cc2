//! Administrative recompute-all job
//!
//! One-shot wrapper around `recalculate_all`, suitable for a Kubernetes
//! CronJob or an admin-triggered run of the service binary. Users are
//! processed sequentially; a per-user failure is recorded and the batch
//! continues.

use crate::error::Result;
use crate::services::ReputationService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Batch run statistics
#[derive(Debug, Clone, Default)]
pub struct BatchJobStats {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub users_processed: u32,
    pub users_succeeded: u32,
    pub users_failed: u32,
    pub total_duration_ms: u64,
}

pub struct RecalcBatchJob {
    service: Arc<ReputationService>,
}

impl RecalcBatchJob {
    pub fn new(service: Arc<ReputationService>) -> Self {
        Self { service }
    }

    /// Run one full pass over all users
    ///
    /// Fails only when the user enumeration itself fails; individual
    /// recalculation failures are counted, logged and swallowed.
    pub async fn run(&self) -> Result<BatchJobStats> {
        let started = Instant::now();
        let mut stats = BatchJobStats {
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        info!("Starting reputation batch recalculation");

        let outcomes = self.service.recalculate_all().await?;

        for outcome in &outcomes {
            stats.users_processed += 1;
            if outcome.is_success() {
                stats.users_succeeded += 1;
            } else {
                stats.users_failed += 1;
            }
        }

        stats.completed_at = Some(Utc::now());
        stats.total_duration_ms = started.elapsed().as_millis() as u64;

        if stats.users_failed > 0 {
            error!(
                processed = stats.users_processed,
                succeeded = stats.users_succeeded,
                failed = stats.users_failed,
                duration_ms = stats.total_duration_ms,
                "Reputation batch completed with failures"
            );
        } else {
            info!(
                processed = stats.users_processed,
                duration_ms = stats.total_duration_ms,
                "Reputation batch completed"
            );
        }

        Ok(stats)
    }
}
