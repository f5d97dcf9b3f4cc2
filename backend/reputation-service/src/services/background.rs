//! Deferred post-report recalculation
//!
//! Filing a report against a user triggers a recalculation of that user's
//! reputation, decoupled from the report-filing request: the report is
//! already persisted, so a downstream scoring failure must never surface to
//! the reporter. Failure here is log-only.

use crate::services::ReputationService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Spawn a detached, best-effort recalculation for a reported user
///
/// The returned handle lets callers await completion (tests, graceful
/// shutdown); production callers drop it.
pub fn schedule_post_report_recalculation(
    service: Arc<ReputationService>,
    reported_user_id: Uuid,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        match service.calculate_user_reputation(reported_user_id).await {
            Ok(record) => {
                tracing::info!(
                    user_id = %reported_user_id,
                    overall_score = record.overall_score,
                    "Post-report reputation recalculation completed"
                );
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %reported_user_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Post-report reputation recalculation failed"
                );
            }
        }
    })
}
