//! Reputation calculation and persistence

use crate::config::Config;
use crate::db::{MetricsReader, ReputationStore, UserDirectory};
use crate::error::{ReputationError, Result};
use crate::models::{InviteStatus, RawUserMetrics, UserReputation};
use crate::services::refresh::RefreshPolicy;
use crate::services::scoring;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::types::Json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

/// History reason stamped on every overwrite of an existing record
pub const RECALCULATION_REASON: &str = "Periodic recalculation";

/// Per-user outcome of a batch recalculation
#[derive(Debug)]
pub struct RecalculationOutcome {
    pub user_id: Uuid,
    pub result: Result<UserReputation>,
}

impl RecalculationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Stateless calculation engine constructed from its data-access dependencies
///
/// All methods run as independent units of work; recalculations of the same
/// user are serialized within this process by a per-user advisory lock, which
/// keeps concurrent triggers from stacking duplicate history entries. Across
/// processes the write is a plain upsert and last-write-wins.
pub struct ReputationService {
    users: Arc<dyn UserDirectory>,
    metrics: Arc<dyn MetricsReader>,
    store: Arc<dyn ReputationStore>,
    policy: RefreshPolicy,
    metrics_timeout: Duration,
    history_max_entries: Option<usize>,
    report_recalc_delay: Duration,
    user_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ReputationService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        metrics: Arc<dyn MetricsReader>,
        store: Arc<dyn ReputationStore>,
        config: &Config,
    ) -> Self {
        Self {
            users,
            metrics,
            store,
            policy: RefreshPolicy::new(config.staleness_window_hours),
            metrics_timeout: config.metrics_timeout(),
            history_max_entries: config.history_max_entries,
            report_recalc_delay: config.report_recalc_delay(),
            user_locks: DashMap::new(),
        }
    }

    /// Submit the post-report trigger for a reported user, using the
    /// configured delay
    pub fn notify_report_filed(self: &Arc<Self>, reported_user_id: Uuid) -> tokio::task::JoinHandle<()> {
        crate::services::background::schedule_post_report_recalculation(
            Arc::clone(self),
            reported_user_id,
            self.report_recalc_delay,
        )
    }

    /// Compute a fresh score bundle for the user and persist it
    ///
    /// Exactly one write per invocation: an update appends the pre-overwrite
    /// scores to the history first, a first-ever calculation creates the
    /// record with an empty history.
    pub async fn calculate_user_reputation(&self, user_id: Uuid) -> Result<UserReputation> {
        let lock = self
            .user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let result = {
            let _guard = lock.lock().await;
            self.calculate_locked(user_id).await
        };
        drop(lock);

        // Evict the entry once no other task holds the lock; the table stays
        // bounded by concurrent recalculations, not total users seen.
        self.user_locks
            .remove_if(&user_id, |_, l| Arc::strong_count(l) == 1);

        result
    }

    async fn calculate_locked(&self, user_id: Uuid) -> Result<UserReputation> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or(ReputationError::UserNotFound(user_id))?;

        let raw = tokio::time::timeout(self.metrics_timeout, self.gather_raw_metrics(user_id))
            .await
            .map_err(|_| {
                ReputationError::Timeout(format!("metrics gather for user {user_id}"))
            })??;

        let now = Utc::now();
        let bundle = scoring::aggregate(&raw, user.joined_at, now);

        let record = match self.store.find_by_user(user_id).await? {
            Some(current) => {
                let mut history = current.history.0.clone();
                history.push(current.history_entry(RECALCULATION_REASON, now));
                if let Some(cap) = self.history_max_entries {
                    if history.len() > cap {
                        history.drain(..history.len() - cap);
                    }
                }
                UserReputation {
                    user_id,
                    overall_score: bundle.overall_score,
                    invite_network_score: bundle.invite_network_score,
                    conduct_score: bundle.conduct_score,
                    activity_score: bundle.activity_score,
                    metrics: bundle.metrics,
                    history: Json(history),
                    last_calculated: now,
                    created_at: current.created_at,
                    updated_at: now,
                }
            }
            None => UserReputation {
                user_id,
                overall_score: bundle.overall_score,
                invite_network_score: bundle.invite_network_score,
                conduct_score: bundle.conduct_score,
                activity_score: bundle.activity_score,
                metrics: bundle.metrics,
                history: Json(Vec::new()),
                last_calculated: now,
                created_at: now,
                updated_at: now,
            },
        };

        let saved = self.store.save(&record).await?;

        tracing::info!(
            user_id = %user_id,
            overall_score = saved.overall_score,
            invite_network_score = saved.invite_network_score,
            conduct_score = saved.conduct_score,
            activity_score = saved.activity_score,
            "Reputation recalculated"
        );

        Ok(saved)
    }

    /// Read path: serve the cached record unless the refresh policy says it
    /// is stale (or no record exists), in which case recalculate first.
    ///
    /// When the refresh fails for a transient reason and a cached record
    /// exists, the read degrades to the cached record instead of failing.
    pub async fn get_user_reputation(&self, user_id: Uuid) -> Result<UserReputation> {
        let cached = self.store.find_by_user(user_id).await?;

        if let Some(record) = &cached {
            if !self.policy.is_stale(record, Utc::now()) {
                return Ok(record.clone());
            }
        }

        match self.calculate_user_reputation(user_id).await {
            Ok(record) => Ok(record),
            Err(err @ ReputationError::UserNotFound(_)) => Err(err),
            Err(err) => match cached {
                Some(record) => {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %err,
                        "Refresh failed, serving last cached reputation"
                    );
                    Ok(record)
                }
                None => Err(err),
            },
        }
    }

    /// Recalculate every user sequentially, continue-on-error
    ///
    /// A single user's failure is captured in that user's outcome entry; the
    /// batch always returns one entry per user.
    pub async fn recalculate_all(&self) -> Result<Vec<RecalculationOutcome>> {
        let user_ids = self.users.list_user_ids().await?;
        let mut outcomes = Vec::with_capacity(user_ids.len());

        for user_id in user_ids {
            let result = self.calculate_user_reputation(user_id).await;
            if let Err(err) = &result {
                tracing::error!(
                    user_id = %user_id,
                    error = %err,
                    "Batch recalculation failed for user"
                );
            }
            outcomes.push(RecalculationOutcome { user_id, result });
        }

        Ok(outcomes)
    }

    /// One read pass over the activity collections, plus the invitee overall
    /// scores needed by the quality component
    async fn gather_raw_metrics(&self, user_id: Uuid) -> Result<RawUserMetrics> {
        let invites = self.metrics.invites_sent(user_id).await?;
        let reports = self.metrics.reports_received(user_id).await?;
        let votes = self.metrics.votes_cast(user_id).await?;
        let post_count = self.metrics.post_count(user_id).await?;
        let comment_count = self.metrics.comment_count(user_id).await?;

        let joined_invitees: Vec<Uuid> = invites
            .iter()
            .filter(|i| i.status == InviteStatus::Joined)
            .filter_map(|i| i.invited_user_id)
            .collect();
        let invitee_scores = self.store.overall_scores(&joined_invitees).await?;

        Ok(RawUserMetrics {
            invites,
            reports,
            votes,
            post_count,
            comment_count,
            invitee_scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserInvite, UserRecord, UserReport, Vote};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct SingleUser(UserRecord);

    #[async_trait]
    impl UserDirectory for SingleUser {
        async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>> {
            Ok((self.0.id == user_id).then(|| self.0.clone()))
        }

        async fn list_user_ids(&self) -> Result<Vec<Uuid>> {
            Ok(vec![self.0.id])
        }
    }

    struct NoActivity;

    #[async_trait]
    impl MetricsReader for NoActivity {
        async fn invites_sent(&self, _user_id: Uuid) -> Result<Vec<UserInvite>> {
            Ok(Vec::new())
        }

        async fn reports_received(&self, _user_id: Uuid) -> Result<Vec<UserReport>> {
            Ok(Vec::new())
        }

        async fn votes_cast(&self, _user_id: Uuid) -> Result<Vec<Vote>> {
            Ok(Vec::new())
        }

        async fn post_count(&self, _user_id: Uuid) -> Result<i64> {
            Ok(0)
        }

        async fn comment_count(&self, _user_id: Uuid) -> Result<i64> {
            Ok(0)
        }
    }

    #[derive(Default)]
    struct MemStore(std::sync::Mutex<HashMap<Uuid, UserReputation>>);

    #[async_trait]
    impl ReputationStore for MemStore {
        async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserReputation>> {
            Ok(self.0.lock().unwrap().get(&user_id).cloned())
        }

        async fn save(&self, record: &UserReputation) -> Result<UserReputation> {
            self.0
                .lock()
                .unwrap()
                .insert(record.user_id, record.clone());
            Ok(record.clone())
        }

        async fn overall_scores(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, i32>> {
            let records = self.0.lock().unwrap();
            Ok(user_ids
                .iter()
                .filter_map(|id| records.get(id).map(|r| (*id, r.overall_score)))
                .collect())
        }
    }

    fn service_for(user: UserRecord) -> ReputationService {
        let config = Config {
            database_url: "postgres://unused".to_string(),
            db_max_connections: 1,
            staleness_window_hours: 24,
            metrics_timeout_secs: 5,
            history_max_entries: None,
            report_recalc_delay_ms: 0,
            service_name: "reputation-service".to_string(),
            environment: "test".to_string(),
        };
        ReputationService::new(
            Arc::new(SingleUser(user)),
            Arc::new(NoActivity),
            Arc::new(MemStore::default()),
            &config,
        )
    }

    fn test_user() -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            joined_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_lock_entry_evicted_after_recalculation() {
        let user = test_user();
        let service = service_for(user.clone());

        service.calculate_user_reputation(user.id).await.unwrap();
        assert!(service.user_locks.is_empty());
    }

    #[tokio::test]
    async fn test_lock_table_drains_after_concurrent_recalculations() {
        let user = test_user();
        let service = service_for(user.clone());

        let (first, second) = tokio::join!(
            service.calculate_user_reputation(user.id),
            service.calculate_user_reputation(user.id)
        );
        first.unwrap();
        let second = second.unwrap();

        // Serialized by the per-user lock: one run created the record, the
        // other appended exactly one history entry
        assert_eq!(second.history.0.len(), 1);
        assert!(service.user_locks.is_empty());
    }
}
