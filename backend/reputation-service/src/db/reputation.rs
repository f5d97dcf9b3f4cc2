//! Persistence for the reputation aggregate

use crate::error::Result;
use crate::models::UserReputation;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Load/store access to `user_reputations`
///
/// The calculator owns the load-append-overwrite sequence; the store only
/// promises one write per `save` (create or update).
#[async_trait]
pub trait ReputationStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserReputation>>;

    /// Persist the record, creating or replacing the row for its user.
    /// `created_at` of an existing row is preserved.
    async fn save(&self, record: &UserReputation) -> Result<UserReputation>;

    /// Current overall scores for the given users; absent records are simply
    /// missing from the map (the invitee-quality average treats them as 0)
    async fn overall_scores(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, i32>>;
}

pub struct PgReputationStore {
    pool: Arc<PgPool>,
}

impl PgReputationStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

const REPUTATION_COLUMNS: &str = r#"user_id, overall_score, invite_network_score, conduct_score,
       activity_score, total_invites_sent, total_invites_accepted,
       total_invites_declined, average_invitee_reputation,
       total_reports_received, total_reports_resolved, total_upvotes,
       total_downvotes, total_posts, total_comments, history,
       last_calculated, created_at, updated_at"#;

#[async_trait]
impl ReputationStore for PgReputationStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserReputation>> {
        let record = sqlx::query_as::<_, UserReputation>(&format!(
            "SELECT {REPUTATION_COLUMNS} FROM user_reputations WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(record)
    }

    async fn save(&self, record: &UserReputation) -> Result<UserReputation> {
        let saved = sqlx::query_as::<_, UserReputation>(&format!(
            r#"
            INSERT INTO user_reputations (
                user_id, overall_score, invite_network_score, conduct_score,
                activity_score, total_invites_sent, total_invites_accepted,
                total_invites_declined, average_invitee_reputation,
                total_reports_received, total_reports_resolved, total_upvotes,
                total_downvotes, total_posts, total_comments, history,
                last_calculated, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (user_id) DO UPDATE SET
                overall_score = EXCLUDED.overall_score,
                invite_network_score = EXCLUDED.invite_network_score,
                conduct_score = EXCLUDED.conduct_score,
                activity_score = EXCLUDED.activity_score,
                total_invites_sent = EXCLUDED.total_invites_sent,
                total_invites_accepted = EXCLUDED.total_invites_accepted,
                total_invites_declined = EXCLUDED.total_invites_declined,
                average_invitee_reputation = EXCLUDED.average_invitee_reputation,
                total_reports_received = EXCLUDED.total_reports_received,
                total_reports_resolved = EXCLUDED.total_reports_resolved,
                total_upvotes = EXCLUDED.total_upvotes,
                total_downvotes = EXCLUDED.total_downvotes,
                total_posts = EXCLUDED.total_posts,
                total_comments = EXCLUDED.total_comments,
                history = EXCLUDED.history,
                last_calculated = EXCLUDED.last_calculated,
                updated_at = EXCLUDED.updated_at
            RETURNING {REPUTATION_COLUMNS}
            "#
        ))
        .bind(record.user_id)
        .bind(record.overall_score)
        .bind(record.invite_network_score)
        .bind(record.conduct_score)
        .bind(record.activity_score)
        .bind(record.metrics.total_invites_sent)
        .bind(record.metrics.total_invites_accepted)
        .bind(record.metrics.total_invites_declined)
        .bind(record.metrics.average_invitee_reputation)
        .bind(record.metrics.total_reports_received)
        .bind(record.metrics.total_reports_resolved)
        .bind(record.metrics.total_upvotes)
        .bind(record.metrics.total_downvotes)
        .bind(record.metrics.total_posts)
        .bind(record.metrics.total_comments)
        .bind(&record.history)
        .bind(record.last_calculated)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&*self.pool)
        .await?;

        tracing::info!(
            user_id = %record.user_id,
            overall_score = record.overall_score,
            "Reputation record saved"
        );

        Ok(saved)
    }

    async fn overall_scores(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, i32>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i32)>(
            r#"
            SELECT user_id, overall_score
            FROM user_reputations
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
