//! Raw activity reads feeding the score functions
//!
//! Read-only by contract: zero rows is a valid result, never an error; only
//! storage failure propagates.

use crate::error::Result;
use crate::models::{UserInvite, UserReport, Vote};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait MetricsReader: Send + Sync {
    /// All invites where the user is the inviter
    async fn invites_sent(&self, user_id: Uuid) -> Result<Vec<UserInvite>>;

    /// All reports where the user is the reported party
    async fn reports_received(&self, user_id: Uuid) -> Result<Vec<UserReport>>;

    /// All votes cast by the user
    async fn votes_cast(&self, user_id: Uuid) -> Result<Vec<Vote>>;

    /// Posts attributed to the user (counted only, never materialized)
    async fn post_count(&self, user_id: Uuid) -> Result<i64>;

    /// Comments attributed to the user
    async fn comment_count(&self, user_id: Uuid) -> Result<i64>;
}

pub struct PgMetricsReader {
    pool: Arc<PgPool>,
}

impl PgMetricsReader {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetricsReader for PgMetricsReader {
    async fn invites_sent(&self, user_id: Uuid) -> Result<Vec<UserInvite>> {
        let invites = sqlx::query_as::<_, UserInvite>(
            r#"
            SELECT id, inviter_id, invited_user_id, email, status,
                   created_at, updated_at
            FROM user_invites
            WHERE inviter_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(invites)
    }

    async fn reports_received(&self, user_id: Uuid) -> Result<Vec<UserReport>> {
        let reports = sqlx::query_as::<_, UserReport>(
            r#"
            SELECT id, reporter_id, reported_user_id, reason, description,
                   status, severity, admin_notes, created_at, updated_at
            FROM user_reports
            WHERE reported_user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(reports)
    }

    async fn votes_cast(&self, user_id: Uuid) -> Result<Vec<Vote>> {
        let votes = sqlx::query_as::<_, Vote>(
            r#"
            SELECT id, user_id, post_id, vote_type, created_at
            FROM votes
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(votes)
    }

    async fn post_count(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&*self.pool)
            .await?;

        Ok(count)
    }

    async fn comment_count(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&*self.pool)
            .await?;

        Ok(count)
    }
}
