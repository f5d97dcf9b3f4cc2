//! User lookups against the identity tables

use crate::error::Result;
use crate::models::UserRecord;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Read access to the user directory
///
/// Users are owned by the identity system; this service only resolves
/// existence + join timestamp and enumerates ids for the batch job.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>>;

    /// All user ids, in join order (stable iteration for the batch job)
    async fn list_user_ids(&self) -> Result<Vec<Uuid>>;
}

pub struct PgUserDirectory {
    pool: Arc<PgPool>,
}

impl PgUserDirectory {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, joined_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(user)
    }

    async fn list_user_ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM users
            ORDER BY joined_at ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(ids)
    }
}
