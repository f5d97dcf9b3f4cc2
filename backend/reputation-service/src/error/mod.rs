use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Metrics gathering timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReputationError {
    /// Whether the caller (or a background scheduler) may retry
    ///
    /// Storage failures and timeouts are transient; a missing user or a bad
    /// configuration will not fix itself.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReputationError::Database(_) | ReputationError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReputationError>;
