use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Upper bound of the overall score (weighted 40/40/20 sum of sub-scores)
pub const MAX_OVERALL_SCORE: i32 = 1000;
/// Upper bound of the invite-network sub-score
pub const MAX_INVITE_NETWORK_SCORE: i32 = 500;
/// Upper bound of the conduct sub-score
pub const MAX_CONDUCT_SCORE: i32 = 500;
/// Upper bound of the activity sub-score
pub const MAX_ACTIVITY_SCORE: i32 = 200;

/// Detailed raw-count snapshot stored alongside the scores
///
/// Display data, not scoring state: the score functions derive their own
/// values from the same raw reads. Persisted as flat columns on
/// `user_reputations` so admin queries can filter without unpacking JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReputationMetrics {
    pub total_invites_sent: i64,
    /// Invites that reached `approved` or `joined`
    pub total_invites_accepted: i64,
    pub total_invites_declined: i64,
    /// Rounded mean overall score of joined invitees (0 when none joined)
    pub average_invitee_reputation: i32,
    pub total_reports_received: i64,
    pub total_reports_resolved: i64,
    pub total_upvotes: i64,
    pub total_downvotes: i64,
    pub total_posts: i64,
    pub total_comments: i64,
}

/// Immutable snapshot of the previous top-level scores, appended to the
/// history log every time a recalculation overwrites an existing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationHistoryEntry {
    pub date: DateTime<Utc>,
    pub overall_score: i32,
    pub invite_network_score: i32,
    pub conduct_score: i32,
    pub activity_score: i32,
    pub reason: String,
}

/// Persisted reputation aggregate, one row per user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserReputation {
    pub user_id: Uuid,
    pub overall_score: i32,
    pub invite_network_score: i32,
    pub conduct_score: i32,
    pub activity_score: i32,
    #[sqlx(flatten)]
    pub metrics: ReputationMetrics,
    pub history: Json<Vec<ReputationHistoryEntry>>,
    pub last_calculated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserReputation {
    /// Snapshot the current top-level scores into a history entry
    pub fn history_entry(&self, reason: &str, at: DateTime<Utc>) -> ReputationHistoryEntry {
        ReputationHistoryEntry {
            date: at,
            overall_score: self.overall_score,
            invite_network_score: self.invite_network_score,
            conduct_score: self.conduct_score,
            activity_score: self.activity_score,
            reason: reason.to_string(),
        }
    }
}

/// Fresh calculation output handed from the aggregator to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBundle {
    pub overall_score: i32,
    pub invite_network_score: i32,
    pub conduct_score: i32,
    pub activity_score: i32,
    pub metrics: ReputationMetrics,
}

/// Everything the score functions need, gathered in one read pass
///
/// `invitee_scores` maps invited-user id to that user's current overall
/// score; joined invitees without a record are absent (and score as 0).
#[derive(Debug, Clone, Default)]
pub struct RawUserMetrics {
    pub invites: Vec<super::UserInvite>,
    pub reports: Vec<super::UserReport>,
    pub votes: Vec<super::Vote>,
    pub post_count: i64,
    pub comment_count: i64,
    pub invitee_scores: std::collections::HashMap<Uuid, i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_round_trips_through_json() {
        let entry = ReputationHistoryEntry {
            date: Utc::now(),
            overall_score: 412,
            invite_network_score: 320,
            conduct_score: 278,
            activity_score: 150,
            reason: "Periodic recalculation".to_string(),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["overall_score"], 412);
        assert_eq!(value["reason"], "Periodic recalculation");

        let back: ReputationHistoryEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_history_entry_snapshots_current_scores() {
        let now = Utc::now();
        let record = UserReputation {
            user_id: Uuid::new_v4(),
            overall_score: 500,
            invite_network_score: 400,
            conduct_score: 450,
            activity_score: 180,
            metrics: ReputationMetrics::default(),
            history: Json(Vec::new()),
            last_calculated: now,
            created_at: now,
            updated_at: now,
        };

        let entry = record.history_entry("Periodic recalculation", now);
        assert_eq!(entry.overall_score, 500);
        assert_eq!(entry.invite_network_score, 400);
        assert_eq!(entry.conduct_score, 450);
        assert_eq!(entry.activity_score, 180);
        assert_eq!(entry.date, now);
    }
}
