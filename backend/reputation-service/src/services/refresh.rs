//! Staleness policy for reputation reads

use crate::models::UserReputation;
use chrono::{DateTime, Duration, Utc};

/// Decides whether a cached reputation record may be served as-is
///
/// A record is stale once `now - last_calculated` exceeds the window
/// (24 hours by default). Explicit recalculation requests and post-report
/// triggers bypass this policy entirely.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    window: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::new(24)
    }
}

impl RefreshPolicy {
    pub fn new(window_hours: i64) -> Self {
        Self {
            window: Duration::hours(window_hours),
        }
    }

    pub fn is_stale(&self, record: &UserReputation, now: DateTime<Utc>) -> bool {
        now - record.last_calculated > self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReputationMetrics;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn record_calculated_at(last_calculated: DateTime<Utc>) -> UserReputation {
        UserReputation {
            user_id: Uuid::new_v4(),
            overall_score: 120,
            invite_network_score: 0,
            conduct_score: 300,
            activity_score: 0,
            metrics: ReputationMetrics::default(),
            history: Json(Vec::new()),
            last_calculated,
            created_at: last_calculated,
            updated_at: last_calculated,
        }
    }

    #[test]
    fn test_fresh_record_is_served() {
        let now = Utc::now();
        let record = record_calculated_at(now - Duration::minutes(1));
        assert!(!RefreshPolicy::default().is_stale(&record, now));
    }

    #[test]
    fn test_record_older_than_window_is_stale() {
        let now = Utc::now();
        let record = record_calculated_at(now - Duration::hours(25));
        assert!(RefreshPolicy::default().is_stale(&record, now));
    }

    #[test]
    fn test_window_boundary_is_not_stale() {
        let now = Utc::now();
        let record = record_calculated_at(now - Duration::hours(24));
        assert!(!RefreshPolicy::default().is_stale(&record, now));
    }

    #[test]
    fn test_custom_window() {
        let now = Utc::now();
        let record = record_calculated_at(now - Duration::hours(2));
        assert!(RefreshPolicy::new(1).is_stale(&record, now));
        assert!(!RefreshPolicy::new(3).is_stale(&record, now));
    }
}
