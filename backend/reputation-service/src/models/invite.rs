use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invite lifecycle status with state machine
///
/// `pending -> approved | declined`, and `pending`/`approved` -> `joined`
/// once the invitee actually registers. `joined` and `declined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invite_status", rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Approved,
    Declined,
    Joined,
}

impl InviteStatus {
    pub fn can_transition_to(&self, new_status: InviteStatus) -> bool {
        matches!(
            (self, new_status),
            (InviteStatus::Pending, InviteStatus::Approved)
                | (InviteStatus::Pending, InviteStatus::Declined)
                | (InviteStatus::Pending, InviteStatus::Joined)
                | (InviteStatus::Approved, InviteStatus::Joined)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Approved => "approved",
            InviteStatus::Declined => "declined",
            InviteStatus::Joined => "joined",
        }
    }
}

/// Outbound invitation record from database
///
/// `invited_user_id` is set once the invitee registers (status `joined`);
/// the scorer tolerates a joined invite with a missing link.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserInvite {
    pub id: Uuid,
    pub inviter_id: Uuid,
    pub invited_user_id: Option<Uuid>,
    pub email: String,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserInvite {
    /// Counts toward the acceptance rate (approved or joined)
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, InviteStatus::Approved | InviteStatus::Joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_status_transitions() {
        assert!(InviteStatus::Pending.can_transition_to(InviteStatus::Approved));
        assert!(InviteStatus::Pending.can_transition_to(InviteStatus::Declined));
        assert!(InviteStatus::Pending.can_transition_to(InviteStatus::Joined));
        assert!(InviteStatus::Approved.can_transition_to(InviteStatus::Joined));
        assert!(!InviteStatus::Joined.can_transition_to(InviteStatus::Declined));
        assert!(!InviteStatus::Declined.can_transition_to(InviteStatus::Joined));
        assert!(!InviteStatus::Approved.can_transition_to(InviteStatus::Declined));
    }
}
