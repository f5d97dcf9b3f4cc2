//! Score functions and aggregation
//!
//! Pure arithmetic over gathered counts: nothing in this module performs I/O
//! or fails. Every bonus is capped with `min(x, cap)` so no single
//! heavy-tailed metric can dominate the bounded range, which keeps the
//! weighted overall score auditable component by component.

use crate::models::{
    InviteStatus, RawUserMetrics, ReportStatus, ReputationMetrics, ScoreBundle, VoteType,
    MAX_ACTIVITY_SCORE, MAX_CONDUCT_SCORE, MAX_INVITE_NETWORK_SCORE,
};
use chrono::{DateTime, Utc};

/// Weight of the invite-network sub-score in the overall score
const INVITE_NETWORK_WEIGHT: f64 = 0.4;
/// Weight of the conduct sub-score
const CONDUCT_WEIGHT: f64 = 0.4;
/// Weight of the activity sub-score
const ACTIVITY_WEIGHT: f64 = 0.2;

/// Neutral conduct baseline before penalties and bonuses
const CONDUCT_BASELINE: i32 = 300;
const RESOLVED_REPORT_PENALTY: i32 = 20;
const PENDING_REPORT_PENALTY: i32 = 10;

/// Invite-network score (0-500)
///
/// Acceptance-rate component (0-200), invitee-quality component (0-200) and
/// a network-size bonus (0-100). A user who never sent an invite scores 0.
pub fn invite_network_score(raw: &RawUserMetrics) -> i32 {
    let total_invites = raw.invites.len();
    if total_invites == 0 {
        return 0;
    }

    let approved = raw
        .invites
        .iter()
        .filter(|i| i.status == InviteStatus::Approved)
        .count();
    let joined: Vec<_> = raw
        .invites
        .iter()
        .filter(|i| i.status == InviteStatus::Joined)
        .collect();

    let acceptance_rate = (approved + joined.len()) as f64 / total_invites as f64;
    let mut score = (acceptance_rate * 200.0).round() as i32;

    // Invitee quality: average over all joined invites. A joined invite whose
    // invitee has no reputation record yet (or no resolvable link) still
    // counts in the denominator and contributes 0.
    if !joined.is_empty() {
        let total_invitee_reputation: i64 = joined
            .iter()
            .filter_map(|i| i.invited_user_id)
            .filter_map(|id| raw.invitee_scores.get(&id))
            .map(|score| *score as i64)
            .sum();
        let average = total_invitee_reputation as f64 / joined.len() as f64;
        score += (average / 1000.0 * 200.0).round() as i32;
    }

    score += ((joined.len() as i32) * 10).min(100);

    score.min(MAX_INVITE_NETWORK_SCORE)
}

/// Conduct score (0-500)
///
/// Neutral baseline of 300, penalized per resolved/pending report received
/// and rewarded for positive voting balance and content creation. Reports in
/// `reviewed` or `dismissed` status carry no penalty.
pub fn conduct_score(raw: &RawUserMetrics) -> i32 {
    let mut score = CONDUCT_BASELINE;

    let resolved = raw
        .reports
        .iter()
        .filter(|r| r.status == ReportStatus::Resolved)
        .count() as i32;
    let pending = raw
        .reports
        .iter()
        .filter(|r| r.status == ReportStatus::Pending)
        .count() as i32;

    score -= resolved * RESOLVED_REPORT_PENALTY;
    score -= pending * PENDING_REPORT_PENALTY;

    let (upvotes, downvotes) = vote_split(raw);
    if upvotes > downvotes {
        score += (((upvotes - downvotes) as i32) * 2).min(100);
    }

    score += ((raw.post_count as i32) * 5).min(50);
    score += ((raw.comment_count as i32) * 2).min(50);

    score.clamp(0, MAX_CONDUCT_SCORE)
}

/// Activity score (0-200)
///
/// Content volume plus a small account-age bonus; fractional days count
/// toward the age bonus before its cap.
pub fn activity_score(raw: &RawUserMetrics, joined_at: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let mut score = 0.0;

    score += f64::min(raw.post_count as f64 * 10.0, 100.0);
    score += f64::min(raw.comment_count as f64 * 5.0, 50.0);
    score += f64::min(raw.votes.len() as f64 * 2.0, 50.0);

    let days_since_joined = (now - joined_at).num_milliseconds().max(0) as f64 / 86_400_000.0;
    score += f64::min(days_since_joined * 0.5, 20.0);

    (score.round() as i32).min(MAX_ACTIVITY_SCORE)
}

/// Weighted overall score (0-1000), 40/40/20
pub fn overall_score(invite_network: i32, conduct: i32, activity: i32) -> i32 {
    (invite_network as f64 * INVITE_NETWORK_WEIGHT
        + conduct as f64 * CONDUCT_WEIGHT
        + activity as f64 * ACTIVITY_WEIGHT)
        .round() as i32
}

/// Run all three score functions and assemble the full bundle
pub fn aggregate(raw: &RawUserMetrics, joined_at: DateTime<Utc>, now: DateTime<Utc>) -> ScoreBundle {
    let invite_network = invite_network_score(raw);
    let conduct = conduct_score(raw);
    let activity = activity_score(raw, joined_at, now);

    ScoreBundle {
        overall_score: overall_score(invite_network, conduct, activity),
        invite_network_score: invite_network,
        conduct_score: conduct,
        activity_score: activity,
        metrics: build_metrics(raw),
    }
}

/// Detailed metrics snapshot (display counts, independent of the weights)
pub fn build_metrics(raw: &RawUserMetrics) -> ReputationMetrics {
    let joined: Vec<_> = raw
        .invites
        .iter()
        .filter(|i| i.status == InviteStatus::Joined)
        .collect();
    let accepted = raw.invites.iter().filter(|i| i.is_accepted()).count() as i64;
    let declined = raw
        .invites
        .iter()
        .filter(|i| i.status == InviteStatus::Declined)
        .count() as i64;

    let average_invitee_reputation = if joined.is_empty() {
        0
    } else {
        let total: i64 = joined
            .iter()
            .filter_map(|i| i.invited_user_id)
            .filter_map(|id| raw.invitee_scores.get(&id))
            .map(|score| *score as i64)
            .sum();
        (total as f64 / joined.len() as f64).round() as i32
    };

    let (upvotes, downvotes) = vote_split(raw);

    ReputationMetrics {
        total_invites_sent: raw.invites.len() as i64,
        total_invites_accepted: accepted,
        total_invites_declined: declined,
        average_invitee_reputation,
        total_reports_received: raw.reports.len() as i64,
        total_reports_resolved: raw
            .reports
            .iter()
            .filter(|r| r.status == ReportStatus::Resolved)
            .count() as i64,
        total_upvotes: upvotes as i64,
        total_downvotes: downvotes as i64,
        total_posts: raw.post_count,
        total_comments: raw.comment_count,
    }
}

fn vote_split(raw: &RawUserMetrics) -> (usize, usize) {
    let upvotes = raw
        .votes
        .iter()
        .filter(|v| v.vote_type == VoteType::Upvote)
        .count();
    let downvotes = raw.votes.len() - upvotes;
    (upvotes, downvotes)
}
