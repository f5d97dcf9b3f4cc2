pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::Config;
pub use error::{ReputationError, Result};
pub use models::{
    InviteStatus, RawUserMetrics, ReportReason, ReportSeverity, ReportStatus,
    ReputationHistoryEntry, ReputationMetrics, ScoreBundle, UserInvite, UserRecord,
    UserReport, UserReputation, Vote, VoteType,
};
pub use services::{
    schedule_post_report_recalculation, RecalculationOutcome, RefreshPolicy, ReputationService,
};
