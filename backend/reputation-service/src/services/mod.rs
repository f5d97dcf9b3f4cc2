pub mod background;
pub mod calculator;
pub mod refresh;
pub mod scoring;

pub use background::schedule_post_report_recalculation;
pub use calculator::{RecalculationOutcome, ReputationService, RECALCULATION_REASON};
pub use refresh::RefreshPolicy;
