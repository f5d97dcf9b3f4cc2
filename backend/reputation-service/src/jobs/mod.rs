pub mod recalc_batch;

pub use recalc_batch::{BatchJobStats, RecalcBatchJob};
