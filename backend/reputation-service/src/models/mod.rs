pub mod activity;
pub mod invite;
pub mod report;
pub mod reputation;

pub use activity::*;
pub use invite::*;
pub use report::*;
pub use reputation::*;
