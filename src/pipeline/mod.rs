//! Pipeline entry points for watcher operations.
//!
//! - `run_watch`: Gate on credentials, then fetch, diff, persist and notify
//! - `calculate_diff`: Find listings not seen before

pub mod diff;
pub mod watch;

pub use diff::{DiffResult, calculate_diff};
pub use watch::{RunOutcome, RunReport, Watcher, collect_listings, run_watch};
