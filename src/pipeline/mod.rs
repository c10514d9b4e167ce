//! Pipeline entry points for aggregation runs.
//!
//! - `run_fetch`: fetch cycles for the active sources, fanned out
//! - `FetchJob` / `RetryPolicy`: the retryable per-source unit of work

pub mod fetch;
pub mod job;

pub use fetch::{FetchDeps, FetchSummary, SourceOutcome, run_fetch};
pub use job::{FetchJob, RetryDecision, RetryPolicy, decide, run_with_retry};
