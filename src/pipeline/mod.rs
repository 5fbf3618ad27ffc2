//! In-memory stages applied to fetched records: filter, then dedupe
//!
//! Both stages are pure: they take a batch, return a new batch in input order
//! and never touch the network or the system clock.

pub mod dedupe;
pub mod filter;

pub use dedupe::{dedupe, Fingerprint};
pub use filter::{filter, FilterStats, RecordFilter, Verdict, RECENCY_WINDOW_HOURS};
