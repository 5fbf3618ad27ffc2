//! Utility modules for the job digest
//!
//! Time handling lives here because every stage of the pipeline depends on
//! the same reference instant and canonical offset.

pub mod http_client;
pub mod relative_time;
pub mod time;

pub use http_client::StandardHttpClient;
pub use relative_time::{RelativeParse, RelativeResolution, RelativeTimeParser, RelativeUnit};
pub use time::{
    FallbackReason, Normalized, RawTimestamp, Resolution, RunClock, TimeNormalizer,
};
