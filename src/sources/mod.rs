//! Job source handlers
//!
//! Each supported board API (Greenhouse, Lever, Ashby) and the search
//! aggregator has a handler implementing [`JobSource`]. Handlers turn vendor
//! payloads into [`JobRecord`](crate::models::JobRecord)s through pure
//! `parse_*` functions, so payload handling is testable without a network.

pub mod ashby;
pub mod factory;
pub mod greenhouse;
pub mod lever;
pub mod search;
pub mod traits;

pub use ashby::{parse_ashby, AshbyBoard, AshbySource};
pub use factory::SourceFactory;
pub use greenhouse::{parse_greenhouse, GreenhouseBoard, GreenhouseSource};
pub use lever::{parse_lever, LeverPosting, LeverSource};
pub use search::{parse_search, SearchResponse, SearchSource};
pub use traits::{FetchContext, JobSource};
