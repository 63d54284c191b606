//! Aggregation of park coverage into tract and neighborhood scores

pub mod neighborhoods;
pub mod summary;
pub mod tracts;

pub use neighborhoods::{resolve_constituents, score_neighborhoods, weighted_score};
pub use summary::{Summary, summarize};
pub use tracts::{Coverage, score_tract, score_tracts};
