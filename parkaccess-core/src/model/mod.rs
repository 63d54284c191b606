//! Data model for park accessibility
//!
//! Contains the walking network, the administrative areas that get scored
//! and the score types produced by the aggregation stages.

pub mod areas;
pub mod scores;
pub mod streets;

pub use areas::{Neighborhood, Park, Tract};
pub use scores::{NeighborhoodScore, Score, TractScore};
pub use streets::network::WalkGraph;
pub use streets::{WalkEdge, WalkNode};
