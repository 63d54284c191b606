//! Walking accessibility of residential land to public parks.
//!
//! The pipeline builds a walking graph from a street network, samples park
//! entrances on it, runs a bounded multi-source Dijkstra per park, turns the
//! reached nodes into isochrone polygons and aggregates their coverage into
//! tract and neighborhood scores.

pub mod aggregate;
pub mod algo;
mod error;
pub mod loading;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod prelude;
pub mod routing;

pub use error::Error;

/// Walking time in seconds
pub type WalkingTime = f64;

/// Index of a node in the walking graph
pub type WalkNodeId = petgraph::graph::NodeIndex;

/// Nominal walking speed in metres per second
pub const DEFAULT_WALKING_SPEED: f64 = 1.4;

/// Fifteen minutes, in seconds
pub const DEFAULT_TIME_BUDGET: WalkingTime = 900.0;

/// Maximum distance in metres between a park access point and its entrance node
pub const DEFAULT_MAX_SNAP_DISTANCE: f64 = 50.0;

/// Spacing in metres of points sampled along park boundaries
pub const DEFAULT_ENTRANCE_SPACING: f64 = 25.0;

/// Concavity of isochrone hulls, lower values hug the points tighter
pub const DEFAULT_HULL_CONCAVITY: f64 = 2.0;

/// Neighborhoods scoring below this are flagged as underserved
pub const DEFAULT_UNDERSERVED_THRESHOLD: f64 = 50.0;
