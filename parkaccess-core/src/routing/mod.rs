//! Walking reachability from park entrances

pub mod dijkstra;
pub mod reachability;

pub use dijkstra::{ReachedNodes, multi_source_dijkstra};
pub use reachability::{ReachabilitySet, compute_reachability, park_reachability};
