mod bounded;
mod state;

pub use bounded::{ReachedNodes, multi_source_dijkstra};
