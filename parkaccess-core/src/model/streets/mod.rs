//! Pedestrian network model

pub mod components;
pub mod network;

pub use components::{WalkEdge, WalkNode};
pub use network::{IndexedPoint, IndexedSegment, WalkGraph};
