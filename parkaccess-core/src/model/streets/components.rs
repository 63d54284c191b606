//! Walking graph components - nodes and edges

use geo::Point;

use crate::WalkingTime;

/// Walking graph node, an intersection or a path vertex
#[derive(Debug, Clone)]
pub struct WalkNode {
    /// Planar node coordinates
    pub geometry: Point<f64>,
}

/// Walking graph edge (path segment)
#[derive(Debug, Clone)]
pub struct WalkEdge {
    /// Pedestrian crossing time in seconds, always positive
    pub cost: WalkingTime,
    /// Planar segment length in metres
    pub length: f64,
}

impl WalkEdge {
    pub fn walking_time(&self) -> WalkingTime {
        self.cost
    }
}
