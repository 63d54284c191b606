use std::collections::{BTreeMap, BTreeSet};

use geo::{Coord, Distance, Euclidean, Line, LineString, Point};
use log::{debug, info, warn};
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use crate::model::{Park, WalkGraph};

/// Graph nodes through which a park is entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkEntrances {
    pub park_id: String,
    pub nodes: BTreeSet<NodeIndex>,
}

impl ParkEntrances {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Samples entrance nodes for every park.
///
/// Access points are the places where a park boundary crosses or touches a
/// graph edge, plus points spaced `spacing` apart along every boundary ring.
/// Each access point is snapped to its nearest node within `max_snap_distance`;
/// points with no node in range are dropped and duplicates collapse.
pub fn sample_entrances(
    graph: &WalkGraph,
    parks: &[Park],
    max_snap_distance: f64,
    spacing: f64,
) -> BTreeMap<String, ParkEntrances> {
    let entrances: BTreeMap<String, ParkEntrances> = parks
        .par_iter()
        .map(|park| {
            let entrances = park_entrances(graph, park, max_snap_distance, spacing);
            (park.id.clone(), entrances)
        })
        .collect();

    let unreachable = entrances.values().filter(|e| e.is_empty()).count();
    info!(
        "Sampled entrances for {} parks, {unreachable} without any entrance",
        entrances.len()
    );

    entrances
}

/// Entrance nodes of a single park
pub fn park_entrances(
    graph: &WalkGraph,
    park: &Park,
    max_snap_distance: f64,
    spacing: f64,
) -> ParkEntrances {
    let mut nodes = BTreeSet::new();

    for ring in park
        .geometry
        .iter()
        .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
    {
        for point in access_points(graph, ring, spacing) {
            if let Some((node, _)) = graph.nearest_node(&point, max_snap_distance) {
                nodes.insert(node);
            }
        }
    }

    if nodes.is_empty() {
        warn!(
            "Park '{}' ({}) has no street node within {max_snap_distance} m of its boundary",
            park.name, park.id
        );
    } else {
        debug!("Park '{}' has {} entrance nodes", park.id, nodes.len());
    }

    ParkEntrances {
        park_id: park.id.clone(),
        nodes,
    }
}

fn access_points(graph: &WalkGraph, ring: &LineString<f64>, spacing: f64) -> Vec<Point<f64>> {
    let mut points = Vec::new();
    for segment in ring.lines() {
        points.extend(graph.edge_crossings(segment).into_iter().map(Point::from));
        points.extend(densify(segment, spacing).into_iter().map(Point::from));
    }
    points
}

/// Start of the segment and evenly spaced points along it, no two further
/// apart than `spacing`. The end is left to the next segment of the ring.
fn densify(segment: Line<f64>, spacing: f64) -> Vec<Coord<f64>> {
    let length = Euclidean.distance(Point::from(segment.start), Point::from(segment.end));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = (length / spacing).ceil().max(1.0) as usize;
    let delta = segment.delta();

    (0..steps)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / steps as f64;
            Coord {
                x: segment.start.x + delta.x * t,
                y: segment.start.y + delta.y * t,
            }
        })
        .collect()
}
