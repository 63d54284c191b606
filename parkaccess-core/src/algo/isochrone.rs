//! Reconstruction of isochrone polygons from reached graph nodes.
//!
//! A buffer around every reached node ignores the street topology and a
//! convex hull bridges water and ridges the network walks around, so the
//! coverage area is the concave hull of the reached node coordinates.

use std::collections::BTreeMap;

use geo::Polygon;
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use super::geometry::GeometryOps;
use crate::{model::WalkGraph, routing::ReachabilitySet};

/// Whether the reached points were enough to form a polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Ok,
    /// Fewer than three distinct points, or all of them on one line
    LowConfidence,
}

/// Walking coverage polygon of one park
#[derive(Debug, Clone)]
pub struct Isochrone {
    pub park_id: String,
    pub polygon: Option<Polygon<f64>>,
    pub confidence: Confidence,
    /// Number of reached nodes the polygon was built from
    pub point_count: usize,
}

impl Isochrone {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::LowConfidence
    }
}

/// Builds the isochrone polygon of a single park
pub fn reconstruct_isochrone(
    graph: &WalkGraph,
    reachable: &ReachabilitySet,
    ops: &dyn GeometryOps,
) -> Isochrone {
    let points = reachable.points(graph);
    let polygon = ops.hull(&points);

    if polygon.is_none() {
        debug!(
            "Park '{}': {} reached nodes do not form a polygon",
            reachable.park_id,
            points.len()
        );
    }

    Isochrone {
        park_id: reachable.park_id.clone(),
        confidence: if polygon.is_some() {
            Confidence::Ok
        } else {
            Confidence::LowConfidence
        },
        polygon,
        point_count: points.len(),
    }
}

/// Builds isochrones for all parks in parallel, keyed by park id
pub fn reconstruct_isochrones(
    graph: &WalkGraph,
    reachability: &BTreeMap<String, ReachabilitySet>,
    ops: &dyn GeometryOps,
) -> BTreeMap<String, Isochrone> {
    let isochrones: BTreeMap<String, Isochrone> = reachability
        .par_iter()
        .map(|(park_id, set)| (park_id.clone(), reconstruct_isochrone(graph, set, ops)))
        .collect();

    let low = isochrones.values().filter(|i| i.is_low_confidence()).count();
    info!(
        "Built {} isochrone polygons, {low} parks flagged low confidence",
        isochrones.len() - low
    );
    isochrones
}

/// Polygons of all isochrones that have one, in park id order
pub fn isochrone_polygons(isochrones: &BTreeMap<String, Isochrone>) -> Vec<Polygon<f64>> {
    isochrones
        .values()
        .filter_map(|i| i.polygon.clone())
        .collect()
}
