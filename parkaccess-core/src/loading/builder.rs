use geo::{BoundingRect, Coord, Distance, Euclidean, Intersects, LineString, MultiPolygon, Point};
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use log::{info, warn};
use petgraph::graph::{NodeIndex, UnGraph};

use crate::model::{WalkEdge, WalkGraph, WalkNode};

/// Coordinates closer than this are treated as one graph node
const NODE_MERGE_PRECISION: f64 = 1e-6;

/// Builds the walking graph from street geometries clipped to `boundary`.
///
/// Every vertex becomes a node, consecutive vertices are joined by an
/// undirected edge costing `length / walking_speed` seconds. A segment is
/// kept when both of its endpoints touch the boundary. An input with nothing
/// left after clipping yields an empty graph.
pub fn build_walk_graph(
    streets: &[LineString<f64>],
    boundary: &MultiPolygon<f64>,
    walking_speed: f64,
) -> WalkGraph {
    let mut graph: UnGraph<WalkNode, WalkEdge> = UnGraph::new_undirected();
    let Some(extent) = boundary.bounding_rect() else {
        warn!("Study boundary is empty, the walking graph has no streets");
        return WalkGraph::new(graph);
    };
    // Street vertices are shared by several segments, test each one once
    let mut inside: HashMap<(i64, i64), bool> = HashMap::new();
    let mut is_inside = |coord: Coord<f64>| {
        *inside.entry(merge_key(coord)).or_insert_with(|| {
            extent.intersects(&coord) && Point::from(coord).intersects(boundary)
        })
    };
    let mut node_ids: HashMap<(i64, i64), NodeIndex> = HashMap::new();
    let mut edge_ids: HashMap<(NodeIndex, NodeIndex), petgraph::graph::EdgeIndex> = HashMap::new();
    let mut dropped_outside = 0usize;
    let mut dropped_degenerate = 0usize;

    for line in streets {
        for segment in line.lines() {
            if !is_inside(segment.start) || !is_inside(segment.end) {
                dropped_outside += 1;
                continue;
            }

            let a = node_for(&mut graph, &mut node_ids, segment.start);
            let b = node_for(&mut graph, &mut node_ids, segment.end);
            if a == b {
                dropped_degenerate += 1;
                continue;
            }

            let length = Euclidean.distance(Point::from(segment.start), Point::from(segment.end));
            let cost = length / walking_speed;
            if !(cost > 0.0 && cost.is_finite()) {
                dropped_degenerate += 1;
                continue;
            }

            let key = if a < b { (a, b) } else { (b, a) };
            match edge_ids.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(graph.add_edge(a, b, WalkEdge { cost, length }));
                }
                // Parallel ways between the same vertices keep the cheapest
                Entry::Occupied(entry) => {
                    let existing = &mut graph[*entry.get()];
                    if cost < existing.cost {
                        *existing = WalkEdge { cost, length };
                    }
                }
            }
        }
    }

    if dropped_degenerate > 0 {
        log::debug!("Dropped {dropped_degenerate} zero-length segments");
    }
    info!(
        "Walking graph: {} nodes, {} edges ({dropped_outside} segments outside the boundary)",
        graph.node_count(),
        graph.edge_count()
    );
    if graph.node_count() == 0 {
        warn!("Walking graph is empty after clipping to the study boundary");
    }

    WalkGraph::new(graph)
}

fn node_for(
    graph: &mut UnGraph<WalkNode, WalkEdge>,
    node_ids: &mut HashMap<(i64, i64), NodeIndex>,
    coord: Coord<f64>,
) -> NodeIndex {
    *node_ids.entry(merge_key(coord)).or_insert_with(|| {
        graph.add_node(WalkNode {
            geometry: Point::from(coord),
        })
    })
}

#[allow(clippy::cast_possible_truncation)]
fn merge_key(coord: Coord<f64>) -> (i64, i64) {
    (
        (coord.x / NODE_MERGE_PRECISION).round() as i64,
        (coord.y / NODE_MERGE_PRECISION).round() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};

    fn square(size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: size, y: 0.0),
            (x: size, y: size),
            (x: 0.0, y: size),
        ]])
    }

    #[test]
    fn edge_cost_is_length_over_speed() {
        let streets = vec![line_string![(x: 0.0, y: 0.0), (x: 140.0, y: 0.0)]];
        let graph = build_walk_graph(&streets, &square(1000.0), 1.4);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.graph.edge_weights().next().unwrap();
        assert!((edge.cost - 100.0).abs() < 1e-9);
        assert!((edge.length - 140.0).abs() < 1e-9);
    }

    #[test]
    fn shared_vertices_become_one_node() {
        let streets = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 10.0, y: 0.0), (x: 10.0, y: 10.0)],
        ];
        let graph = build_walk_graph(&streets, &square(100.0), 1.4);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn edges_are_walkable_both_ways() {
        let streets = vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]];
        let graph = build_walk_graph(&streets, &square(100.0), 1.4);
        for node in graph.graph.node_indices() {
            assert_eq!(graph.edges(node).count(), 1);
        }
    }

    #[test]
    fn zero_length_segments_are_dropped() {
        let streets = vec![line_string![
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 0.0),
        ]];
        let graph = build_walk_graph(&streets, &square(100.0), 1.4);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.graph.edge_weights().all(|e| e.cost > 0.0));
    }

    #[test]
    fn parallel_segments_keep_the_cheapest() {
        let streets = vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 10.0, y: 0.0), (x: 0.0, y: 0.0)],
        ];
        let graph = build_walk_graph(&streets, &square(100.0), 1.4);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn clipping_everything_away_gives_an_empty_graph() {
        let streets = vec![line_string![(x: 500.0, y: 500.0), (x: 600.0, y: 500.0)]];
        let graph = build_walk_graph(&streets, &square(100.0), 1.4);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn concave_boundary_drops_the_notch() {
        // L-shaped study area, the square 50..100 x 50..100 is cut out
        let boundary = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 50.0),
            (x: 50.0, y: 50.0),
            (x: 50.0, y: 100.0),
            (x: 0.0, y: 100.0),
        ]]);
        let streets = vec![
            line_string![(x: 10.0, y: 10.0), (x: 90.0, y: 10.0)],
            // both ends inside the bounding box, neither inside the L
            line_string![(x: 60.0, y: 60.0), (x: 90.0, y: 90.0)],
            line_string![(x: 10.0, y: 90.0), (x: 70.0, y: 90.0)],
            line_string![(x: 5000.0, y: 5000.0), (x: 5100.0, y: 5000.0)],
        ];
        let graph = build_walk_graph(&streets, &boundary, 1.4);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn empty_boundary_gives_an_empty_graph() {
        let streets = vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]];
        let graph = build_walk_graph(&streets, &MultiPolygon::new(vec![]), 1.4);
        assert!(graph.is_empty());
    }

    #[test]
    fn segments_leaving_the_boundary_are_clipped() {
        let streets = vec![line_string![
            (x: 10.0, y: 10.0),
            (x: 50.0, y: 10.0),
            (x: 150.0, y: 10.0),
        ]];
        let graph = build_walk_graph(&streets, &square(100.0), 1.4);
        assert_eq!(graph.edge_count(), 1);
    }
}
