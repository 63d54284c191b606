//! Walking graph with spatial indices over its nodes and edges

use geo::{Coord, Distance, Euclidean, Line, Point};
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use rstar::primitives::{GeomWithData, Line as IndexedLine};
use rstar::{AABB, RTree};

use super::components::{WalkEdge, WalkNode};

/// Graph node position stored in the node R-tree
pub type IndexedPoint = GeomWithData<Point<f64>, NodeIndex>;

/// Graph edge segment stored in the edge R-tree
pub type IndexedSegment = GeomWithData<IndexedLine<Point<f64>>, EdgeIndex>;

/// Undirected walking graph. Disconnected components are allowed.
#[derive(Debug, Clone, Default)]
pub struct WalkGraph {
    pub graph: UnGraph<WalkNode, WalkEdge>,
    node_tree: RTree<IndexedPoint>,
    edge_tree: RTree<IndexedSegment>,
}

impl WalkGraph {
    /// Wraps a built graph and bulk loads both spatial indices
    pub fn new(graph: UnGraph<WalkNode, WalkEdge>) -> Self {
        let nodes = graph
            .node_indices()
            .map(|idx| IndexedPoint::new(graph[idx].geometry, idx))
            .collect();

        let segments = graph
            .edge_indices()
            .filter_map(|edge| {
                let (a, b) = graph.edge_endpoints(edge)?;
                let line = IndexedLine::new(graph[a].geometry, graph[b].geometry);
                Some(IndexedSegment::new(line, edge))
            })
            .collect();

        Self {
            node_tree: RTree::bulk_load(nodes),
            edge_tree: RTree::bulk_load(segments),
            graph,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_point(&self, node: NodeIndex) -> Option<Point<f64>> {
        self.graph.node_weight(node).map(|n| n.geometry)
    }

    /// Edges incident to `node`
    pub fn edges(&self, node: NodeIndex) -> petgraph::graph::Edges<'_, WalkEdge, petgraph::Undirected> {
        self.graph.edges(node)
    }

    /// Nearest graph node to `point` no further than `max_distance`.
    /// Returns the node and its planar distance.
    pub fn nearest_node(&self, point: &Point<f64>, max_distance: f64) -> Option<(NodeIndex, f64)> {
        let nearest = self.node_tree.nearest_neighbor(point)?;
        let distance = Euclidean.distance(*nearest.geom(), *point);
        (distance <= max_distance).then_some((nearest.data, distance))
    }

    /// Points where `segment` crosses or touches graph edges
    pub fn edge_crossings(&self, segment: Line<f64>) -> Vec<Coord<f64>> {
        let envelope = AABB::from_corners(Point::from(segment.start), Point::from(segment.end));

        self.edge_tree
            .locate_in_envelope_intersecting(&envelope)
            .filter_map(|indexed| {
                let edge = indexed.geom();
                let edge_line = Line::new(edge.from.0, edge.to.0);
                match line_intersection(segment, edge_line)? {
                    LineIntersection::SinglePoint { intersection, .. } => Some(intersection),
                    // Boundary runs along the street, its start is a fine access point
                    LineIntersection::Collinear { intersection } => Some(intersection.start),
                }
            })
            .collect()
    }
}
