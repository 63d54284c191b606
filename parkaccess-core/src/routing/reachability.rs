//! Per-park walking reachability within the time budget

use std::collections::BTreeMap;

use fixedbitset::FixedBitSet;
use geo::Point;
use log::{debug, info};
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use super::dijkstra::multi_source_dijkstra;
use crate::{WalkingTime, loading::ParkEntrances, model::WalkGraph};

/// Graph nodes a park's visitors can walk to within the budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilitySet {
    pub park_id: String,
    nodes: FixedBitSet,
}

impl ReachabilitySet {
    pub fn empty(park_id: impl Into<String>, node_count: usize) -> Self {
        Self {
            park_id: park_id.into(),
            nodes: FixedBitSet::with_capacity(node_count),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_clear()
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.nodes.contains(node.index())
    }

    /// Reached nodes in index order
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.ones().map(NodeIndex::new)
    }

    /// Coordinates of the reached nodes
    pub fn points(&self, graph: &WalkGraph) -> Vec<Point<f64>> {
        self.nodes()
            .filter_map(|node| graph.node_point(node))
            .collect()
    }
}

/// Reachability of a single park, seeded from all of its entrances at once.
///
/// A search that cannot relax a single edge within the budget covers no
/// walkable ground and yields an empty set, as does a park without entrances.
pub fn park_reachability(
    graph: &WalkGraph,
    entrances: &ParkEntrances,
    budget: WalkingTime,
) -> ReachabilitySet {
    let mut set = ReachabilitySet::empty(entrances.park_id.clone(), graph.node_count());
    if entrances.is_empty() {
        return set;
    }

    let reached = multi_source_dijkstra(graph, entrances.nodes.iter().copied(), budget);
    if reached.edges_within_budget == 0 {
        debug!(
            "Park '{}': no edge walkable within {budget} s from its entrances",
            entrances.park_id
        );
        return set;
    }

    for node in reached.times.keys() {
        set.nodes.insert(node.index());
    }
    set
}

/// Reachability for every park.
///
/// Parks are independent of each other and are processed in parallel on the
/// current rayon pool; the result is keyed and ordered by park id.
pub fn compute_reachability(
    graph: &WalkGraph,
    entrances: &BTreeMap<String, ParkEntrances>,
    budget: WalkingTime,
) -> BTreeMap<String, ReachabilitySet> {
    info!(
        "Computing {budget} s walking reachability for {} parks",
        entrances.len()
    );

    let result: BTreeMap<String, ReachabilitySet> = entrances
        .par_iter()
        .map(|(park_id, park_entrances)| {
            (
                park_id.clone(),
                park_reachability(graph, park_entrances, budget),
            )
        })
        .collect();

    let unreachable = result.values().filter(|set| set.is_empty()).count();
    info!("Reachability done, {unreachable} parks reach no walkable ground");
    result
}
