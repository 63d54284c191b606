use std::collections::BinaryHeap;

use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::{WalkingTime, model::WalkGraph};

/// Nodes settled by a bounded search with their minimum walking times
#[derive(Debug, Clone, Default)]
pub struct ReachedNodes {
    /// Minimum walking time from the nearest source, never above the budget
    pub times: HashMap<NodeIndex, WalkingTime>,
    /// Number of edge relaxations that stayed within the budget
    pub edges_within_budget: usize,
}

/// Multi-source Dijkstra over the walking network.
///
/// All `sources` start at cost 0 and share one frontier, so the result is
/// the minimum walking time from whichever source is closest. A branch is
/// cut as soon as its cost exceeds `max_cost`; a node reached at exactly
/// `max_cost` is kept. Sources that are not graph nodes are ignored.
pub fn multi_source_dijkstra(
    graph: &WalkGraph,
    sources: impl IntoIterator<Item = NodeIndex>,
    max_cost: WalkingTime,
) -> ReachedNodes {
    let node_count = graph.node_count();
    let mut distances: HashMap<NodeIndex, WalkingTime> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut edges_within_budget = 0;

    // Every source has distance 0
    for source in sources {
        if source.index() >= node_count {
            log::warn!("Ignoring source {} outside of the walking graph", source.index());
            continue;
        }
        if distances.insert(source, 0.0).is_none() {
            heap.push(State {
                cost: 0.0,
                node: source,
            });
        }
    }

    while let Some(State { cost, node }) = heap.pop() {
        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        // Examine neighbors
        for edge in graph.edges(node) {
            let next = if edge.target() == node {
                edge.source()
            } else {
                edge.target()
            };
            let next_cost = cost + edge.weight().walking_time();

            // Cut the branch once it leaves the budget
            if next_cost > max_cost {
                continue;
            }
            edges_within_budget += 1;

            // Add or update distance if better using Entry API
            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    ReachedNodes {
        times: distances,
        edges_within_budget,
    }
}
