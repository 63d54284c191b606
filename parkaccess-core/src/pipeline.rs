//! Orchestration of one accessibility run over a loaded input snapshot

use std::collections::BTreeMap;

use log::{info, warn};

use crate::{
    Error,
    aggregate::{Coverage, Summary, score_neighborhoods, score_tracts, summarize},
    algo::{ConcaveHullOps, GeometryOps, Isochrone, isochrone::isochrone_polygons, reconstruct_isochrones},
    loading::{InputData, ParkEntrances, PipelineConfig, build_walk_graph, sample_entrances},
    model::{NeighborhoodScore, TractScore},
    routing::{ReachabilitySet, compute_reachability},
};

/// Everything one run computes. Produced in full or not at all.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub entrances: BTreeMap<String, ParkEntrances>,
    pub reachability: BTreeMap<String, ReachabilitySet>,
    pub isochrones: BTreeMap<String, Isochrone>,
    pub tract_scores: BTreeMap<String, TractScore>,
    pub neighborhood_scores: BTreeMap<String, NeighborhoodScore>,
    pub summary: Summary,
}

/// Runs every stage on a bounded worker pool, each stage reading only the
/// immutable results of the stages before it.
///
/// # Errors
///
/// Returns an error for an invalid configuration, an empty walking graph
/// (unless `allow_empty_graph` is set) or a neighborhood listing an unknown
/// tract.
pub fn run_pipeline(inputs: &InputData, config: &PipelineConfig) -> Result<PipelineOutput, Error> {
    config.validate()?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(workers) = config.workers {
        builder = builder.num_threads(workers);
    }
    let pool = builder
        .build()
        .map_err(|e| Error::WorkerPool(e.to_string()))?;
    info!("Running accessibility pipeline on {} workers", pool.current_num_threads());

    let ops = ConcaveHullOps::new(config.hull_concavity);
    pool.install(|| run_stages(inputs, config, &ops))
}

fn run_stages(
    inputs: &InputData,
    config: &PipelineConfig,
    ops: &dyn GeometryOps,
) -> Result<PipelineOutput, Error> {
    let graph = build_walk_graph(&inputs.streets, &inputs.boundary, config.walking_speed_mps);
    if graph.is_empty() {
        if config.allow_empty_graph {
            warn!("Walking graph is empty, every tract will score zero");
        } else {
            return Err(Error::EmptyGraph);
        }
    }

    let entrances = sample_entrances(
        &graph,
        &inputs.parks,
        config.max_snap_distance_m,
        config.entrance_spacing_m,
    );
    let reachability = compute_reachability(&graph, &entrances, config.time_budget_s);
    let isochrones = reconstruct_isochrones(&graph, &reachability, ops);

    info!("Building union of all park isochrones");
    let coverage = Coverage::from_isochrones(&isochrone_polygons(&isochrones), ops);
    let tract_scores = score_tracts(&inputs.tracts, &coverage, inputs.residential.as_ref(), ops);
    let neighborhood_scores = score_neighborhoods(
        &inputs.neighborhoods,
        &inputs.tracts,
        &tract_scores,
        config.underserved_threshold,
    )?;

    let summary = summarize(
        &entrances,
        &isochrones,
        &tract_scores,
        &neighborhood_scores,
        config.time_budget_s,
        config.underserved_threshold,
    );

    Ok(PipelineOutput {
        graph_nodes: graph.node_count(),
        graph_edges: graph.edge_count(),
        entrances,
        reachability,
        isochrones,
        tract_scores,
        neighborhood_scores,
        summary,
    })
}
