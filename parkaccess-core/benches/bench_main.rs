//! Benchmarks of the per-park stages on a synthetic street grid.
//!
//! Run with: cargo bench -p parkaccess_core --bench bench_main

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use geo::{LineString, MultiPolygon, Polygon, polygon};
use geojson::Feature;
use parkaccess_core::{
    algo::{ConcaveHullOps, reconstruct_isochrones},
    loading::{build_walk_graph, sample_entrances},
    model::{Park, WalkGraph},
    routing::compute_reachability,
};

const GRID_SIZE: u32 = 60;
const BLOCK: f64 = 80.0;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]
}

fn grid_graph() -> WalkGraph {
    let streets: Vec<LineString<f64>> = (0..GRID_SIZE)
        .flat_map(|i| {
            let c = f64::from(i) * BLOCK;
            let row: Vec<_> = (0..GRID_SIZE).map(|j| (f64::from(j) * BLOCK, c)).collect();
            let column: Vec<_> = (0..GRID_SIZE).map(|j| (c, f64::from(j) * BLOCK)).collect();
            [LineString::from(row), LineString::from(column)]
        })
        .collect();
    let extent = f64::from(GRID_SIZE) * BLOCK;
    let boundary = MultiPolygon::new(vec![rect(-BLOCK, -BLOCK, extent, extent)]);
    build_walk_graph(&streets, &boundary, parkaccess_core::DEFAULT_WALKING_SPEED)
}

fn parks() -> Vec<Park> {
    (0..25u32)
        .map(|i| {
            let x = f64::from(i % 5) * 900.0 + 100.0;
            let y = f64::from(i / 5) * 900.0 + 100.0;
            Park {
                id: format!("park-{i}"),
                name: format!("Park {i}"),
                geometry: MultiPolygon::new(vec![rect(x, y, x + 150.0, y + 120.0)]),
                feature: Feature::from_json_value(serde_json::json!({
                    "type": "Feature",
                    "geometry": null,
                    "properties": {"id": format!("park-{i}")},
                }))
                .expect("static feature"),
            }
        })
        .collect()
}

fn bench_reachability(c: &mut Criterion) {
    let mut group = c.benchmark_group("reachability");
    group.sample_size(20);

    let graph = grid_graph();
    let entrances = sample_entrances(&graph, &parks(), 50.0, 25.0);

    group.bench_function("all_parks_900s", |b| {
        b.iter(|| black_box(compute_reachability(&graph, black_box(&entrances), 900.0)));
    });

    group.finish();
}

fn bench_isochrones(c: &mut Criterion) {
    let mut group = c.benchmark_group("isochrones");
    group.sample_size(10);

    let graph = grid_graph();
    let entrances = sample_entrances(&graph, &parks(), 50.0, 25.0);
    let reachability = compute_reachability(&graph, &entrances, 900.0);
    let ops = ConcaveHullOps::new(parkaccess_core::DEFAULT_HULL_CONCAVITY);

    group.bench_function("concave_hulls", |b| {
        b.iter(|| black_box(reconstruct_isochrones(&graph, black_box(&reachability), &ops)));
    });

    group.finish();
}

criterion_group!(benches, bench_reachability, bench_isochrones);
criterion_main!(benches);
