//! Tract accessibility: share of residential land inside park isochrones

use std::collections::BTreeMap;

use geo::{BoundingRect, Intersects, MultiPolygon, Polygon, Rect};
use log::{info, warn};
use rayon::prelude::*;

use crate::{
    algo::GeometryOps,
    model::{Score, Tract, TractScore},
};

/// Union of every park isochrone, split into its disjoint parts so each
/// tract only overlays the parts near it.
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    parts: Vec<(Rect<f64>, Polygon<f64>)>,
}

impl Coverage {
    /// Unions the polygons before anything is intersected with them, so
    /// overlapping isochrones are never counted twice
    pub fn from_isochrones(polygons: &[Polygon<f64>], ops: &dyn GeometryOps) -> Self {
        let union = ops.union_all(polygons);
        Self::from_union(union)
    }

    pub fn from_union(union: MultiPolygon<f64>) -> Self {
        let parts = union
            .into_iter()
            .filter_map(|polygon| Some((polygon.bounding_rect()?, polygon)))
            .collect();
        Self { parts }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Coverage parts whose bounding box touches `area`
    fn near(&self, area: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        let Some(bbox) = area.bounding_rect() else {
            return MultiPolygon::new(vec![]);
        };
        MultiPolygon::new(
            self.parts
                .iter()
                .filter(|(rect, _)| rect.intersects(&bbox))
                .map(|(_, polygon)| polygon.clone())
                .collect(),
        )
    }
}

/// Scores a single tract.
///
/// With a residential land-use layer the tract's residential land is its
/// intersection with that layer. Without one, residential land is taken as
/// spread evenly over the tract and the `residential_area` attribute weights it.
/// A tract without residential land is not applicable.
pub fn score_tract(
    tract: &Tract,
    coverage: &Coverage,
    residential: Option<&MultiPolygon<f64>>,
    ops: &dyn GeometryOps,
) -> TractScore {
    let not_applicable = |residential_area: f64| TractScore {
        tract_id: tract.id.clone(),
        score: Score::NotApplicable,
        residential_area,
        covered_area: 0.0,
    };

    if let Some(land_use) = residential {
        let residential_land = ops.intersection(&tract.geometry, land_use);
        let residential_area = ops.area(&residential_land);
        if residential_area <= 0.0 {
            return not_applicable(0.0);
        }
        let nearby = coverage.near(&residential_land);
        let covered_area = ops.area(&ops.intersection(&residential_land, &nearby));
        return TractScore {
            tract_id: tract.id.clone(),
            score: Score::clamped(100.0 * covered_area / residential_area),
            residential_area,
            covered_area: covered_area.min(residential_area),
        };
    }

    let residential_area = tract.residential_area.unwrap_or(0.0);
    let tract_area = ops.area(&tract.geometry);
    if residential_area.is_nan() || residential_area <= 0.0 || tract_area <= 0.0 {
        return not_applicable(residential_area.max(0.0));
    }

    let covered = ops.area(&ops.intersection(&tract.geometry, &coverage.near(&tract.geometry)));
    let fraction = (covered / tract_area).clamp(0.0, 1.0);
    TractScore {
        tract_id: tract.id.clone(),
        score: Score::clamped(100.0 * fraction),
        residential_area,
        covered_area: residential_area * fraction,
    }
}

/// Scores every tract in parallel, keyed by tract id
pub fn score_tracts(
    tracts: &[Tract],
    coverage: &Coverage,
    residential: Option<&MultiPolygon<f64>>,
    ops: &dyn GeometryOps,
) -> BTreeMap<String, TractScore> {
    info!("Overlaying park coverage with {} tracts", tracts.len());

    let scores: BTreeMap<String, TractScore> = tracts
        .par_iter()
        .map(|tract| (tract.id.clone(), score_tract(tract, coverage, residential, ops)))
        .collect();

    let not_applicable = scores.values().filter(|s| !s.score.is_applicable()).count();
    if not_applicable > 0 {
        warn!("{not_applicable} tracts have no residential land and are not scored");
    }
    scores
}
