//! Run-level summary statistics for the serving layer

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    algo::Isochrone,
    loading::ParkEntrances,
    model::{NeighborhoodScore, TractScore, scores::round2},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Neighborhoods with a defined score
    pub total_neighborhoods: usize,
    pub underserved_count: usize,
    /// Scored neighborhoods where no residential land reaches a park
    pub strictly_underserved_count: usize,
    /// Share of scored neighborhoods that are underserved, one decimal
    pub underserved_percentage: f64,
    pub mean_neighborhood_score: Option<f64>,
    pub median_neighborhood_score: Option<f64>,
    pub not_applicable_neighborhoods: usize,
    /// Tracts with a defined score
    pub scored_tracts: usize,
    pub mean_tract_score: Option<f64>,
    pub median_tract_score: Option<f64>,
    pub not_applicable_tracts: usize,
    pub parks_total: usize,
    pub parks_without_entrances: usize,
    pub low_confidence_isochrones: usize,
    pub time_budget_s: f64,
    pub underserved_threshold: f64,
}

pub fn summarize(
    entrances: &BTreeMap<String, ParkEntrances>,
    isochrones: &BTreeMap<String, Isochrone>,
    tract_scores: &BTreeMap<String, TractScore>,
    neighborhood_scores: &BTreeMap<String, NeighborhoodScore>,
    time_budget_s: f64,
    underserved_threshold: f64,
) -> Summary {
    let neighborhood_values: Vec<f64> = neighborhood_scores
        .values()
        .filter_map(|n| n.score.value())
        .collect();
    let tract_values: Vec<f64> = tract_scores
        .values()
        .filter_map(|t| t.score.value())
        .collect();

    let total_neighborhoods = neighborhood_values.len();
    let underserved_count = neighborhood_scores
        .values()
        .filter(|n| n.is_underserved)
        .count();

    #[allow(clippy::cast_precision_loss)]
    let underserved_percentage = if total_neighborhoods > 0 {
        (underserved_count as f64 / total_neighborhoods as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    Summary {
        total_neighborhoods,
        underserved_count,
        strictly_underserved_count: neighborhood_scores
            .values()
            .filter(|n| n.is_underserved_strict)
            .count(),
        underserved_percentage,
        mean_neighborhood_score: mean(&neighborhood_values).map(round2),
        median_neighborhood_score: median(&neighborhood_values).map(round2),
        not_applicable_neighborhoods: neighborhood_scores.len() - total_neighborhoods,
        scored_tracts: tract_values.len(),
        mean_tract_score: mean(&tract_values).map(round2),
        median_tract_score: median(&tract_values).map(round2),
        not_applicable_tracts: tract_scores.len() - tract_values.len(),
        parks_total: entrances.len(),
        parks_without_entrances: entrances.values().filter(|e| e.is_empty()).count(),
        low_confidence_isochrones: isochrones.values().filter(|i| i.is_low_confidence()).count(),
        time_budget_s,
        underserved_threshold,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}
