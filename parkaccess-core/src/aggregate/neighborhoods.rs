//! Neighborhood accessibility and underserved flagging

use std::collections::BTreeMap;

use geo::{InteriorPoint, Intersects};
use hashbrown::HashSet;
use log::{info, warn};

use crate::{
    Error,
    model::{Neighborhood, NeighborhoodScore, Score, Tract, TractScore},
};

/// Constituent tract ids of every neighborhood.
///
/// Listed ids must all name existing tracts. A neighborhood without a list
/// gets the tracts whose interior point lies inside its geometry.
///
/// # Errors
///
/// Returns [`Error::UnknownTract`] for the first listed id with no tract.
pub fn resolve_constituents(
    neighborhoods: &[Neighborhood],
    tracts: &[Tract],
) -> Result<BTreeMap<String, Vec<String>>, Error> {
    let known: HashSet<&str> = tracts.iter().map(|t| t.id.as_str()).collect();
    let anchors: Vec<_> = tracts
        .iter()
        .filter_map(|t| Some((t.id.as_str(), t.geometry.interior_point()?)))
        .collect();

    let mut constituents = BTreeMap::new();
    for neighborhood in neighborhoods {
        let tract_ids = match &neighborhood.tract_ids {
            Some(ids) => {
                if let Some(missing) = ids.iter().find(|id| !known.contains(id.as_str())) {
                    return Err(Error::UnknownTract {
                        neighborhood: neighborhood.id.clone(),
                        tract: missing.clone(),
                    });
                }
                let mut ids = ids.clone();
                ids.sort();
                ids.dedup();
                ids
            }
            None => anchors
                .iter()
                .filter(|(_, point)| point.intersects(&neighborhood.geometry))
                .map(|(id, _)| (*id).to_string())
                .collect(),
        };

        if tract_ids.is_empty() {
            warn!("Neighborhood '{}' has no constituent tracts", neighborhood.id);
        }
        constituents.insert(neighborhood.id.clone(), tract_ids);
    }

    Ok(constituents)
}

/// Residential-area weighted mean of the constituents that have a score.
/// Returns the score and the total weight it was built from.
pub fn weighted_score<'a>(constituents: impl IntoIterator<Item = &'a TractScore>) -> (Score, f64) {
    let (weighted_sum, weight) = constituents
        .into_iter()
        .filter_map(|t| Some((t.score.value()?, t.residential_area)))
        .filter(|(_, w)| *w > 0.0)
        .fold((0.0, 0.0), |(sum, total), (score, w)| (sum + score * w, total + w));

    if weight > 0.0 {
        (Score::clamped(weighted_sum / weight), weight)
    } else {
        (Score::NotApplicable, 0.0)
    }
}

/// Scores every neighborhood from its tracts and flags those below
/// `underserved_threshold`. Not applicable neighborhoods are never flagged.
///
/// # Errors
///
/// Returns an error when a neighborhood lists a tract that does not exist.
pub fn score_neighborhoods(
    neighborhoods: &[Neighborhood],
    tracts: &[Tract],
    tract_scores: &BTreeMap<String, TractScore>,
    underserved_threshold: f64,
) -> Result<BTreeMap<String, NeighborhoodScore>, Error> {
    let constituents = resolve_constituents(neighborhoods, tracts)?;

    let mut scores = BTreeMap::new();
    for (neighborhood_id, tract_ids) in constituents {
        let mut members = Vec::with_capacity(tract_ids.len());
        for id in &tract_ids {
            let score = tract_scores.get(id).ok_or_else(|| Error::UnknownTract {
                neighborhood: neighborhood_id.clone(),
                tract: id.clone(),
            })?;
            members.push(score);
        }

        let covered_area: f64 = members
            .iter()
            .filter(|t| t.score.is_applicable() && t.residential_area > 0.0)
            .map(|t| t.covered_area)
            .sum();
        let (score, residential_area) = weighted_score(members);
        let is_underserved = score
            .value()
            .is_some_and(|value| value < underserved_threshold);
        let is_underserved_strict = score.is_applicable() && covered_area <= 0.0;

        scores.insert(
            neighborhood_id.clone(),
            NeighborhoodScore {
                neighborhood_id,
                score,
                is_underserved,
                is_underserved_strict,
                tract_ids,
                residential_area,
                uncovered_residential_area: (residential_area - covered_area).max(0.0),
            },
        );
    }

    let underserved = scores.values().filter(|n| n.is_underserved).count();
    let strict = scores.values().filter(|n| n.is_underserved_strict).count();
    info!(
        "Scored {} neighborhoods, {underserved} below the {underserved_threshold} threshold, \
         {strict} without any access",
        scores.len()
    );
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, Polygon, polygon};
    use geojson::Feature;

    fn blank() -> Feature {
        Feature::from_json_value(serde_json::json!({
            "type": "Feature",
            "geometry": null,
            "properties": {},
        }))
        .unwrap()
    }

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]
    }

    fn tract(id: &str, x: f64) -> Tract {
        Tract {
            id: id.to_string(),
            geometry: MultiPolygon::new(vec![square(x, 0.0, 10.0)]),
            residential_area: Some(1.0),
            feature: blank(),
        }
    }

    fn neighborhood(id: &str, tract_ids: Option<Vec<&str>>, geometry: Polygon<f64>) -> Neighborhood {
        Neighborhood {
            id: id.to_string(),
            geometry: MultiPolygon::new(vec![geometry]),
            tract_ids: tract_ids.map(|ids| ids.into_iter().map(str::to_string).collect()),
            feature: blank(),
        }
    }

    fn tract_score(id: &str, score: Score, residential_area: f64) -> TractScore {
        TractScore {
            tract_id: id.to_string(),
            score,
            residential_area,
            covered_area: 0.0,
        }
    }

    #[test]
    fn not_applicable_tracts_are_left_out() {
        let scores = [
            tract_score("a", Score::Value(80.0), 1.0),
            tract_score("b", Score::NotApplicable, 0.0),
        ];
        let (score, weight) = weighted_score(&scores);
        assert_eq!(score, Score::Value(80.0));
        assert_eq!(weight, 1.0);
    }

    #[test]
    fn all_not_applicable_is_not_applicable() {
        let scores = [tract_score("a", Score::NotApplicable, 0.0)];
        assert_eq!(weighted_score(&scores).0, Score::NotApplicable);
        assert_eq!(weighted_score(&[] as &[TractScore]).0, Score::NotApplicable);
    }

    #[test]
    fn unknown_tract_aborts() {
        let tracts = [tract("a", 0.0)];
        let neighborhoods = [neighborhood("n", Some(vec!["a", "zz"]), square(0.0, 0.0, 1.0))];
        let err = resolve_constituents(&neighborhoods, &tracts).unwrap_err();
        assert!(matches!(err, Error::UnknownTract { ref tract, .. } if tract == "zz"));
    }

    #[test]
    fn constituents_fall_back_to_geometry() {
        let tracts = [tract("west", 0.0), tract("east", 100.0)];
        let neighborhoods = [neighborhood("n", None, square(-5.0, -5.0, 50.0))];
        let constituents = resolve_constituents(&neighborhoods, &tracts).unwrap();
        assert_eq!(constituents["n"], vec!["west".to_string()]);
    }

    #[test]
    fn strict_flag_needs_zero_coverage() {
        let tracts = [tract("none", 0.0), tract("some", 20.0), tract("na", 40.0)];
        let neighborhoods = [
            neighborhood("cut_off", Some(vec!["none", "na"]), square(0.0, 0.0, 1.0)),
            neighborhood("sliver", Some(vec!["none", "some"]), square(0.0, 0.0, 1.0)),
            neighborhood("empty", Some(vec!["na"]), square(0.0, 0.0, 1.0)),
        ];
        let covered = |id: &str, score: Score, residential_area: f64, covered_area: f64| {
            let mut t = tract_score(id, score, residential_area);
            t.covered_area = covered_area;
            (id.to_string(), t)
        };
        let tract_scores = BTreeMap::from([
            covered("none", Score::Value(0.0), 4.0, 0.0),
            covered("some", Score::Value(25.0), 4.0, 1.0),
            covered("na", Score::NotApplicable, 0.0, 0.0),
        ]);
        let scores = score_neighborhoods(&neighborhoods, &tracts, &tract_scores, 50.0).unwrap();

        assert!(scores["cut_off"].is_underserved_strict);
        assert_eq!(scores["cut_off"].uncovered_residential_area, 4.0);
        assert!(!scores["sliver"].is_underserved_strict);
        assert!(scores["sliver"].is_underserved);
        assert_eq!(scores["sliver"].uncovered_residential_area, 7.0);
        assert!(!scores["empty"].is_underserved_strict);
    }

    #[test]
    fn threshold_flags_strictly_below() {
        let tracts = [tract("a", 0.0), tract("b", 20.0)];
        let neighborhoods = [
            neighborhood("at", Some(vec!["a"]), square(0.0, 0.0, 1.0)),
            neighborhood("below", Some(vec!["b"]), square(0.0, 0.0, 1.0)),
        ];
        let tract_scores = BTreeMap::from([
            ("a".to_string(), tract_score("a", Score::Value(50.0), 1.0)),
            ("b".to_string(), tract_score("b", Score::Value(49.99), 1.0)),
        ]);
        let scores = score_neighborhoods(&neighborhoods, &tracts, &tract_scores, 50.0).unwrap();
        assert!(!scores["at"].is_underserved);
        assert!(scores["below"].is_underserved);
    }
}
