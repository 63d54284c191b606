use std::collections::BTreeMap;

use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::{Value as JsonValue, json};

use crate::{
    Error,
    algo::Isochrone,
    loading::LocalProjection,
    model::{Neighborhood, NeighborhoodScore, Park, Tract, TractScore, scores::round2},
};

/// Tract features with their `accessibility_score`, `null` when not applicable
pub fn tracts_collection(
    tracts: &[Tract],
    scores: &BTreeMap<String, TractScore>,
) -> Result<FeatureCollection, Error> {
    let mut features = Vec::with_capacity(tracts.len());
    for tract in tracts {
        let score = scores.get(&tract.id).ok_or_else(|| {
            Error::InvalidData(format!("Tract '{}' was not scored", tract.id))
        })?;

        let mut feature = tract.feature.clone();
        feature.set_property("accessibility_score", json!(score.score));
        feature.set_property(
            "covered_residential_area",
            json!(round2(score.covered_area)),
        );
        features.push(feature);
    }

    Ok(collection(features))
}

/// Neighborhood features with `neigh_accessibility_score` and `is_underserved`
pub fn neighborhoods_collection(
    neighborhoods: &[Neighborhood],
    scores: &BTreeMap<String, NeighborhoodScore>,
    underserved_threshold: f64,
) -> Result<FeatureCollection, Error> {
    let mut features = Vec::with_capacity(neighborhoods.len());
    for neighborhood in neighborhoods {
        let score = scores.get(&neighborhood.id).ok_or_else(|| {
            Error::InvalidData(format!("Neighborhood '{}' was not scored", neighborhood.id))
        })?;

        let mut feature = neighborhood.feature.clone();
        feature.set_property("neigh_accessibility_score", json!(score.score));
        feature.set_property("is_underserved", score.is_underserved);
        feature.set_property("is_underserved_strict", score.is_underserved_strict);
        feature.set_property(
            "uncovered_residential_area",
            json!(round2(score.uncovered_residential_area)),
        );
        feature.set_property("pct_without_access", json!(score.pct_without_access()));
        feature.set_property("underserved_threshold", underserved_threshold);
        feature.set_property("tract_ids", json!(score.tract_ids));
        features.push(feature);
    }

    Ok(collection(features))
}

/// Park features exactly as they were read, including the ones without a
/// polygon that never got entrances
pub fn parks_collection(park_features: &[Feature]) -> FeatureCollection {
    collection(park_features.to_vec())
}

/// One feature per park whose isochrone has a polygon
pub fn isochrones_collection(
    parks: &[Park],
    isochrones: &BTreeMap<String, Isochrone>,
    time_budget_s: f64,
    projection: Option<&LocalProjection>,
) -> Result<FeatureCollection, Error> {
    let names: BTreeMap<&str, &str> = parks
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();

    let mut features = Vec::new();
    for (park_id, isochrone) in isochrones {
        let Some(polygon) = &isochrone.polygon else {
            continue;
        };
        let polygon = match projection {
            Some(p) => p.unproject(polygon),
            None => polygon.clone(),
        };

        let value = json!({
            "type": "Feature",
            "geometry": Geometry::new(GeoJsonValue::from(&polygon)),
            "properties": {
                "park_id": park_id,
                "park_name": names.get(park_id.as_str()).copied().unwrap_or_default(),
                "minutes": time_budget_s / 60.0,
                "point_count": isochrone.point_count,
                "confidence": isochrone.confidence,
            }
        });
        features.push(feature_from_json(value)?);
    }

    Ok(collection(features))
}

fn feature_from_json(value: JsonValue) -> Result<Feature, Error> {
    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Score;
    use geo::MultiPolygon;

    fn tract(id: &str) -> Tract {
        Tract {
            id: id.to_string(),
            geometry: MultiPolygon::new(vec![]),
            residential_area: Some(1.0),
            feature: Feature::from_json_value(json!({
                "type": "Feature",
                "geometry": null,
                "properties": {"GEOID": id, "POPULATION": 1200},
            }))
            .unwrap(),
        }
    }

    #[test]
    fn tract_attributes_are_kept_alongside_the_score() {
        let scores = BTreeMap::from([
            (
                "a".to_string(),
                TractScore {
                    tract_id: "a".to_string(),
                    score: Score::Value(41.234),
                    residential_area: 1.0,
                    covered_area: 0.41234,
                },
            ),
            (
                "b".to_string(),
                TractScore {
                    tract_id: "b".to_string(),
                    score: Score::NotApplicable,
                    residential_area: 0.0,
                    covered_area: 0.0,
                },
            ),
        ]);
        let fc = tracts_collection(&[tract("a"), tract("b")], &scores).unwrap();

        assert_eq!(fc.features[0].property("accessibility_score"), Some(&json!(41.23)));
        assert_eq!(fc.features[0].property("POPULATION"), Some(&json!(1200)));
        assert_eq!(fc.features[1].property("accessibility_score"), Some(&JsonValue::Null));
    }

    #[test]
    fn unscored_tract_is_an_error() {
        assert!(tracts_collection(&[tract("a")], &BTreeMap::new()).is_err());
    }

    #[test]
    fn neighborhood_flags_and_uncovered_area() {
        let neighborhood = Neighborhood {
            id: "n".to_string(),
            geometry: MultiPolygon::new(vec![]),
            tract_ids: None,
            feature: Feature::from_json_value(json!({
                "type": "Feature",
                "geometry": null,
                "properties": {"neighborhood_name": "n"},
            }))
            .unwrap(),
        };
        let scores = BTreeMap::from([(
            "n".to_string(),
            NeighborhoodScore {
                neighborhood_id: "n".to_string(),
                score: Score::Value(0.0),
                is_underserved: true,
                is_underserved_strict: true,
                tract_ids: vec!["a".to_string()],
                residential_area: 12.345,
                uncovered_residential_area: 12.345,
            },
        )]);
        let fc = neighborhoods_collection(&[neighborhood], &scores, 50.0).unwrap();
        let feature = &fc.features[0];

        assert_eq!(feature.property("is_underserved_strict"), Some(&json!(true)));
        assert_eq!(feature.property("uncovered_residential_area"), Some(&json!(12.35)));
        assert_eq!(feature.property("pct_without_access"), Some(&json!(100.0)));
        assert_eq!(feature.property("tract_ids"), Some(&json!(["a"])));
    }

    #[test]
    fn parks_are_republished_as_read() {
        let point = Feature::from_json_value(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
            "properties": {"id": "plaza"},
        }))
        .unwrap();
        let fc = parks_collection(&[point.clone()]);
        assert_eq!(fc.features, vec![point]);
    }
}
