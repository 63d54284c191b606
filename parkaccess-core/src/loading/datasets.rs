//! Loading of the input datasets into an immutable snapshot

use geo::{BooleanOps, Centroid, LineString, MultiPolygon};
use geojson::Feature;
use hashbrown::HashSet;
use log::{info, warn};

use super::config::{InputPaths, PipelineConfig};
use super::features::{
    feature_geometry, id_list_property, linear, number_property, polygonal, read_features,
    string_property,
};
use super::projection::LocalProjection;
use crate::{
    Error,
    model::{Neighborhood, Park, Tract},
};

/// Everything a pipeline run reads, fully loaded before computation starts
/// and shared read-only by every stage.
#[derive(Debug, Clone)]
pub struct InputData {
    pub boundary: MultiPolygon<f64>,
    pub streets: Vec<LineString<f64>>,
    /// Parks with a polygon boundary, the ones that get entrances
    pub parks: Vec<Park>,
    /// Every park feature as read, republished unmodified
    pub park_features: Vec<Feature>,
    pub tracts: Vec<Tract>,
    pub neighborhoods: Vec<Neighborhood>,
    /// Union of residential land-use polygons, when provided
    pub residential: Option<MultiPolygon<f64>>,
    /// Set when the inputs were lon/lat and got projected
    pub projection: Option<LocalProjection>,
}

/// Loads all input datasets
///
/// # Errors
///
/// Returns an error if a file is missing or unreadable, a required property
/// is absent, ids are duplicated or the boundary is empty.
pub fn load_inputs(paths: &InputPaths, config: &PipelineConfig) -> Result<InputData, Error> {
    let fields = &config.fields;

    info!("Loading study boundary: {}", paths.boundary.display());
    let boundary_features = read_features(&paths.boundary)?;
    let raw_boundary = union_polygons(&boundary_features)?;
    if raw_boundary.0.is_empty() {
        return Err(Error::EmptyBoundary);
    }

    let projection = if config.geographic {
        let origin = raw_boundary.centroid().ok_or(Error::EmptyBoundary)?;
        Some(LocalProjection::new(origin.0))
    } else {
        None
    };
    let planar = |m: MultiPolygon<f64>| match &projection {
        Some(p) => p.project(&m),
        None => m,
    };
    let boundary = planar(raw_boundary);

    info!("Loading street network: {}", paths.streets.display());
    let mut streets = Vec::new();
    for feature in read_features(&paths.streets)? {
        if let Some(geometry) = feature_geometry(&feature)? {
            streets.extend(linear(geometry).into_iter().map(|line| match &projection {
                Some(p) => p.project(&line),
                None => line,
            }));
        }
    }
    info!("  {} walkable ways", streets.len());

    info!("Loading parks: {}", paths.parks.display());
    let park_features = read_features(&paths.parks)?;
    let mut parks = Vec::new();
    for (index, feature) in park_features.iter().enumerate() {
        let Some(geometry) = feature_geometry(feature)?.and_then(polygonal) else {
            warn!("Park feature {index} has no polygon geometry, it gets no entrances");
            continue;
        };
        let id = string_property(feature, &fields.park_id).unwrap_or_else(|| index.to_string());
        let name = string_property(feature, &fields.park_name)
            .unwrap_or_else(|| "Unnamed park".to_string());
        parks.push(Park {
            id,
            name,
            geometry: planar(geometry),
            feature: feature.clone(),
        });
    }
    ensure_unique("park", parks.iter().map(|p| p.id.as_str()))?;
    info!("  {} parks, {} with a polygon", park_features.len(), parks.len());

    // Tracts and neighborhoods only count the land inside the study area
    let clip = |m: MultiPolygon<f64>| boundary.intersection(&planar(m));

    info!("Loading tracts: {}", paths.tracts.display());
    let mut tracts = Vec::new();
    for (index, feature) in read_features(&paths.tracts)?.into_iter().enumerate() {
        let id = string_property(&feature, &fields.tract_id).ok_or_else(|| Error::MissingField {
            dataset: "tracts",
            index,
            field: fields.tract_id.clone(),
        })?;
        let geometry = feature_geometry(&feature)?
            .and_then(polygonal)
            .ok_or_else(|| Error::InvalidData(format!("Tract '{id}' has no polygon geometry")))?;
        let residential_area = number_property(&feature, &fields.residential_area);
        if residential_area.is_none() && paths.residential.is_none() {
            return Err(Error::MissingField {
                dataset: "tracts",
                index,
                field: fields.residential_area.clone(),
            });
        }
        let geometry = clip(geometry);
        if geometry.0.is_empty() {
            warn!("Tract '{id}' lies outside the study boundary");
        }
        tracts.push(Tract {
            id,
            geometry,
            residential_area,
            feature,
        });
    }
    ensure_unique("tract", tracts.iter().map(|t| t.id.as_str()))?;
    info!("  {} tracts", tracts.len());

    info!("Loading neighborhoods: {}", paths.neighborhoods.display());
    let mut neighborhoods = Vec::new();
    for (index, feature) in read_features(&paths.neighborhoods)?.into_iter().enumerate() {
        let id = string_property(&feature, &fields.neighborhood_id).ok_or_else(|| {
            Error::MissingField {
                dataset: "neighborhoods",
                index,
                field: fields.neighborhood_id.clone(),
            }
        })?;
        let geometry = feature_geometry(&feature)?
            .and_then(polygonal)
            .map(&clip)
            .unwrap_or_else(|| MultiPolygon::new(vec![]));
        let tract_ids = id_list_property(&feature, &fields.tract_ids);
        if tract_ids.is_none() && geometry.0.is_empty() {
            return Err(Error::InvalidData(format!(
                "Neighborhood '{id}' has neither '{}' nor a polygon geometry",
                fields.tract_ids
            )));
        }
        neighborhoods.push(Neighborhood {
            id,
            geometry,
            tract_ids,
            feature,
        });
    }
    ensure_unique("neighborhood", neighborhoods.iter().map(|n| n.id.as_str()))?;
    info!("  {} neighborhoods", neighborhoods.len());

    let residential = match &paths.residential {
        Some(path) => {
            info!("Loading residential land use: {}", path.display());
            Some(planar(union_polygons(&read_features(path)?)?))
        }
        None => None,
    };

    Ok(InputData {
        boundary,
        streets,
        parks,
        park_features,
        tracts,
        neighborhoods,
        residential,
        projection,
    })
}

fn union_polygons(features: &[Feature]) -> Result<MultiPolygon<f64>, Error> {
    let mut union = MultiPolygon::new(vec![]);
    for feature in features {
        if let Some(polygons) = feature_geometry(feature)?.and_then(polygonal) {
            union = union.union(&polygons);
        }
    }
    Ok(union)
}

fn ensure_unique<'a>(
    dataset: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::DuplicateId {
                dataset,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ensure_unique("tract", ["a", "b", "a"].into_iter()).unwrap_err();
        assert!(matches!(err, Error::DuplicateId { dataset: "tract", ref id } if id == "a"));
    }
}
