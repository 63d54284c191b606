//! Reading GeoJSON feature collections and their properties

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::{Geometry, LineString, MultiPolygon};
use geojson::{Feature, GeoJson};
use serde_json::Value as JsonValue;

use crate::Error;

/// Reads a GeoJSON file as a list of features. A bare geometry or a single
/// feature is accepted as a one-element collection.
pub fn read_features(path: &Path) -> Result<Vec<Feature>, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let geojson: GeoJson = serde_json::from_reader(BufReader::new(file))?;

    Ok(match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature::from(geometry)],
    })
}

/// Converts a feature geometry to `geo`, `None` for features without geometry
pub(crate) fn feature_geometry(feature: &Feature) -> Result<Option<Geometry<f64>>, Error> {
    feature
        .geometry
        .clone()
        .map(|g| Geometry::<f64>::try_from(g).map_err(|e| Error::GeoJsonError(e.to_string())))
        .transpose()
}

/// Collects the polygonal parts of a geometry
pub(crate) fn polygonal(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Some(multi),
        Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
        Geometry::GeometryCollection(collection) => {
            let polygons: Vec<_> = collection
                .into_iter()
                .filter_map(polygonal)
                .flat_map(|m| m.0)
                .collect();
            (!polygons.is_empty()).then(|| MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

/// Collects the linear parts of a geometry
pub(crate) fn linear(geometry: Geometry<f64>) -> Vec<LineString<f64>> {
    match geometry {
        Geometry::LineString(line) => vec![line],
        Geometry::MultiLineString(multi) => multi.0,
        Geometry::Line(line) => vec![LineString::from(vec![line.start, line.end])],
        Geometry::GeometryCollection(collection) => {
            collection.into_iter().flat_map(linear).collect()
        }
        _ => Vec::new(),
    }
}

/// Reads an identifier property, numbers are formatted without a fraction when integral
pub(crate) fn string_property(feature: &Feature, field: &str) -> Option<String> {
    match feature.property(field)? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a numeric property, numeric strings are accepted
pub(crate) fn number_property(feature: &Feature, field: &str) -> Option<f64> {
    match feature.property(field)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a list of identifiers, either a JSON array or a comma separated string
pub(crate) fn id_list_property(feature: &Feature, field: &str) -> Option<Vec<String>> {
    match feature.property(field)? {
        JsonValue::Array(values) => Some(
            values
                .iter()
                .filter_map(|v| match v {
                    JsonValue::String(s) => Some(s.trim().to_string()),
                    JsonValue::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        JsonValue::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(properties: JsonValue) -> Feature {
        Feature::from_json_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": properties,
        }))
        .unwrap()
    }

    #[test]
    fn reads_numeric_ids_as_strings() {
        let f = feature(json!({"GEOID": 6065030101_u64, "name": "  Fairmount  "}));
        assert_eq!(string_property(&f, "GEOID").as_deref(), Some("6065030101"));
        assert_eq!(string_property(&f, "name").as_deref(), Some("Fairmount"));
        assert_eq!(string_property(&f, "missing"), None);
    }

    #[test]
    fn reads_tract_lists_in_both_shapes() {
        let array = feature(json!({"tract_ids": ["a", 2, ""]}));
        assert_eq!(id_list_property(&array, "tract_ids").unwrap(), vec!["a", "2"]);

        let csv = feature(json!({"tract_ids": "a, b,,c"}));
        assert_eq!(id_list_property(&csv, "tract_ids").unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn reads_numeric_strings() {
        let f = feature(json!({"residential_area": "1250.5"}));
        assert_eq!(number_property(&f, "residential_area"), Some(1250.5));
    }
}
