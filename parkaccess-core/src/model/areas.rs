//! Parks and administrative areas loaded from the input datasets

use geo::MultiPolygon;
use geojson::Feature;

/// Park boundary with identifying name
#[derive(Debug, Clone)]
pub struct Park {
    pub id: String,
    pub name: String,
    /// Planar boundary used for computation
    pub geometry: MultiPolygon<f64>,
    /// Source feature, republished unmodified
    pub feature: Feature,
}

/// Administrative tract
#[derive(Debug, Clone)]
pub struct Tract {
    pub id: String,
    /// Planar tract geometry
    pub geometry: MultiPolygon<f64>,
    /// Residential land area attribute in square metres, if the dataset carries one
    pub residential_area: Option<f64>,
    pub feature: Feature,
}

/// Neighborhood composed of tracts
#[derive(Debug, Clone)]
pub struct Neighborhood {
    pub id: String,
    pub geometry: MultiPolygon<f64>,
    /// Constituent tract ids as listed by the dataset.
    /// `None` means constituents are derived from the geometry.
    pub tract_ids: Option<Vec<String>>,
    pub feature: Feature,
}
