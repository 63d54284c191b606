use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_ENTRANCE_SPACING, DEFAULT_HULL_CONCAVITY, DEFAULT_MAX_SNAP_DISTANCE,
    DEFAULT_TIME_BUDGET, DEFAULT_UNDERSERVED_THRESHOLD, DEFAULT_WALKING_SPEED, Error, WalkingTime,
};

/// Locations of the pre-fetched input datasets, all GeoJSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPaths {
    pub boundary: PathBuf,
    pub streets: PathBuf,
    pub parks: PathBuf,
    pub tracts: PathBuf,
    pub neighborhoods: PathBuf,
    /// Optional residential land-use polygons
    #[serde(default)]
    pub residential: Option<PathBuf>,
}

/// Property names read from the input features
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub park_id: String,
    pub park_name: String,
    pub tract_id: String,
    pub residential_area: String,
    pub neighborhood_id: String,
    pub tract_ids: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            park_id: "id".to_string(),
            park_name: "name".to_string(),
            tract_id: "GEOID".to_string(),
            residential_area: "residential_area".to_string(),
            neighborhood_id: "neighborhood_name".to_string(),
            tract_ids: "tract_ids".to_string(),
        }
    }
}

/// Parameters of a pipeline run. Every value is fixed for the whole run so
/// repeated runs over the same inputs produce the same outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Nominal walking speed, metres per second
    pub walking_speed_mps: f64,
    /// Walking time budget in seconds, inclusive
    pub time_budget_s: WalkingTime,
    /// Maximum distance between a park access point and its entrance node
    pub max_snap_distance_m: f64,
    /// Spacing of the points sampled along park boundaries
    pub entrance_spacing_m: f64,
    /// Concave hull concavity used for isochrones
    pub hull_concavity: f64,
    /// Neighborhoods scoring strictly below this are underserved
    pub underserved_threshold: f64,
    /// Worker threads, `None` lets rayon decide
    pub workers: Option<usize>,
    /// Score everything as zero instead of aborting when the graph is empty
    pub allow_empty_graph: bool,
    /// Inputs are lon/lat and get projected onto a local plane
    pub geographic: bool,
    pub fields: FieldNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            walking_speed_mps: DEFAULT_WALKING_SPEED,
            time_budget_s: DEFAULT_TIME_BUDGET,
            max_snap_distance_m: DEFAULT_MAX_SNAP_DISTANCE,
            entrance_spacing_m: DEFAULT_ENTRANCE_SPACING,
            hull_concavity: DEFAULT_HULL_CONCAVITY,
            underserved_threshold: DEFAULT_UNDERSERVED_THRESHOLD,
            workers: None,
            allow_empty_graph: false,
            geographic: false,
            fields: FieldNames::default(),
        }
    }
}

impl PipelineConfig {
    /// Rejects parameters that would make the run meaningless
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending parameter
    pub fn validate(&self) -> Result<(), Error> {
        let positive = [
            ("walking_speed_mps", self.walking_speed_mps),
            ("time_budget_s", self.time_budget_s),
            ("max_snap_distance_m", self.max_snap_distance_m),
            ("entrance_spacing_m", self.entrance_spacing_m),
            ("hull_concavity", self.hull_concavity),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        if !(0.0..=100.0).contains(&self.underserved_threshold) {
            return Err(Error::Config(format!(
                "underserved_threshold must be within [0, 100], got {}",
                self.underserved_threshold
            )));
        }

        if self.workers == Some(0) {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }

        Ok(())
    }
}
