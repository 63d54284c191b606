//! Generation publishing.
//!
//! Every artifact of a run is written into a staging directory, checked for
//! consistency and then moved into place under a fresh generation id. The
//! `LATEST` pointer file is replaced last, so a reader either sees the
//! previous generation or the new one in full.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use hashbrown::HashSet;
use log::{info, warn};
use serde_json::json;

use crate::{Error, loading::InputData, pipeline::PipelineOutput};

use super::to_geojson::{
    isochrones_collection, neighborhoods_collection, parks_collection, tracts_collection,
};

pub const TRACTS_FILE: &str = "tracts.geojson";
pub const NEIGHBORHOODS_FILE: &str = "neighborhoods.geojson";
pub const PARKS_FILE: &str = "parks.geojson";
pub const ISOCHRONES_FILE: &str = "isochrones.geojson";
pub const SUMMARY_FILE: &str = "summary.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const LATEST_FILE: &str = "LATEST";

/// Serialized outputs of one run, in publishing order
#[derive(Debug, Clone)]
pub struct Artifacts {
    files: Vec<(&'static str, Vec<u8>)>,
}

impl Artifacts {
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|(file, _)| *file == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.files.iter().map(|(name, _)| *name)
    }
}

/// A published generation directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub id: String,
    pub path: PathBuf,
}

/// Checks that every tract a neighborhood was built from is present in the
/// tract output
///
/// # Errors
///
/// Returns [`Error::UnknownTract`] for the first dangling reference.
pub fn check_consistency(output: &PipelineOutput) -> Result<(), Error> {
    let tracts: HashSet<&str> = output.tract_scores.keys().map(String::as_str).collect();
    for neighborhood in output.neighborhood_scores.values() {
        if let Some(missing) = neighborhood
            .tract_ids
            .iter()
            .find(|id| !tracts.contains(id.as_str()))
        {
            return Err(Error::UnknownTract {
                neighborhood: neighborhood.neighborhood_id.clone(),
                tract: missing.clone(),
            });
        }
    }
    Ok(())
}

/// Serializes every output of a run. Contains no timestamps, so the same
/// inputs and configuration always give byte-identical artifacts.
///
/// # Errors
///
/// Returns an error when the run is inconsistent or a feature cannot be built.
pub fn render_artifacts(inputs: &InputData, output: &PipelineOutput) -> Result<Artifacts, Error> {
    check_consistency(output)?;

    let threshold = output.summary.underserved_threshold;
    let tracts = tracts_collection(&inputs.tracts, &output.tract_scores)?;
    let neighborhoods =
        neighborhoods_collection(&inputs.neighborhoods, &output.neighborhood_scores, threshold)?;
    let parks = parks_collection(&inputs.park_features);
    let isochrones = isochrones_collection(
        &inputs.parks,
        &output.isochrones,
        output.summary.time_budget_s,
        inputs.projection.as_ref(),
    )?;

    Ok(Artifacts {
        files: vec![
            (TRACTS_FILE, serde_json::to_vec(&tracts)?),
            (NEIGHBORHOODS_FILE, serde_json::to_vec(&neighborhoods)?),
            (PARKS_FILE, serde_json::to_vec(&parks)?),
            (ISOCHRONES_FILE, serde_json::to_vec(&isochrones)?),
            (SUMMARY_FILE, serde_json::to_vec_pretty(&output.summary)?),
        ],
    })
}

/// Generation id derived from the run time, sortable as a string
pub fn generation_id(generated_at: DateTime<Utc>) -> String {
    generated_at.format("%Y%m%dT%H%M%S%.3fZ").to_string()
}

/// Publishes `artifacts` as a new generation under `output_dir`.
///
/// Nothing under the previous generation is touched. If any step before the
/// final rename fails, the staging directory is removed and `LATEST` keeps
/// pointing at the previous generation.
///
/// # Errors
///
/// Returns an error on any filesystem failure or when a generation with the
/// same id already exists.
pub fn publish_generation(
    output_dir: &Path,
    artifacts: &Artifacts,
    generated_at: DateTime<Utc>,
) -> Result<Generation, Error> {
    let id = generation_id(generated_at);
    let target = output_dir.join(&id);
    if target.exists() {
        return Err(Error::InvalidData(format!(
            "Generation '{id}' already exists in {}",
            output_dir.display()
        )));
    }

    fs::create_dir_all(output_dir)?;
    let staging = output_dir.join(format!(".staging-{id}"));
    if let Err(e) = stage(&staging, &id, artifacts, generated_at) {
        if let Err(cleanup) = fs::remove_dir_all(&staging) {
            warn!("Failed to remove staging directory {}: {cleanup}", staging.display());
        }
        return Err(e);
    }

    fs::rename(&staging, &target)?;

    let pointer = output_dir.join(format!(".{LATEST_FILE}.tmp"));
    fs::write(&pointer, format!("{id}\n"))?;
    fs::rename(&pointer, output_dir.join(LATEST_FILE))?;

    info!("Published generation {id} to {}", target.display());
    Ok(Generation { id, path: target })
}

fn stage(
    staging: &Path,
    id: &str,
    artifacts: &Artifacts,
    generated_at: DateTime<Utc>,
) -> Result<(), Error> {
    if staging.exists() {
        fs::remove_dir_all(staging)?;
    }
    fs::create_dir_all(staging)?;

    for (name, bytes) in &artifacts.files {
        fs::write(staging.join(name), bytes)?;
    }

    let manifest = json!({
        "generation": id,
        "generated_at": generated_at.to_rfc3339(),
        "artifacts": artifacts.names().collect::<Vec<_>>(),
    });
    fs::write(staging.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;

    // Everything must read back before the generation becomes visible
    for name in artifacts.names().chain([MANIFEST_FILE]) {
        let bytes = fs::read(staging.join(name))?;
        serde_json::from_slice::<serde_json::Value>(&bytes)?;
    }
    Ok(())
}

/// Directory of the generation `LATEST` points at, if any
///
/// # Errors
///
/// Returns an error when `LATEST` exists but cannot be read or names a
/// missing generation.
pub fn latest_generation(output_dir: &Path) -> Result<Option<Generation>, Error> {
    let pointer = output_dir.join(LATEST_FILE);
    if !pointer.exists() {
        return Ok(None);
    }
    let id = fs::read_to_string(&pointer)?.trim().to_string();
    let path = output_dir.join(&id);
    if !path.is_dir() {
        return Err(Error::InvalidData(format!(
            "{LATEST_FILE} points at missing generation '{id}'"
        )));
    }
    Ok(Some(Generation { id, path }))
}
