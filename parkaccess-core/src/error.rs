use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Feature {index} in {dataset} is missing field '{field}'")]
    MissingField {
        dataset: &'static str,
        index: usize,
        field: String,
    },
    #[error("Duplicate {dataset} id '{id}'")]
    DuplicateId { dataset: &'static str, id: String },
    #[error("Neighborhood '{neighborhood}' references unknown tract '{tract}'")]
    UnknownTract { neighborhood: String, tract: String },
    #[error("Study boundary is empty")]
    EmptyBoundary,
    #[error("Walking graph is empty after clipping to the study boundary")]
    EmptyGraph,
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}
