//! This module is responsible for loading the input datasets and turning
//! them into the walking graph and park entrances the routing stage needs.

mod builder;
mod config;
mod datasets;
pub mod entrances;
pub mod features;
pub mod projection;

pub use builder::build_walk_graph;
pub use config::{FieldNames, InputPaths, PipelineConfig};
pub use datasets::{InputData, load_inputs};
pub use entrances::{ParkEntrances, park_entrances, sample_entrances};
pub use projection::LocalProjection;
