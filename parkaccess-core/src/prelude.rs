pub use crate::Error;
pub use crate::pipeline::{PipelineOutput, run_pipeline};

// Loading and configuration
pub use crate::loading::{InputData, InputPaths, PipelineConfig, load_inputs};

// Publishing
pub use crate::output::{Generation, latest_generation, publish_generation, render_artifacts};

// Scores
pub use crate::aggregate::Summary;
pub use crate::model::{NeighborhoodScore, Score, TractScore};

// Core types for the walking network
pub use crate::WalkNodeId;
pub use crate::WalkingTime; // seconds
