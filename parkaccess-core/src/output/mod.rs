pub mod publish;
pub mod to_geojson;

pub use publish::{
    Artifacts, Generation, check_consistency, latest_generation, publish_generation,
    render_artifacts,
};
pub use to_geojson::{
    isochrones_collection, neighborhoods_collection, parks_collection, tracts_collection,
};
