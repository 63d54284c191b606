//! Geometry algorithms: hulls, overlays and isochrone reconstruction

pub mod geometry;
pub mod isochrone;

pub use geometry::{ConcaveHullOps, GeometryOps};
pub use isochrone::{Confidence, Isochrone, reconstruct_isochrone, reconstruct_isochrones};
