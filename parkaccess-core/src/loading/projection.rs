//! Local equirectangular projection for lon/lat inputs.
//!
//! Study areas are city sized, so a plane tangent at the boundary centroid
//! keeps distance and area distortion well below the noise of the input data.

use geo::{Coord, MapCoords};

const EARTH_RADIUS_M: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin: Coord<f64>,
    cos_lat: f64,
}

impl LocalProjection {
    /// Projection centred on `origin` given as (lon, lat) degrees
    pub fn new(origin: Coord<f64>) -> Self {
        Self {
            origin,
            cos_lat: origin.y.to_radians().cos(),
        }
    }

    pub fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x).to_radians() * self.cos_lat * EARTH_RADIUS_M,
            y: (c.y - self.origin.y).to_radians() * EARTH_RADIUS_M,
        }
    }

    pub fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: self.origin.x + (c.x / (EARTH_RADIUS_M * self.cos_lat)).to_degrees(),
            y: self.origin.y + (c.y / EARTH_RADIUS_M).to_degrees(),
        }
    }

    pub fn project<G: MapCoords<f64, f64, Output = G>>(&self, geometry: &G) -> G {
        geometry.map_coords(|c| self.forward(c))
    }

    pub fn unproject<G: MapCoords<f64, f64, Output = G>>(&self, geometry: &G) -> G {
        geometry.map_coords(|c| self.inverse(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let proj = LocalProjection::new(Coord { x: -117.4, y: 33.95 });
        let north = proj.forward(Coord { x: -117.4, y: 34.95 });
        assert!((north.y - 111_195.0).abs() < 10.0);
        assert!(north.x.abs() < 1e-9);
    }

    #[test]
    fn inverse_restores_coordinates() {
        let proj = LocalProjection::new(Coord { x: 10.0, y: 50.0 });
        let c = Coord { x: 10.01, y: 49.995 };
        let back = proj.inverse(proj.forward(c));
        assert!((back.x - c.x).abs() < 1e-12);
        assert!((back.y - c.y).abs() < 1e-12);
    }
}
