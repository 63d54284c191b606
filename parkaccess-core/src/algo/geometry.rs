//! Geometry operations used by the isochrone and aggregation stages.
//!
//! Kept behind [`GeometryOps`] so the hull and overlay algorithms can be
//! swapped or tested without a walking graph.

use geo::concave_hull::ConcaveHullOptions;
use geo::{Area, BooleanOps, ConcaveHull, ConvexHull, MultiPoint, MultiPolygon, Point, Polygon};
use itertools::Itertools;

pub trait GeometryOps: Send + Sync {
    /// Polygon enveloping `points`, `None` when fewer than three distinct
    /// points are given or the envelope has no area.
    fn hull(&self, points: &[Point<f64>]) -> Option<Polygon<f64>>;

    /// Union of all polygons, overlaps counted once
    fn union_all(&self, polygons: &[Polygon<f64>]) -> MultiPolygon<f64>;

    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    fn area(&self, geometry: &MultiPolygon<f64>) -> f64;
}

/// Concave hull of the reached points, overlays with `geo` boolean ops
#[derive(Debug, Clone, Copy)]
pub struct ConcaveHullOps {
    /// Lower values follow the points tighter, large values approach the convex hull
    pub concavity: f64,
}

impl ConcaveHullOps {
    pub fn new(concavity: f64) -> Self {
        Self { concavity }
    }
}

impl GeometryOps for ConcaveHullOps {
    fn hull(&self, points: &[Point<f64>]) -> Option<Polygon<f64>> {
        let distinct = distinct_points(points);
        if distinct.len() < 3 {
            return None;
        }

        let points = MultiPoint::new(distinct);
        // Collinear points span no area
        if points.convex_hull().unsigned_area() <= 0.0 {
            return None;
        }

        let hull = points.concave_hull_with_options(ConcaveHullOptions {
            concavity: self.concavity,
            length_threshold: 0.0,
        });
        (hull.unsigned_area() > 0.0).then_some(hull)
    }

    fn union_all(&self, polygons: &[Polygon<f64>]) -> MultiPolygon<f64> {
        match polygons {
            [] => MultiPolygon::new(vec![]),
            [single] => MultiPolygon::new(vec![single.clone()]),
            _ => {
                // Balanced pairwise union keeps intermediate results small
                let (left, right) = polygons.split_at(polygons.len() / 2);
                let (left, right) = rayon::join(|| self.union_all(left), || self.union_all(right));
                left.union(&right)
            }
        }
    }

    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if a.0.is_empty() || b.0.is_empty() {
            return MultiPolygon::new(vec![]);
        }
        a.intersection(b)
    }

    fn area(&self, geometry: &MultiPolygon<f64>) -> f64 {
        geometry.unsigned_area()
    }
}

/// Points with duplicates removed, ordered by coordinates
fn distinct_points(points: &[Point<f64>]) -> Vec<Point<f64>> {
    points
        .iter()
        .filter(|p| p.x().is_finite() && p.y().is_finite())
        .sorted_by(|a, b| a.x().total_cmp(&b.x()).then(a.y().total_cmp(&b.y())))
        .dedup_by(|a, b| a.x() == b.x() && a.y() == b.y())
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn ops() -> ConcaveHullOps {
        ConcaveHullOps::new(2.0)
    }

    fn square(min: f64, max: f64) -> Polygon<f64> {
        polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
        ]
    }

    #[test]
    fn fewer_than_three_distinct_points_make_no_hull() {
        let points = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(ops().hull(&points).is_none());
    }

    #[test]
    fn collinear_points_make_no_hull() {
        let points: Vec<_> = (0..5).map(|i| Point::new(f64::from(i), 0.0)).collect();
        assert!(ops().hull(&points).is_none());
    }

    #[test]
    fn hull_covers_a_square_of_points() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let hull = ops().hull(&points).unwrap();
        assert!((hull.unsigned_area() - 100.0).abs() < 1e-9);
    }

    /// Points filling an L made of two 10 m wide arms, 100 m long
    fn l_shape() -> Vec<Point<f64>> {
        let mut points = Vec::new();
        for i in 0..=10 {
            for j in 0..=1 {
                let along = f64::from(i) * 10.0;
                let across = f64::from(j) * 10.0;
                points.push(Point::new(along, across));
                points.push(Point::new(across, along));
            }
        }
        points
    }

    #[test]
    fn concavity_changes_the_hull() {
        let tight = ConcaveHullOps::new(1.0).hull(&l_shape()).unwrap();
        let loose = ConcaveHullOps::new(1000.0).hull(&l_shape()).unwrap();
        // A huge concavity never digs in and keeps the convex hull
        assert!((loose.unsigned_area() - 5950.0).abs() < 1e-6);
        assert!(tight.unsigned_area() < loose.unsigned_area() - 1.0);
    }

    #[test]
    fn union_counts_overlap_once() {
        let union = ops().union_all(&[square(0.0, 10.0), square(5.0, 15.0), square(100.0, 101.0)]);
        assert!((ops().area(&union) - (100.0 + 100.0 - 25.0 + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn intersection_with_nothing_is_empty() {
        let a = MultiPolygon::new(vec![square(0.0, 1.0)]);
        let empty = MultiPolygon::new(vec![]);
        assert_eq!(ops().area(&ops().intersection(&a, &empty)), 0.0);
    }
}
