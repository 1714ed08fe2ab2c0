//! Oriented planes and the point / polygon classification used by the BSP tree.

use crate::float_types::{EPSILON, Real};
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use robust::{Coord3D, orient3d};
use std::fmt::Debug;

// Classification bits; SPANNING == FRONT | BACK
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// A plane `n · p = w` with unit normal `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

impl Plane {
    /// Plane through `a`, `b`, `c`; the normal follows `(b - a) × (c - a)`.
    /// Returns `None` for collinear input.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        if n.norm_squared() < Real::EPSILON * Real::EPSILON {
            return None;
        }
        let normal = n.normalize();
        Some(Plane {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    /// Best-fit plane of a polygon loop using Newell's method, which stays
    /// well-defined for slivers produced by repeated splitting.
    pub fn from_vertices(vertices: &[Vertex]) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let newell = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .fold(Vector3::zeros(), |acc: Vector3<Real>, (curr, next)| {
                acc + curr.pos.coords.cross(&next.pos.coords)
            });
        if newell.norm_squared() < Real::EPSILON * Real::EPSILON {
            return None;
        }
        let normal = newell.normalize();
        let centroid = vertices
            .iter()
            .fold(Vector3::zeros(), |acc: Vector3<Real>, v| acc + v.pos.coords)
            / vertices.len() as Real;
        Some(Plane {
            normal,
            w: normal.dot(&centroid),
        })
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] (within [`EPSILON`]).
    ///
    /// The orientation is evaluated with `robust::orient3d` against an orthonormal
    /// frame spanning the plane, so the determinant equals the signed distance.
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        let origin = Point3::from(self.normal * self.w);

        // Build an orthonormal basis {u, v} that spans the plane
        let mut u = if self.normal.z.abs() > self.normal.x.abs()
            || self.normal.z.abs() > self.normal.y.abs()
        {
            Vector3::x().cross(&self.normal)
        } else {
            Vector3::z().cross(&self.normal)
        };
        u.normalize_mut();
        let v = self.normal.cross(&u).normalize();

        let sign = orient3d(
            coord(&origin),
            coord(&(origin + u)),
            coord(&(origin + v)),
            coord(point),
        );

        if sign > EPSILON as f64 {
            BACK
        } else if sign < -(EPSILON as f64) {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Splits a polygon by this plane, returning four buckets:
    /// `(coplanar_front, coplanar_back, front, back)`.
    ///
    /// Spanning polygons keep the plane of the original polygon; recomputing it
    /// from the cut loop would let rounding tilt thin fragments.
    #[allow(clippy::type_complexity)]
    pub fn split_polygon<S: Clone + Send + Sync + Debug>(
        &self,
        polygon: &Polygon<S>,
    ) -> (
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
    ) {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        let types: Vec<i8> = polygon
            .vertices
            .iter()
            .map(|v| self.orient_point(&v.pos))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let n = polygon.vertices.len();
                let mut split_front = Vec::<Vertex>::with_capacity(n + 1);
                let mut split_back = Vec::<Vertex>::with_capacity(n + 1);

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (type_i, type_j) = (types[i], types[j]);
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    if type_i != BACK {
                        split_front.push(vertex_i.clone());
                    }
                    if type_i != FRONT {
                        split_back.push(vertex_i.clone());
                    }

                    if (type_i | type_j) == SPANNING {
                        let denom = self.normal.dot(&(vertex_j.pos - vertex_i.pos));
                        if denom.abs() > EPSILON {
                            let t = (self.w - self.normal.dot(&vertex_i.pos.coords)) / denom;
                            let vertex_new = vertex_i.interpolate(vertex_j, t);
                            split_front.push(vertex_new.clone());
                            split_back.push(vertex_new);
                        }
                    }
                }

                if split_front.len() >= 3 {
                    front.push(polygon.with_loop(split_front));
                }
                if split_back.len() >= 3 {
                    back.push(polygon.with_loop(split_back));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }
}

#[inline]
fn coord(p: &Point3<Real>) -> Coord3D<f64> {
    Coord3D {
        x: p.x as f64,
        y: p.y as f64,
        z: p.z as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orient_point_sides() {
        let plane = Plane::from_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_eq!(plane.orient_point(&Point3::new(0.3, 0.3, 1.0)), FRONT);
        assert_eq!(plane.orient_point(&Point3::new(0.3, 0.3, -1.0)), BACK);
        assert_eq!(plane.orient_point(&Point3::new(5.0, -2.0, 0.0)), COPLANAR);
    }

    #[test]
    fn collinear_points_have_no_plane() {
        assert!(
            Plane::from_points(
                &Point3::new(0.0, 0.0, 0.0),
                &Point3::new(1.0, 1.0, 1.0),
                &Point3::new(2.0, 2.0, 2.0),
            )
            .is_none()
        );
    }

    #[test]
    fn split_spanning_triangle() {
        let tri: Polygon<()> = Polygon::from_points(
            &[
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            None,
        );
        let cut = Plane {
            normal: Vector3::x(),
            w: 0.0,
        };
        let (cf, cb, f, b) = cut.split_polygon(&tri);
        assert!(cf.is_empty() && cb.is_empty());
        assert_eq!(f.len(), 1);
        assert_eq!(b.len(), 1);
        assert!(f[0].vertices.iter().all(|v| v.pos.x >= -1e-12));
        assert!(b[0].vertices.iter().all(|v| v.pos.x <= 1e-12));
    }
}
