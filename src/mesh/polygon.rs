//! Planar convex polygons, the faces stored in a [`Mesh`](crate::mesh::Mesh).

use crate::float_types::{
    Real,
    parry3d::bounding_volume::Aabb,
};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;
use std::sync::OnceLock;

/// A polygon, defined by a list of vertices and the plane they lie in.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    pub vertices: Vec<Vertex>,
    pub plane: Plane,
    /// Lazily calculated AABB that spans `vertices`.
    pub bounding_box: OnceLock<Aabb>,
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync + Debug> Polygon<S> {
    /// Create a polygon from a vertex loop. The plane is fitted to the loop; a
    /// degenerate loop gets the `+Z` plane through its first vertex.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        let plane = Plane::from_vertices(&vertices).unwrap_or_else(|| Plane {
            normal: Vector3::z(),
            w: vertices.first().map_or(0.0, |v| v.pos.z),
        });
        Polygon {
            vertices,
            plane,
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Flat-shaded polygon through `points`; every vertex takes the facet normal.
    pub fn from_points(points: &[Point3<Real>], metadata: Option<S>) -> Self {
        let mut poly = Polygon::new(
            points
                .iter()
                .map(|p| Vertex::new(*p, Vector3::zeros()))
                .collect(),
            metadata,
        );
        let normal = poly.plane.normal;
        for v in &mut poly.vertices {
            *v = Vertex::on_facet(v.pos, &normal);
        }
        poly
    }

    /// Same plane and metadata, different loop. Used by plane splitting.
    pub(crate) fn with_loop(&self, vertices: Vec<Vertex>) -> Self {
        Polygon {
            vertices,
            plane: self.plane.clone(),
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
        }
    }

    /// Reverse winding, vertex normals and plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.vertices.iter_mut().for_each(Vertex::flip);
        self.plane.flip();
    }

    /// Fan triangulation. Polygons here are convex (hull facets and their BSP
    /// fragments), so a fan from the first vertex is exact.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        if self.vertices.len() < 3 {
            return Vec::new();
        }
        let v0 = &self.vertices[0];
        self.vertices[1..]
            .windows(2)
            .map(|w| [v0.clone(), w[0].clone(), w[1].clone()])
            .collect()
    }

    /// Twice the area of the loop, projected on its own plane.
    pub fn doubled_area(&self) -> Real {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .fold(Vector3::zeros(), |acc: Vector3<Real>, (a, b)| {
                acc + a.pos.coords.cross(&b.pos.coords)
            })
            .dot(&self.plane.normal)
    }

    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in &self.vertices {
                mins = mins.inf(&v.pos);
                maxs = maxs.sup(&v.pos);
            }
            Aabb::new(mins, maxs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon<()> {
        Polygon::from_points(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            None,
        )
    }

    #[test]
    fn square_plane_and_area() {
        let sq = unit_square();
        assert!((sq.plane.normal - Vector3::z()).norm() < 1e-12);
        assert!((sq.doubled_area() - 2.0).abs() < 1e-12);
        assert_eq!(sq.triangulate().len(), 2);
    }

    #[test]
    fn flip_reverses_everything() {
        let mut sq = unit_square();
        sq.flip();
        assert!((sq.plane.normal + Vector3::z()).norm() < 1e-12);
        assert!((sq.doubled_area() - 2.0).abs() < 1e-12);
        assert_eq!(sq.vertices[0].pos, Point3::new(0.0, 1.0, 0.0));
        assert!(sq.vertices.iter().all(|v| v.normal == -Vector3::z()));
    }
}
