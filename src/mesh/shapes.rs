//! Primitive solids used as Minkowski operands.

use crate::float_types::{PI, Real, TAU};
use crate::mesh::Mesh;
use crate::mesh::polygon::Polygon;
use nalgebra::Point3;
use std::fmt::Debug;

impl<S: Clone + Debug + Send + Sync> Mesh<S> {
    /// Axis-aligned box with one corner at the origin and the opposite corner
    /// at `(width, length, height)`.
    pub fn cuboid(width: Real, length: Real, height: Real, metadata: Option<S>) -> Mesh<S> {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),          // 0: origin
            Point3::new(width, 0.0, 0.0),        // 1: +X
            Point3::new(width, length, 0.0),     // 2: +X+Y
            Point3::new(0.0, length, 0.0),       // 3: +Y
            Point3::new(0.0, 0.0, height),       // 4: +Z
            Point3::new(width, 0.0, height),     // 5: +X+Z
            Point3::new(width, length, height),  // 6: +X+Y+Z
            Point3::new(0.0, length, height),    // 7: +Y+Z
        ];

        // CCW seen from outside
        let faces: [[usize; 4]; 6] = [
            [0, 3, 2, 1], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [3, 7, 6, 2], // back
            [0, 4, 7, 3], // left
            [1, 2, 6, 5], // right
        ];

        let polygons: Vec<Polygon<S>> = faces
            .iter()
            .map(|f| Polygon::from_points(&f.map(|i| corners[i]), metadata.clone()))
            .collect();
        Mesh::from_polygons(&polygons, metadata)
    }

    pub fn cube(width: Real, metadata: Option<S>) -> Mesh<S> {
        Self::cuboid(width, width, width, metadata)
    }

    /// UV sphere centred at the origin.
    ///
    /// Ring vertices are generated once per `(segment, stack)` index and looked up
    /// modulo `segments`, and both poles are single exact points, so neighbouring
    /// faces share bit-identical corners and the surface welds into a closed mesh.
    pub fn sphere(radius: Real, segments: usize, stacks: usize, metadata: Option<S>) -> Mesh<S> {
        let segments = segments.max(3);
        let stacks = stacks.max(2);

        let ring_point = |i: usize, j: usize| -> Point3<Real> {
            if j == 0 {
                return Point3::new(0.0, radius, 0.0);
            }
            if j == stacks {
                return Point3::new(0.0, -radius, 0.0);
            }
            let theta = (i % segments) as Real / segments as Real * TAU;
            let phi = j as Real / stacks as Real * PI;
            Point3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            )
        };

        let mut polygons = Vec::with_capacity(segments * stacks);
        for i in 0..segments {
            for j in 0..stacks {
                let mut loop_points = vec![ring_point(i, j)];
                if j > 0 {
                    loop_points.push(ring_point(i + 1, j));
                }
                loop_points.push(ring_point(i + 1, j + 1));
                if j + 1 < stacks {
                    loop_points.push(ring_point(i, j + 1));
                }
                polygons.push(Polygon::from_points(&loop_points, metadata.clone()));
            }
        }
        Mesh::from_polygons(&polygons, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexed::IndexedMesh;

    #[test]
    fn cube_volume() {
        let c: Mesh<()> = Mesh::cube(2.0, None);
        assert_eq!(c.polygons.len(), 6);
        assert!((c.volume() - 8.0).abs() < 1e-12);
        assert!(IndexedMesh::from_mesh(&c).is_closed());
    }

    #[test]
    fn sphere_is_closed_and_close_to_ball_volume() {
        let s: Mesh<()> = Mesh::sphere(1.0, 24, 12, None);
        let welded = IndexedMesh::from_mesh(&s);
        assert!(welded.is_closed());
        assert_eq!(welded.shells(), 1);
        let ball = 4.0 / 3.0 * PI;
        let v = s.volume();
        assert!(v > 0.9 * ball && v < ball, "volume {v}");
    }
}
