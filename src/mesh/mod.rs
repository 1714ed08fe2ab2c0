//! `Mesh` struct and implementations of the `CSGOps` trait for `Mesh`

use crate::float_types::{
    Real,
    parry3d::bounding_volume::{Aabb, BoundingVolume},
};
use crate::mesh::{bsp::Node, plane::Plane, polygon::Polygon, vertex::Vertex};
use crate::traits::CSGOps;
use nalgebra::{Matrix4, Point3};
use std::{fmt::Debug, sync::OnceLock};

pub mod bsp;
pub mod plane;
pub mod polygon;
pub mod shapes;
pub mod triangulated;
pub mod vertex;

/// A solid as a soup of outward-wound planar polygons.
#[derive(Clone, Debug)]
pub struct Mesh<S: Clone + Send + Sync + Debug> {
    /// 3D polygons for volumetric shapes
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    /// Metadata
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync + Debug> Mesh<S> {
    /// Build a Mesh from an existing polygon list
    pub fn from_polygons(polygons: &[Polygon<S>], metadata: Option<S>) -> Self {
        let mut mesh = Mesh::new();
        mesh.polygons = polygons.to_vec();
        mesh.metadata = metadata;
        mesh
    }

    /// True when the mesh holds no polygons (the explicit empty solid).
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Split polygons into (may_touch, cannot_touch) using bounding‑box tests
    fn partition_polys(
        polys: &[Polygon<S>],
        other_bb: &Aabb,
    ) -> (Vec<Polygon<S>>, Vec<Polygon<S>>) {
        let mut maybe = Vec::new();
        let mut never = Vec::new();
        for p in polys {
            if p.bounding_box().intersects(other_bb) {
                maybe.push(p.clone());
            } else {
                never.push(p.clone());
            }
        }
        (maybe, never)
    }

    /// Helper to collect all vertices from the mesh.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.clone())
            .collect()
    }

    /// Triangulate each polygon in the mesh, returning a mesh of triangles only.
    pub fn triangulate(&self) -> Mesh<S> {
        let polygons = self
            .polygons
            .iter()
            .flat_map(|poly| {
                poly.triangulate()
                    .into_iter()
                    .map(move |tri| poly.with_loop(tri.to_vec()))
            })
            .collect::<Vec<_>>();
        Mesh::from_polygons(&polygons, self.metadata.clone())
    }

    /// Signed enclosed volume (divergence theorem over the fan triangles).
    /// Positive for a closed, outward-wound surface.
    pub fn volume(&self) -> Real {
        self.polygons
            .iter()
            .flat_map(|poly| poly.triangulate())
            .map(|[a, b, c]| a.pos.coords.dot(&b.pos.coords.cross(&c.pos.coords)))
            .sum::<Real>()
            / 6.0
    }

    /// Whether every coordinate in the mesh is finite.
    pub fn is_finite(&self) -> bool {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.iter())
            .all(|v| v.pos.coords.iter().all(|c| c.is_finite()))
    }
}

impl<S: Clone + Send + Sync + Debug> CSGOps for Mesh<S> {
    /// Returns a new empty Mesh
    fn new() -> Self {
        Mesh {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            metadata: None,
        }
    }

    /// Return a new Mesh representing union of the two Meshes.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union(&self, other: &Mesh<S>) -> Mesh<S> {
        if self.is_empty() {
            return Mesh::from_polygons(&other.polygons, self.metadata.clone());
        }
        if other.is_empty() {
            return self.clone();
        }

        // avoid splitting obvious non‑intersecting faces
        let (a_clip, a_passthru) =
            Self::partition_polys(&self.polygons, &other.bounding_box());
        let (b_clip, b_passthru) =
            Self::partition_polys(&other.polygons, &self.bounding_box());

        let mut a = Node::from_polygons(&a_clip);
        let mut b = Node::from_polygons(&b_clip);

        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());

        // combine results and untouched faces
        let mut final_polys = a.all_polygons();
        final_polys.extend(a_passthru);
        final_polys.extend(b_passthru);

        Mesh {
            polygons: final_polys,
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
        }
    }

    /// Apply an arbitrary 3D transform (as a 4x4 matrix) to the mesh.
    ///
    /// A mirroring transform (negative determinant) also reverses every polygon
    /// so the surface keeps pointing outward.
    fn transform(&self, mat: &Matrix4<Real>) -> Mesh<S> {
        let mat_inv_transpose = mat
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or_else(Matrix4::identity);
        let mirrored = mat.fixed_view::<3, 3>(0, 0).determinant() < 0.0;
        let mut mesh = self.clone();

        for poly in &mut mesh.polygons {
            for vert in &mut poly.vertices {
                vert.pos = mat.transform_point(&vert.pos);
                let n = mat_inv_transpose.transform_vector(&vert.normal);
                vert.normal = n.try_normalize(Real::EPSILON).unwrap_or(n);
            }
            if mirrored {
                poly.vertices.reverse();
            }

            // keep the cached plane consistent with the new vertex positions
            if let Some(plane) = Plane::from_vertices(&poly.vertices) {
                poly.plane = plane;
            }
            poly.bounding_box = OnceLock::new();
        }

        // invalidate the old cached bounding box
        mesh.bounding_box = OnceLock::new();

        mesh
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the 3D bounds of all `polygons`.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in self.polygons.iter().flat_map(|p| p.vertices.iter()) {
                mins = mins.inf(&v.pos);
                maxs = maxs.sup(&v.pos);
            }

            // If still uninitialized (e.g., no polygons), return a trivial AABB at origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            Aabb::new(mins, maxs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_disjoint_cubes_keeps_both() {
        let a: Mesh<()> = Mesh::cube(1.0, None);
        let b = Mesh::cube(1.0, None).translate(3.0, 0.0, 0.0);
        let u = a.union(&b);
        assert_eq!(u.polygons.len(), 12);
        assert!((u.volume() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn union_of_overlapping_cubes_has_merged_volume() {
        let a: Mesh<()> = Mesh::cube(2.0, None);
        let b = Mesh::cube(2.0, None).translate(1.0, 0.0, 0.0);
        let u = a.union(&b);
        assert!((u.volume() - 12.0).abs() < 1e-6, "volume {}", u.volume());
        let bb = u.bounding_box();
        assert!((bb.maxs.x - 3.0).abs() < 1e-12);
    }

    #[test]
    fn union_with_empty_is_identity() {
        let a: Mesh<()> = Mesh::cube(1.0, None);
        assert_eq!(Mesh::new().union(&a).polygons.len(), 6);
        assert_eq!(a.union(&Mesh::new()).polygons.len(), 6);
    }

    #[test]
    fn mirror_keeps_volume_positive() {
        let a: Mesh<()> = Mesh::cube(1.0, None);
        let m = a.scale(-1.0, 1.0, 1.0);
        assert!((m.volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn center_moves_box_to_origin() {
        let c: Mesh<()> = Mesh::cube(10.0, None).center();
        let bb = c.bounding_box();
        assert_eq!(bb.mins, Point3::new(-5.0, -5.0, -5.0));
        assert_eq!(bb.maxs, Point3::new(5.0, 5.0, 5.0));
    }
}
