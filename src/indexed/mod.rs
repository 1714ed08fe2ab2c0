//! Indexed triangle meshes: shared vertex positions plus index triples.
//!
//! This is the form every Minkowski stage consumes. Meshes are only ever built
//! through validating constructors, and no stage mutates a mesh it did not
//! produce: operations borrow and return fresh meshes.

use crate::errors::MinkowskiError;
use crate::float_types::{
    PI, Real,
    parry3d::{query::PointQuery, shape::Triangle},
};
use crate::mesh::{Mesh, polygon::Polygon};
use crate::traits::CSGOps;
use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

pub mod convexity;
pub mod dedup;
pub mod stream;

pub use convexity::{ReflexEdge, is_weakly_convex, reflex_edges};
pub use dedup::{Dedup, VertexMerge, deduplicate};
pub use stream::{TriangleStream, TriangleStreamBuilder};

/// Unique vertex positions plus triangles referencing them by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    vertices: Vec<Point3<Real>>,
    faces: Vec<[usize; 3]>,
}

impl IndexedMesh {
    /// Build a mesh, checking that every index is in range and no face repeats
    /// an index.
    pub fn new(vertices: Vec<Point3<Real>>, faces: Vec<[usize; 3]>) -> Result<Self, MinkowskiError> {
        for (fi, face) in faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&i| i >= vertices.len()) {
                return Err(MinkowskiError::invalid_mesh(format!(
                    "face {fi} index {bad} is out of range (vertices.len = {})",
                    vertices.len()
                )));
            }
            if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                return Err(MinkowskiError::invalid_mesh(format!(
                    "face {fi} repeats an index: {face:?}"
                )));
            }
        }
        Ok(IndexedMesh { vertices, faces })
    }

    /// Caller guarantees the invariants (used by the deduplicator, which builds
    /// indices it just assigned).
    pub(crate) const fn from_parts_unchecked(
        vertices: Vec<Point3<Real>>,
        faces: Vec<[usize; 3]>,
    ) -> Self {
        IndexedMesh { vertices, faces }
    }

    /// Weld a polygon mesh into indexed form with exact vertex matching.
    pub fn from_mesh<S: Clone + Send + Sync + Debug>(mesh: &Mesh<S>) -> Self {
        deduplicate(&TriangleStream::from_shape(mesh), VertexMerge::Exact).mesh
    }

    /// One flat-shaded triangle polygon per face.
    pub fn to_mesh<S: Clone + Send + Sync + Debug>(&self, metadata: Option<S>) -> Mesh<S> {
        let polygons: Vec<Polygon<S>> = self
            .triangles()
            .map(|tri| Polygon::from_points(&tri, metadata.clone()))
            .collect();
        let mut mesh = Mesh::new();
        mesh.polygons = polygons;
        mesh.metadata = metadata;
        mesh
    }

    pub fn vertices(&self) -> &[Point3<Real>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Face corners as point triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<Real>; 3]> + '_ {
        self.faces.iter().map(|f| f.map(|i| self.vertices[i]))
    }

    /// Copy shifted by `offset`.
    pub fn translated(&self, offset: &Vector3<Real>) -> IndexedMesh {
        IndexedMesh {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Signed enclosed volume; positive when closed and outward-wound.
    pub fn volume(&self) -> Real {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
            .sum::<Real>()
            / 6.0
    }

    /// Every undirected edge is shared by exactly two faces.
    pub fn is_closed(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }
        let mut edge_counts: HashMap<(usize, usize), u32> = HashMap::new();
        for f in &self.faces {
            for (a, b) in [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])] {
                *edge_counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        edge_counts.values().all(|&c| c == 2)
    }

    /// Shell id per face, faces being connected through shared vertices.
    /// Ids are numbered from 0 in order of first appearance.
    fn face_shells(&self) -> Vec<usize> {
        let mut parent: Vec<usize> = (0..self.vertices.len()).collect();

        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for f in &self.faces {
            let r0 = find(&mut parent, f[0]);
            for &v in &f[1..] {
                let r = find(&mut parent, v);
                if r != r0 {
                    parent[r] = r0;
                }
            }
        }

        let mut ids: HashMap<usize, usize> = HashMap::new();
        self.faces
            .iter()
            .map(|f| {
                let root = find(&mut parent, f[0]);
                let next = ids.len();
                *ids.entry(root).or_insert(next)
            })
            .collect()
    }

    /// One vertex index per connected shell, in order of first appearance.
    pub fn shell_representatives(&self) -> Vec<usize> {
        let mut seen = HashSet::new();
        self.faces
            .iter()
            .zip(self.face_shells())
            .filter(|(_, shell)| seen.insert(*shell))
            .map(|(f, _)| f[0])
            .collect()
    }

    /// Number of connected shells.
    pub fn shells(&self) -> usize {
        self.shell_representatives().len()
    }

    /// One mesh per connected shell, each holding only the vertices it uses.
    pub fn split_shells(&self) -> Vec<IndexedMesh> {
        let shell_of = self.face_shells();
        let count = shell_of.iter().max().map_or(0, |m| m + 1);
        let mut remaps: Vec<HashMap<usize, usize>> = vec![HashMap::new(); count];
        let mut shells = vec![IndexedMesh::default(); count];

        for (f, &shell) in self.faces.iter().zip(&shell_of) {
            let out = &mut shells[shell];
            let remap = &mut remaps[shell];
            let face = f.map(|old| {
                *remap.entry(old).or_insert_with(|| {
                    out.vertices.push(self.vertices[old]);
                    out.vertices.len() - 1
                })
            });
            out.faces.push(face);
        }
        shells
    }

    /// Generalised winding number of `p`: the solid angle the surface spans
    /// seen from `p`, over `4π`. Close to 1 inside a closed outward-wound
    /// mesh and to 0 outside; meaningless for points on the surface.
    pub fn winding_number(&self, p: &Point3<Real>) -> Real {
        let total: Real = self
            .triangles()
            .map(|[a, b, c]| {
                let (a, b, c) = (a - p, b - p, c - p);
                let (la, lb, lc) = (a.norm(), b.norm(), c.norm());
                let det = a.dot(&b.cross(&c));
                let div = la * lb * lc + a.dot(&b) * lc + b.dot(&c) * la + c.dot(&a) * lb;
                2.0 * det.atan2(div)
            })
            .sum();
        total / (4.0 * PI)
    }

    /// Distance from `p` to the closest surface triangle; `Real::MAX` for an
    /// empty mesh.
    pub fn distance_to_surface(&self, p: &Point3<Real>) -> Real {
        self.triangles()
            .map(|[a, b, c]| Triangle::new(a, b, c).distance_to_local_point(p, false))
            .fold(Real::MAX, Real::min)
    }

    /// Whether `p` is inside the solid or within `eps` of its surface.
    pub fn contains_point(&self, p: &Point3<Real>, eps: Real) -> bool {
        self.distance_to_surface(p) <= eps || self.winding_number(p) > 0.5
    }

    /// Length of the bounding-box diagonal; 0 for an empty mesh.
    pub fn extent(&self) -> Real {
        let Some(first) = self.vertices.first() else {
            return 0.0;
        };
        let (mins, maxs) = self
            .vertices
            .iter()
            .fold((*first, *first), |(lo, hi), v| (lo.inf(v), hi.sup(v)));
        (maxs - mins).norm()
    }
}
