//! Boundary-representation solids as handed over by a modelling kernel.
//!
//! A [`BrepSolid`] is a list of faces. Each face may carry a triangulation
//! (nodes plus node-index triples), an orientation flag telling whether the
//! triangulation's winding must be reversed to point outward, and an optional
//! placement transform that maps the nodes into the solid's frame.

use crate::errors::MinkowskiError;
use crate::float_types::Real;
use crate::mesh::Mesh;
use nalgebra::{Matrix4, Point3};
use std::fmt::Debug;

pub mod extract;

pub use extract::extract_triangles;

/// Whether a face's stored winding agrees with the outward direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Forward,
    Reversed,
}

impl Orientation {
    pub const fn flipped(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reversed,
            Orientation::Reversed => Orientation::Forward,
        }
    }
}

/// Nodes of one face plus triangles indexing into them.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    nodes: Vec<Point3<Real>>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Rejects triangles that reference a missing node.
    pub fn new(nodes: Vec<Point3<Real>>, triangles: Vec<[usize; 3]>) -> Result<Self, MinkowskiError> {
        if let Some((t, tri)) = triangles
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.iter().any(|&i| i >= nodes.len()))
        {
            return Err(MinkowskiError::InvalidTriangulation(format!(
                "triangle {t} {tri:?} references a node beyond {} nodes",
                nodes.len()
            )));
        }
        Ok(Triangulation { nodes, triangles })
    }

    pub fn nodes(&self) -> &[Point3<Real>] {
        &self.nodes
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }
}

/// One bounded surface patch of a solid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Face {
    /// Absent when the kernel has not meshed this face yet.
    pub triangulation: Option<Triangulation>,
    pub orientation: Orientation,
    /// Placement of the triangulation nodes; `None` means identity.
    pub location: Option<Matrix4<Real>>,
}

impl Face {
    pub const fn new(triangulation: Triangulation) -> Self {
        Face {
            triangulation: Some(triangulation),
            orientation: Orientation::Forward,
            location: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_location(mut self, location: Matrix4<Real>) -> Self {
        self.location = Some(location);
        self
    }
}

/// A native solid: the operand variant that needs mesh extraction before any
/// Minkowski stage can work on it.
#[derive(Debug, Clone)]
pub struct BrepSolid<S: Clone + Send + Sync + Debug> {
    pub faces: Vec<Face>,
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync + Debug> BrepSolid<S> {
    pub const fn new(faces: Vec<Face>, metadata: Option<S>) -> Self {
        BrepSolid { faces, metadata }
    }

    /// Wrap a polygon mesh: one forward face per polygon, fan-triangulated.
    pub fn from_mesh(mesh: &Mesh<S>) -> Self {
        let faces = mesh
            .polygons
            .iter()
            .filter(|poly| poly.vertices.len() >= 3)
            .map(|poly| {
                let nodes = poly.vertices.iter().map(|v| v.pos).collect::<Vec<_>>();
                let triangles = (1..nodes.len() - 1).map(|i| [0, i, i + 1]).collect();
                Face {
                    triangulation: Some(Triangulation { nodes, triangles }),
                    orientation: Orientation::Forward,
                    location: None,
                }
            })
            .collect();
        BrepSolid {
            faces,
            metadata: mesh.metadata.clone(),
        }
    }
}
