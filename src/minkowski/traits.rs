//! Capabilities the Minkowski pipeline delegates to.
//!
//! Each trait has one shipped implementation; tests and callers can swap in
//! their own (for instance a decomposer that always fails, to exercise the
//! fallback path).

use crate::errors::MinkowskiError;
use crate::float_types::Real;
use crate::indexed::IndexedMesh;
use crate::mesh::Mesh;
use crate::minkowski::Operand;
use nalgebra::Point3;
use std::fmt::Debug;

/// Split a closed, non-convex mesh into convex parts.
pub trait ConvexDecomposer: Send + Sync {
    /// Ordered, non-empty list of convex parts, or
    /// [`MinkowskiError::Decomposition`].
    fn decompose(&self, mesh: &IndexedMesh) -> Result<Vec<IndexedMesh>, MinkowskiError>;
}

/// Convex hull of a point cloud.
pub trait ConvexHull: Send + Sync {
    /// Closed, outward-wound hull, or [`MinkowskiError::Hull`] when the points
    /// do not span a volume.
    fn hull(&self, points: &[Point3<Real>]) -> Result<IndexedMesh, MinkowskiError>;
}

/// Boolean union of solids.
pub trait BooleanKernel<S: Clone + Send + Sync + Debug>: Send + Sync {
    /// Union of all `parts`, or [`MinkowskiError::Union`].
    fn union_all(&self, parts: Vec<Mesh<S>>) -> Result<Mesh<S>, MinkowskiError>;
}

/// Decomposition-free Minkowski sum, used when the fast path fails.
pub trait ExactMinkowski<S: Clone + Send + Sync + Debug>: Send + Sync {
    fn minkowski(&self, a: &Operand<S>, b: &Operand<S>) -> Result<Mesh<S>, MinkowskiError>;
}
