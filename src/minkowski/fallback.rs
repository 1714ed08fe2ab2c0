//! Decomposition-free Minkowski sum.
//!
//! For closed solids `A` and `B` with boundaries `∂A` and `∂B`:
//!
//! ```text
//! A ⊕ B = (∂A ⊕ ∂B) ∪ (A + b_i) ∪ (a_j + B)
//! ```
//!
//! where `b_i` is one vertex of every connected shell of `B` (and `a_j` of `A`).
//! A point of `A ⊕ B` that is not on the boundary sum has a whole shell of `B`
//! (or of `A`) translated inside the other operand, which the two translated
//! copies cover. `∂A ⊕ ∂B` is the union of the convex sums of every pair of
//! boundary triangles. No step needs convexity, so this works on any input the
//! decomposer chokes on, at the price of `|faces A| · |faces B|` hulls and one
//! large union.

use crate::errors::MinkowskiError;
use crate::float_types::Real;
use crate::indexed::{IndexedMesh, VertexMerge};
use crate::mesh::Mesh;
use crate::minkowski::Operand;
use crate::minkowski::assemble::BspKernel;
use crate::minkowski::hull::ChullHull;
use crate::minkowski::traits::{BooleanKernel, ConvexHull, ExactMinkowski};
use nalgebra::Point3;
use std::fmt::Debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// [`ExactMinkowski`] built from triangle-pair hulls and a boolean union.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrianglePairMinkowski {
    pub hull: ChullHull,
    pub kernel: BspKernel,
}

impl TrianglePairMinkowski {
    /// Convex sums of every boundary triangle pair. Pairs whose sum is flat
    /// (parallel coplanar triangles) contribute nothing and are dropped.
    fn boundary_sum(&self, a: &IndexedMesh, b: &IndexedMesh) -> Vec<IndexedMesh> {
        let tris_a: Vec<_> = a.triangles().collect();
        let tris_b: Vec<_> = b.triangles().collect();

        let pair_hull = |ta: &[Point3<Real>; 3]| {
            tris_b
                .iter()
                .filter_map(|tb| {
                    let cloud: Vec<_> = ta
                        .iter()
                        .flat_map(|pa| tb.iter().map(move |pb| pa + pb.coords))
                        .collect();
                    self.hull.hull(&cloud).ok()
                })
                .collect::<Vec<_>>()
        };

        #[cfg(feature = "parallel")]
        let pieces: Vec<IndexedMesh> = tris_a.par_iter().flat_map_iter(pair_hull).collect();

        #[cfg(not(feature = "parallel"))]
        let pieces: Vec<IndexedMesh> = tris_a.iter().flat_map(pair_hull).collect();

        pieces
    }
}

/// `mesh` translated to one vertex of every shell of `by`.
fn shell_copies(mesh: &IndexedMesh, by: &IndexedMesh) -> Vec<IndexedMesh> {
    by.shell_representatives()
        .into_iter()
        .map(|v| mesh.translated(&by.vertices()[v].coords))
        .collect()
}

impl<S: Clone + Send + Sync + Debug> ExactMinkowski<S> for TrianglePairMinkowski {
    fn minkowski(&self, a: &Operand<S>, b: &Operand<S>) -> Result<Mesh<S>, MinkowskiError> {
        let metadata = a.metadata();
        let mesh_a = a.to_indexed(VertexMerge::Exact).mesh;
        let mesh_b = b.to_indexed(VertexMerge::Exact).mesh;

        if mesh_a.is_empty() || mesh_b.is_empty() {
            tracing::debug!("exact minkowski with an empty operand");
            return Ok(Mesh::from_polygons(&[], metadata));
        }

        let mut pieces = self.boundary_sum(&mesh_a, &mesh_b);
        let boundary_pieces = pieces.len();
        pieces.extend(shell_copies(&mesh_a, &mesh_b));
        pieces.extend(shell_copies(&mesh_b, &mesh_a));

        tracing::debug!(
            faces_a = mesh_a.faces().len(),
            faces_b = mesh_b.faces().len(),
            boundary_pieces,
            pieces = pieces.len(),
            "exact minkowski pieces"
        );

        self.kernel.union_all(
            pieces
                .iter()
                .map(|piece| piece.to_mesh(metadata.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::CSGOps;

    fn tetra() -> IndexedMesh {
        IndexedMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn tetrahedra_sum_spans_doubled_tetrahedron() {
        let a: Operand<()> = Operand::Indexed(tetra());
        let b: Operand<()> = Operand::Indexed(tetra());
        let solid = TrianglePairMinkowski::default().minkowski(&a, &b).unwrap();
        assert!(!solid.is_empty());

        let bb = solid.bounding_box();
        for axis in 0..3 {
            assert!(bb.mins[axis].abs() < 1e-9, "min {axis} = {}", bb.mins[axis]);
            assert!((bb.maxs[axis] - 2.0).abs() < 1e-9, "max {axis} = {}", bb.maxs[axis]);
        }
    }

    #[test]
    fn empty_operand_gives_empty_solid() {
        let a: Operand<()> = Operand::Indexed(tetra());
        let b: Operand<()> = Operand::Indexed(IndexedMesh::default());
        let solid = TrianglePairMinkowski::default().minkowski(&a, &b).unwrap();
        assert!(solid.is_empty());
    }

    #[test]
    fn one_copy_per_shell() {
        let t = tetra();
        let copies = shell_copies(&t, &t);
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].vertices()[0], Point3::origin());
    }
}
