//! Turn the result part list into one solid.

use crate::errors::MinkowskiError;
use crate::indexed::IndexedMesh;
use crate::mesh::Mesh;
use crate::minkowski::traits::BooleanKernel;
use crate::traits::CSGOps;
use std::fmt::Debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// [`BooleanKernel`] built on the crate's BSP-tree union.
///
/// Parts are unioned as a balanced tree (neighbours first), which keeps the BSP
/// trees of both inputs to each union roughly the same size.
#[derive(Debug, Clone, Copy, Default)]
pub struct BspKernel;

impl<S: Clone + Send + Sync + Debug> BooleanKernel<S> for BspKernel {
    fn union_all(&self, parts: Vec<Mesh<S>>) -> Result<Mesh<S>, MinkowskiError> {
        if parts.is_empty() {
            return Err(MinkowskiError::union("nothing to union"));
        }
        let inputs = parts.len();
        let mut level = parts;
        while level.len() > 1 {
            level = union_level(level);
        }
        let Some(solid) = level.pop() else {
            return Err(MinkowskiError::union("union reduced to nothing"));
        };

        if solid.is_empty() {
            return Err(MinkowskiError::union(format!(
                "union of {inputs} non-empty parts came back empty"
            )));
        }
        if !solid.is_finite() {
            return Err(MinkowskiError::union("union produced non-finite coordinates"));
        }
        tracing::debug!(inputs, polygons = solid.polygons.len(), "bsp union");
        Ok(solid)
    }
}

fn union_pair<S: Clone + Send + Sync + Debug>(chunk: &[Mesh<S>]) -> Mesh<S> {
    match chunk {
        [a, b] => a.union(b),
        [a] => a.clone(),
        _ => Mesh::new(),
    }
}

#[cfg(not(feature = "parallel"))]
fn union_level<S: Clone + Send + Sync + Debug>(level: Vec<Mesh<S>>) -> Vec<Mesh<S>> {
    level.chunks(2).map(union_pair).collect()
}

#[cfg(feature = "parallel")]
fn union_level<S: Clone + Send + Sync + Debug>(level: Vec<Mesh<S>>) -> Vec<Mesh<S>> {
    level.par_chunks(2).map(union_pair).collect()
}

/// 0 parts → the explicit empty solid; 1 part → that part; more → kernel union.
pub fn assemble<S: Clone + Send + Sync + Debug>(
    parts: &[IndexedMesh],
    kernel: &dyn BooleanKernel<S>,
    metadata: Option<S>,
) -> Result<Mesh<S>, MinkowskiError> {
    match parts {
        [] => {
            tracing::debug!("no partial sums; result is the empty solid");
            Ok(Mesh::from_polygons(&[], metadata))
        },
        [single] => Ok(single.to_mesh(metadata)),
        many => kernel.union_all(
            many.iter()
                .map(|part| part.to_mesh(metadata.clone()))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::Real;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingKernel(AtomicUsize);

    impl BooleanKernel<()> for CountingKernel {
        fn union_all(&self, parts: Vec<Mesh<()>>) -> Result<Mesh<()>, MinkowskiError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            BspKernel.union_all(parts)
        }
    }

    fn cube_at(x: Real) -> IndexedMesh {
        IndexedMesh::from_mesh(&Mesh::<()>::cube(1.0, None).translate(x, 0.0, 0.0))
    }

    #[test]
    fn no_parts_is_empty_solid() {
        let kernel = CountingKernel(AtomicUsize::new(0));
        let solid = assemble(&[], &kernel, None).unwrap();
        assert!(solid.is_empty());
        assert_eq!(kernel.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn single_part_skips_union() {
        let kernel = CountingKernel(AtomicUsize::new(0));
        let solid = assemble(&[cube_at(0.0)], &kernel, None).unwrap();
        assert_eq!(solid.polygons.len(), 12);
        assert_eq!(kernel.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn several_parts_are_unioned() {
        let kernel = CountingKernel(AtomicUsize::new(0));
        let parts = [cube_at(0.0), cube_at(0.5), cube_at(3.0)];
        let solid = assemble(&parts, &kernel, None).unwrap();
        assert_eq!(kernel.0.load(Ordering::SeqCst), 1);
        assert!((solid.volume() - 2.5).abs() < 1e-6, "volume {}", solid.volume());
    }

    #[test]
    fn empty_union_input_is_an_error() {
        let err = BooleanKernel::<()>::union_all(&BspKernel, Vec::new()).unwrap_err();
        assert!(matches!(err, MinkowskiError::Union(_)));
    }
}
