mod support;

use csg_minkowski::{
    CSGOps, IndexedMesh, Mesh, MinkowskiError, Operand, SumPath,
    float_types::Real,
    minkowski::{
        BooleanKernel, BspKernel, ChullHull, ConvexDecomposer, ConvexHull, Minkowski,
        MinkowskiConfig, TrianglePairMinkowski,
    },
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use support::{approx_eq, bounding_box, init_tracing, l_prism, tetrahedron};

/// Union kernel that counts how often it is asked to work.
#[derive(Clone, Default)]
struct CountingKernel(Arc<AtomicUsize>);

impl BooleanKernel<()> for CountingKernel {
    fn union_all(&self, parts: Vec<Mesh<()>>) -> Result<Mesh<()>, MinkowskiError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        BspKernel.union_all(parts)
    }
}

struct RefusingDecomposer;

impl ConvexDecomposer for RefusingDecomposer {
    fn decompose(&self, _: &IndexedMesh) -> Result<Vec<IndexedMesh>, MinkowskiError> {
        Err(MinkowskiError::Decomposition("refusing to decompose".into()))
    }
}

fn serial() -> MinkowskiConfig {
    MinkowskiConfig::default().with_parallel(false)
}

#[test]
fn cube_plus_sphere_takes_single_pair() {
    init_tracing();
    let cube: Mesh<()> = Mesh::cube(10.0, None).center();
    let sphere: Mesh<()> = Mesh::sphere(5.0, 16, 8, None);
    let sphere_vertices = IndexedMesh::from_mesh(&sphere).vertices().len();

    // both are convex, so the sum is the hull of every pairwise vertex sum
    let corners = IndexedMesh::from_mesh(&cube);
    let ball = IndexedMesh::from_mesh(&sphere);
    let cloud: Vec<_> = corners
        .vertices()
        .iter()
        .flat_map(|a| ball.vertices().iter().map(move |b| a + b.coords))
        .collect();
    let expected = ChullHull::default().hull(&cloud).unwrap().volume();

    let kernel = CountingKernel::default();
    let unions = kernel.0.clone();
    let m: Minkowski<()> = Minkowski::new(serial()).with_kernel(kernel);
    let out = m.sum(&cube.into(), &sphere.into()).unwrap();

    println!("cube ⊕ sphere: {:?}", out.stats);
    assert_eq!(out.path, SumPath::Decomposed);
    assert_eq!(out.stats.parts_a, 1, "a cube is convex");
    assert_eq!(out.stats.parts_b, 1, "a uv sphere is convex");
    assert_eq!(out.stats.pairs, 1);
    assert_eq!(out.stats.result_parts, 1);
    assert_eq!(unions.load(Ordering::SeqCst), 0, "a single part needs no union");

    let indexed = IndexedMesh::from_mesh(&out.solid);
    assert!(indexed.vertices().len() <= 8 * sphere_vertices);
    let volume = out.solid.volume();
    assert!(approx_eq(volume, expected, 1e-6 * expected), "volume {volume}, expected {expected}");
    assert!(volume > 1000.0 + ball.volume());

    // the box of the sum is the cube's box grown by the sphere radius
    let bb = bounding_box(&out.solid);
    for axis in 0..3 {
        assert!(approx_eq(bb[axis], -10.0, 1e-9), "min {axis} = {}", bb[axis]);
        assert!(approx_eq(bb[axis + 3], 10.0, 1e-9), "max {axis} = {}", bb[axis + 3]);
    }
}

#[test]
fn l_prism_is_decomposed_and_parts_are_unioned() {
    init_tracing();
    let kernel = CountingKernel::default();
    let unions = kernel.0.clone();
    let m: Minkowski<()> = Minkowski::new(serial()).with_kernel(kernel);

    let a = Operand::Indexed(l_prism());
    let b: Operand<()> = Mesh::cube(0.25, None).into();
    let out = m.sum(&a, &b).unwrap();

    println!("L ⊕ cube: {:?}", out.stats);
    assert_eq!(out.path, SumPath::Decomposed);
    assert_eq!(out.stats.parts_a, 2, "one cut through the inner corner");
    assert_eq!(out.stats.parts_b, 1);
    assert_eq!(out.stats.pairs, 2);
    assert_eq!(out.stats.result_parts, 2);
    assert_eq!(unions.load(Ordering::SeqCst), 1);

    // the L grown by 0.25 along x and y, times the grown height
    let expected: Real = (3.0 + 0.25 * 2.0 + 0.25 * 2.0 + 0.25 * 0.25) * 1.25;
    assert!(approx_eq(expected, 5.078125, 1e-12));
    let volume = out.solid.volume();
    assert!(approx_eq(volume, expected, 1e-6), "volume {volume}");

    let bb = bounding_box(&out.solid);
    let box_expected = [0.0, 0.0, 0.0, 2.25, 2.25, 1.25];
    for (got, want) in bb.iter().zip(box_expected) {
        assert!(approx_eq(*got, want, 1e-9), "bounding box {bb:?}");
    }
}

#[test]
fn refused_decomposition_falls_back_to_exact_sum() {
    init_tracing();
    let m: Minkowski<()> = Minkowski::new(serial())
        .with_decomposer(RefusingDecomposer)
        .with_exact(TrianglePairMinkowski::default());

    let a = Operand::Indexed(l_prism());
    let b = Operand::Indexed(tetrahedron(0.5));
    let out = m.sum(&a, &b).unwrap();

    assert!(matches!(
        out.path,
        SumPath::Exact {
            cause: MinkowskiError::Decomposition(_)
        }
    ));
    assert!(!out.solid.is_empty());
    assert!(out.solid.is_finite());

    let bb = bounding_box(&out.solid);
    let expected = [0.0, 0.0, 0.0, 2.5, 2.5, 1.5];
    for (got, want) in bb.iter().zip(expected) {
        assert!(approx_eq(*got, want, 1e-9), "bounding box {bb:?}");
    }

    // the decomposing path agrees with the exact one
    let fast = Minkowski::new(serial()).sum(&a, &b).unwrap();
    assert_eq!(fast.path, SumPath::Decomposed);
    let (exact, decomposed) = (out.solid.volume(), fast.solid.volume());
    assert!(approx_eq(exact, decomposed, 1e-6), "exact {exact}, decomposed {decomposed}");
}

#[test]
fn n_ary_sum_folds_left() {
    let m: Minkowski<()> = Minkowski::new(serial());
    let operands: Vec<Operand<()>> = (0..3).map(|_| Mesh::cube(1.0, None).into()).collect();
    let out = m.sum_all(&operands).unwrap();

    assert_eq!(out.path, SumPath::Decomposed);
    assert_eq!(out.stats.pairs, 2);
    assert!(approx_eq(out.solid.volume(), 27.0, 1e-9), "volume {}", out.solid.volume());
    let bb = bounding_box(&out.solid);
    assert!(approx_eq(bb[3], 3.0, 1e-9));
}

#[test]
fn metadata_follows_the_first_operand() {
    let m: Minkowski<&'static str> = Minkowski::new(serial());
    let a: Operand<&'static str> = Mesh::cube(1.0, Some("bracket")).into();
    let b: Operand<&'static str> = Mesh::cube(1.0, None).into();
    let out = m.sum(&a, &b).unwrap();
    assert_eq!(out.solid.metadata, Some("bracket"));
    assert!(out.solid.polygons.iter().all(|p| p.metadata == Some("bracket")));
}
