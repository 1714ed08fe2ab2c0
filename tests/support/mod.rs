//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use csg_minkowski::{IndexedMesh, Mesh, float_types::Real};
use nalgebra::Point3;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Returns the approximate bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// of a mesh's polygon vertices.
pub fn bounding_box<S: Clone + Send + Sync + std::fmt::Debug>(mesh: &Mesh<S>) -> [Real; 6] {
    let mut bb = [Real::MAX, Real::MAX, Real::MAX, Real::MIN, Real::MIN, Real::MIN];
    for v in mesh.polygons.iter().flat_map(|p| &p.vertices) {
        for axis in 0..3 {
            bb[axis] = bb[axis].min(v.pos[axis]);
            bb[axis + 3] = bb[axis + 3].max(v.pos[axis]);
        }
    }
    bb
}

/// Route `tracing` output to the test harness; set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Unit tetrahedron at the origin, outward wound.
pub fn tetrahedron(scale: Real) -> IndexedMesh {
    IndexedMesh::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(scale, 0.0, 0.0),
            Point3::new(0.0, scale, 0.0),
            Point3::new(0.0, 0.0, scale),
        ],
        vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
    )
    .unwrap()
}

/// L-shaped prism: the outline (0,0) (2,0) (2,1) (1,1) (1,2) (0,2) extruded
/// from z = 0 to z = 1. Closed, outward wound, reflex along the edge at (1,1).
pub fn l_prism() -> IndexedMesh {
    let outline: [[Real; 2]; 6] = [[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 2.0], [0.0, 2.0]];
    let mut vertices: Vec<Point3<Real>> = outline.iter().map(|[x, y]| Point3::new(*x, *y, 0.0)).collect();
    vertices.extend(outline.iter().map(|[x, y]| Point3::new(*x, *y, 1.0)));

    let mut faces = Vec::new();
    for i in 1..5 {
        // fans from the (0,0) corner, which sees the whole outline
        faces.push([0, i + 1, i]);
        faces.push([6, 6 + i, 6 + i + 1]);
    }
    for i in 0..6 {
        let j = (i + 1) % 6;
        faces.push([i, j, j + 6]);
        faces.push([i, j + 6, i + 6]);
    }
    IndexedMesh::new(vertices, faces).unwrap()
}
