//! Local (edge-wise) convexity test for closed triangle meshes.

use crate::float_types::Real;
use crate::indexed::IndexedMesh;
use hashbrown::HashMap;
use std::ops::ControlFlow;

/// **Weak convexity**: no edge of the mesh is reflex.
///
/// For every directed edge `s → t` of a face with apex `a`, the face on the
/// other side (the one holding `t → s`, apex `b`) is looked up. With the plane
/// through `s, t, a` and normal `n = (t - s) × (a - s)`, the edge is reflex when
/// `b` sits strictly on the positive side:
///
/// ```text
/// d = n · (b - s) > 0   and   d² / |n|² > squared_tolerance
/// ```
///
/// Coplanar neighbours (`d = 0`) pass, so flat regions split into several
/// triangles are fine. Edges with no twin and zero-area faces are skipped.
///
/// This is a purely local test: a mesh made of several disjoint convex shells
/// passes even though their union is not convex. Check
/// [`IndexedMesh::shells`] when that matters.
pub fn is_weakly_convex(mesh: &IndexedMesh, squared_tolerance: Real) -> bool {
    visit_reflex_edges(mesh, squared_tolerance, |_| ControlFlow::Break(())).is_continue()
}

/// A reflex edge `s → t` with the apexes of its two faces: `a` on the face
/// holding `s → t`, `b` on the face holding `t → s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflexEdge {
    pub s: usize,
    pub t: usize,
    pub a: usize,
    pub b: usize,
}

/// Every reflex edge once, oriented so that `s < t`.
pub fn reflex_edges(mesh: &IndexedMesh, squared_tolerance: Real) -> Vec<ReflexEdge> {
    let mut edges = Vec::new();
    let _ = visit_reflex_edges(mesh, squared_tolerance, |edge| {
        if edge.s < edge.t {
            edges.push(edge);
        }
        ControlFlow::Continue(())
    });
    edges
}

fn visit_reflex_edges(
    mesh: &IndexedMesh,
    squared_tolerance: Real,
    mut visit: impl FnMut(ReflexEdge) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let vertices = mesh.vertices();
    let faces = mesh.faces();

    // directed edge -> apex of the face that owns it
    let mut apex_of: HashMap<(usize, usize), usize> = HashMap::with_capacity(faces.len() * 3);
    for f in faces {
        for k in 0..3 {
            apex_of.insert((f[k], f[(k + 1) % 3]), f[(k + 2) % 3]);
        }
    }

    for f in faces {
        for k in 0..3 {
            let (s, t, a) = (f[k], f[(k + 1) % 3], f[(k + 2) % 3]);
            let Some(&b) = apex_of.get(&(t, s)) else {
                continue;
            };
            let ps = vertices[s];
            let n = (vertices[t] - ps).cross(&(vertices[a] - ps));
            let n2 = n.norm_squared();
            if n2 == 0.0 {
                continue;
            }
            let d = n.dot(&(vertices[b] - ps));
            if d > 0.0 && d * d / n2 > squared_tolerance {
                tracing::trace!(s, t, apex = b, distance2 = d * d / n2, "reflex edge");
                visit(ReflexEdge { s, t, a, b })?;
            }
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::CONVEXITY_TOLERANCE;
    use crate::mesh::Mesh;
    use nalgebra::Point3;

    #[test]
    fn tetrahedron_is_convex() {
        let tet = IndexedMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap();
        assert!(is_weakly_convex(&tet, CONVEXITY_TOLERANCE));
    }

    #[test]
    fn cube_with_coplanar_triangles_is_convex() {
        let cube = IndexedMesh::from_mesh(&Mesh::<()>::cube(3.0, None));
        assert!(is_weakly_convex(&cube, CONVEXITY_TOLERANCE));
    }

    #[test]
    fn dented_box_is_not_convex() {
        // unit square pyramid pushed inward: apex below the base plane
        let dent = IndexedMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.5, 0.5, 0.5),
                Point3::new(0.5, 0.5, 0.25),
            ],
            vec![
                // outer pyramid sides
                [0, 1, 4],
                [1, 2, 4],
                [2, 3, 4],
                [3, 0, 4],
                // base replaced by an inward dent to vertex 5
                [1, 0, 5],
                [2, 1, 5],
                [3, 2, 5],
                [0, 3, 5],
            ],
        )
        .unwrap();
        assert!(dent.is_closed());
        assert!(!is_weakly_convex(&dent, CONVEXITY_TOLERANCE));

        // the four edges running into the dent, nothing else
        let reflex = reflex_edges(&dent, CONVEXITY_TOLERANCE);
        assert_eq!(reflex.len(), 4);
        assert!(reflex.iter().all(|e| e.s < e.t && e.t == 5));
    }

    #[test]
    fn open_edges_are_skipped() {
        let single = IndexedMesh::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        )
        .unwrap();
        assert!(is_weakly_convex(&single, CONVEXITY_TOLERANCE));
    }
}
