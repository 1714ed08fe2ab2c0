//! Mesh extraction: B-rep faces to a flat, outward-wound triangle stream.

use crate::brep::{BrepSolid, Face, Orientation};
use crate::float_types::Real;
use crate::indexed::stream::{TriangleStream, TriangleStreamBuilder};
use nalgebra::{Matrix4, Point3};
use std::fmt::Debug;

/// Emit every triangle of every triangulated face of `solid`.
///
/// Per face:
/// - a face without triangulation contributes nothing;
/// - `Orientation::Reversed` swaps the 2nd and 3rd corner;
/// - a non-identity `location` is applied to all three corners, and a mirroring
///   location (negative determinant) toggles the swap once more so the emitted
///   winding still points outward.
pub fn extract_triangles<S: Clone + Send + Sync + Debug>(solid: &BrepSolid<S>) -> TriangleStream {
    let capacity = solid
        .faces
        .iter()
        .filter_map(|f| f.triangulation.as_ref())
        .map(|t| t.triangles().len())
        .sum();
    let mut stream = TriangleStreamBuilder::with_capacity(capacity);

    let mut skipped = 0usize;
    for face in &solid.faces {
        if face.triangulation.is_none() {
            skipped += 1;
            continue;
        }
        emit_face(face, &mut stream);
    }

    let stream = stream.finish();
    tracing::debug!(
        faces = solid.faces.len(),
        untriangulated = skipped,
        triangles = stream.len(),
        "extracted triangles from solid"
    );
    stream
}

fn emit_face(face: &Face, out: &mut TriangleStreamBuilder) {
    let Some(triangulation) = face.triangulation.as_ref() else {
        return;
    };

    let placement = face.location.filter(|m| *m != Matrix4::identity());
    let mut orientation = face.orientation;
    if let Some(m) = placement.as_ref() {
        if m.fixed_view::<3, 3>(0, 0).determinant() < 0.0 {
            orientation = orientation.flipped();
        }
    }

    let place = |p: &Point3<Real>| -> Point3<Real> {
        match placement.as_ref() {
            Some(m) => m.transform_point(p),
            None => *p,
        }
    };

    let nodes = triangulation.nodes();
    for &[i0, i1, i2] in triangulation.triangles() {
        let (a, mut b, mut c) = (place(&nodes[i0]), place(&nodes[i1]), place(&nodes[i2]));
        if orientation == Orientation::Reversed {
            std::mem::swap(&mut b, &mut c);
        }
        out.push([a, b, c]);
    }
}
