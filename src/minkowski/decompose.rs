//! Convex decomposition.
//!
//! [`ReflexCutDecomposer`] splits a solid exactly, by cutting it along one
//! plane through every reflex edge with the BSP machinery in [`crate::mesh`].
//! [`VhacdDecomposer`] runs parry's approximate V-HACD instead.
//!
//! Whatever produced them, parts only leave a decomposer after
//! [`check_parts`]: their volumes must add up to the input volume and every
//! part vertex must lie inside or on the input. Parts that overfill the input
//! would silently grow the Minkowski sum, so they are reported as
//! [`MinkowskiError::Decomposition`] and the exact fallback takes over.

use crate::errors::MinkowskiError;
use crate::float_types::{CONVEXITY_TOLERANCE, Real};
use crate::float_types::parry3d::transformation::vhacd::{VHACD, VHACDParameters};
use crate::indexed::{
    IndexedMesh, ReflexEdge, TriangleStream, VertexMerge, deduplicate, reflex_edges,
};
use crate::mesh::Mesh;
use crate::mesh::bsp::Node;
use crate::mesh::plane::{COPLANAR, Plane, SPANNING};
use crate::mesh::polygon::Polygon;
use crate::minkowski::hull::ChullHull;
use crate::minkowski::traits::{ConvexDecomposer, ConvexHull};
use crate::traits::CSGOps;
use nalgebra::{Point3, Vector3};
use std::fmt;

/// Relative slack between summed part volume and the input volume.
pub const VOLUME_TOLERANCE: Real = 1e-6;

/// Exact [`ConvexDecomposer`]: cut along the bisector plane of every reflex
/// edge, then hull what is left in each cell.
///
/// A cut through a reflex edge halves its dihedral angle on both sides, and a
/// plane cut never creates a reflex edge, so once every reflex edge has been
/// cut each connected piece is convex.
#[derive(Debug, Clone, Copy)]
pub struct ReflexCutDecomposer {
    pub hull: ChullHull,
    /// Squared distance an apex must clear for its edge to count as reflex.
    pub convexity_tolerance: Real,
    /// Solids needing more distinct cutting planes than this are refused.
    pub max_cuts: usize,
    pub volume_tolerance: Real,
}

impl Default for ReflexCutDecomposer {
    fn default() -> Self {
        ReflexCutDecomposer {
            hull: ChullHull::default(),
            convexity_tolerance: CONVEXITY_TOLERANCE,
            max_cuts: 64,
            volume_tolerance: VOLUME_TOLERANCE,
        }
    }
}

impl ReflexCutDecomposer {
    /// Bisector planes of the reflex edges, near-duplicates removed.
    fn cutting_planes(&self, mesh: &IndexedMesh) -> Vec<Plane> {
        let mut planes: Vec<Plane> = Vec::new();
        for edge in reflex_edges(mesh, self.convexity_tolerance) {
            let Some(plane) = bisector(mesh, &edge) else {
                continue;
            };
            if !planes.iter().any(|p| same_plane(p, &plane)) {
                planes.push(plane);
            }
        }
        planes
    }
}

impl ConvexDecomposer for ReflexCutDecomposer {
    fn decompose(&self, mesh: &IndexedMesh) -> Result<Vec<IndexedMesh>, MinkowskiError> {
        check_input(mesh)?;

        let planes = self.cutting_planes(mesh);
        if planes.len() > self.max_cuts {
            return Err(MinkowskiError::decomposition(format!(
                "{} cutting planes exceed the limit of {}",
                planes.len(),
                self.max_cuts
            )));
        }

        let weld = VertexMerge::Tolerance(weld_radius(mesh));

        // (piece, index of the first plane it has not been offered yet)
        let mut pending: Vec<(IndexedMesh, usize)> = vec![(mesh.clone(), 0)];
        let mut pieces = Vec::new();
        while let Some((piece, first)) = pending.pop() {
            let split = planes[first..]
                .iter()
                .enumerate()
                .find_map(|(k, plane)| cut(&piece, plane).map(|halves| (first + k + 1, halves)));
            match split {
                Some((next, halves)) => {
                    for half in halves {
                        let welded = deduplicate(&TriangleStream::from_shape(&half), weld).mesh;
                        pending.extend(welded.split_shells().into_iter().map(|s| (s, next)));
                    }
                },
                None => pieces.push(piece),
            }
        }

        let mut parts = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            match self.hull.hull(piece.vertices()) {
                Ok(part) => parts.push(part),
                // slivers left on a cutting plane hold no volume
                Err(e) => tracing::debug!(error = %e, "discarding flat piece"),
            }
        }
        tracing::debug!(
            planes = planes.len(),
            pieces = pieces.len(),
            parts = parts.len(),
            "reflex cut decomposition"
        );

        if parts.is_empty() {
            return Err(MinkowskiError::decomposition("cutting left no solid piece"));
        }
        check_parts(mesh, &parts, self.volume_tolerance)?;
        Ok(parts)
    }
}

/// Plane through `edge` that halves the solid angle between its two faces.
fn bisector(mesh: &IndexedMesh, edge: &ReflexEdge) -> Option<Plane> {
    let v = mesh.vertices();
    let (s, t) = (v[edge.s], v[edge.t]);
    let n1 = (t - s).cross(&(v[edge.a] - s)).try_normalize(Real::EPSILON)?;
    let n2 = (s - t).cross(&(v[edge.b] - t)).try_normalize(Real::EPSILON)?;
    Plane::from_points(&s, &t, &(s + (n1 + n2)))
}

fn same_plane(p: &Plane, q: &Plane) -> bool {
    const EPS: Real = 1e-9;
    let same = (p.normal - q.normal).norm() < EPS && (p.w - q.w).abs() < EPS;
    let opposite = (p.normal + q.normal).norm() < EPS && (p.w + q.w).abs() < EPS;
    same || opposite
}

fn weld_radius(mesh: &IndexedMesh) -> Real {
    1e-9 * mesh.extent().max(1.0)
}

/// Both closed halves of `piece` on either side of `plane`, or `None` when
/// the plane does not pass through its interior.
fn cut(piece: &IndexedMesh, plane: &Plane) -> Option<[Mesh<()>; 2]> {
    let sides = piece
        .vertices()
        .iter()
        .fold(COPLANAR, |acc, p| acc | plane.orient_point(p));
    if sides != SPANNING {
        return None;
    }

    let solid: Mesh<()> = piece.to_mesh(None);
    let mut front = Vec::new();
    let mut back = Vec::new();
    for polygon in &solid.polygons {
        let (coplanar_front, coplanar_back, front_parts, back_parts) = plane.split_polygon(polygon);
        // a face lying on the plane closes the half it faces away from
        back.extend(coplanar_front);
        front.extend(coplanar_back);
        front.extend(front_parts);
        back.extend(back_parts);
    }

    // the cross-section: a large square on the plane, clipped to the inside
    let mut inside = Node::from_polygons(&solid.polygons);
    inside.invert();
    for cap in inside.clip_polygons(&[cap_square(plane, &solid)]) {
        let mut facing_back = cap.clone();
        facing_back.flip();
        front.push(facing_back);
        back.push(cap);
    }

    Some([Mesh::from_polygons(&front, None), Mesh::from_polygons(&back, None)])
}

/// Square on `plane`, facing along its normal, covering all of `solid`.
fn cap_square(plane: &Plane, solid: &Mesh<()>) -> Polygon<()> {
    let bb = solid.bounding_box();
    let centre = nalgebra::center(&bb.mins, &bb.maxs);
    let centre = centre - plane.normal * (plane.normal.dot(&centre.coords) - plane.w);
    let half = (bb.maxs - bb.mins).norm() + 1.0;

    let helper = if plane.normal.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    let u = helper.cross(&plane.normal).normalize() * half;
    let v = plane.normal.cross(&u);

    let corners: [Point3<Real>; 4] =
        [centre - u - v, centre + u - v, centre + u + v, centre - u + v];
    let mut square = Polygon::from_points(&corners, None);
    square.plane = plane.clone();
    square
}

/// Accept `parts` only if they tile `mesh`: summed volume equal to the input
/// volume and every part vertex inside or on the input.
pub fn check_parts(
    mesh: &IndexedMesh,
    parts: &[IndexedMesh],
    volume_tolerance: Real,
) -> Result<(), MinkowskiError> {
    let expected = mesh.volume();
    let total: Real = parts.iter().map(IndexedMesh::volume).sum();
    if (total - expected).abs() > volume_tolerance * expected.abs() {
        return Err(MinkowskiError::decomposition(format!(
            "parts hold volume {total}, the input holds {expected}"
        )));
    }

    let eps = weld_radius(mesh) * 10.0;
    for (i, part) in parts.iter().enumerate() {
        if let Some(p) = part.vertices().iter().find(|p| !mesh.contains_point(p, eps)) {
            return Err(MinkowskiError::decomposition(format!(
                "part {i} reaches outside the input at {p:?}"
            )));
        }
    }
    Ok(())
}

fn check_input(mesh: &IndexedMesh) -> Result<(), MinkowskiError> {
    if mesh.is_empty() {
        return Err(MinkowskiError::decomposition("mesh has no faces"));
    }
    if !mesh.is_closed() {
        return Err(MinkowskiError::decomposition(
            "mesh is not closed; every edge must be shared by exactly two faces",
        ));
    }
    Ok(())
}

/// [`ConvexDecomposer`] running V-HACD on the mesh and returning the exact
/// convex hull of each voxel cluster's share of the original triangles.
///
/// Cluster hulls routinely bulge past concave regions of the input; those
/// decompositions fail [`check_parts`].
#[derive(Clone)]
pub struct VhacdDecomposer {
    pub params: VHACDParameters,
    pub volume_tolerance: Real,
}

impl Default for VhacdDecomposer {
    fn default() -> Self {
        VhacdDecomposer::new(VHACDParameters::default())
    }
}

impl VhacdDecomposer {
    pub const fn new(params: VHACDParameters) -> Self {
        VhacdDecomposer {
            params,
            volume_tolerance: VOLUME_TOLERANCE,
        }
    }
}

impl fmt::Debug for VhacdDecomposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VhacdDecomposer")
            .field("resolution", &self.params.resolution)
            .field("concavity", &self.params.concavity)
            .field("max_convex_hulls", &self.params.max_convex_hulls)
            .field("volume_tolerance", &self.volume_tolerance)
            .finish()
    }
}

impl ConvexDecomposer for VhacdDecomposer {
    fn decompose(&self, mesh: &IndexedMesh) -> Result<Vec<IndexedMesh>, MinkowskiError> {
        check_input(mesh)?;

        let points = mesh.vertices().to_vec();
        let indices = mesh
            .faces()
            .iter()
            .map(|f| {
                let [a, b, c] = f.map(u32::try_from);
                Ok([a?, b?, c?])
            })
            .collect::<Result<Vec<[u32; 3]>, std::num::TryFromIntError>>()
            .map_err(|e| MinkowskiError::decomposition(format!("vertex index overflow: {e}")))?;

        let decomposition = VHACD::decompose(&self.params, &points, &indices, true);
        let hulls = decomposition.compute_exact_convex_hulls(&points, &indices);
        let clusters = hulls.len();

        let parts: Vec<IndexedMesh> = hulls
            .into_iter()
            .filter(|(vertices, triangles)| vertices.len() >= 4 && triangles.len() >= 4)
            .filter_map(|(vertices, triangles)| {
                let faces = triangles.iter().map(|t| t.map(|i| i as usize)).collect();
                match IndexedMesh::new(vertices, faces) {
                    Ok(part) => Some(part),
                    Err(e) => {
                        tracing::debug!(error = %e, "discarding malformed convex part");
                        None
                    },
                }
            })
            .collect();

        tracing::debug!(clusters, parts = parts.len(), "v-hacd decomposition");

        if parts.is_empty() {
            return Err(MinkowskiError::decomposition(format!(
                "v-hacd produced no usable part out of {clusters} cluster(s)"
            )));
        }
        check_parts(mesh, &parts, self.volume_tolerance)?;
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexed::is_weakly_convex;

    /// The outline (0,0) (2,0) (2,1) (1,1) (1,2) (0,2) extruded over z in [0, 1].
    fn l_prism() -> IndexedMesh {
        let outline: [[Real; 2]; 6] =
            [[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 2.0], [0.0, 2.0]];
        let mut vertices: Vec<Point3<Real>> =
            outline.iter().map(|[x, y]| Point3::new(*x, *y, 0.0)).collect();
        vertices.extend(outline.iter().map(|[x, y]| Point3::new(*x, *y, 1.0)));
        let mut faces = Vec::new();
        for i in 1..5 {
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

    /// Square pyramid with a dent pushed up into its base.
    fn dented_pyramid() -> IndexedMesh {
        IndexedMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(1.0, 1.0, 2.0),
                Point3::new(1.0, 1.0, 0.5),
            ],
            vec![
                [0, 1, 4],
                [1, 2, 4],
                [2, 3, 4],
                [3, 0, 4],
                [1, 0, 5],
                [2, 1, 5],
                [3, 2, 5],
                [0, 3, 5],
            ],
        )
        .unwrap()
    }

    fn assert_tiles(mesh: &IndexedMesh, parts: &[IndexedMesh]) {
        let total: Real = parts.iter().map(IndexedMesh::volume).sum();
        assert!((total - mesh.volume()).abs() < 1e-9, "parts {total}, input {}", mesh.volume());
        for part in parts {
            assert!(part.is_closed());
            assert!(is_weakly_convex(part, CONVEXITY_TOLERANCE));
            assert!(part.vertices().iter().all(|p| mesh.contains_point(p, 1e-9)));
        }
    }

    #[test]
    fn l_prism_splits_along_its_inner_corner() {
        let l = l_prism();
        let parts = ReflexCutDecomposer::default().decompose(&l).unwrap();
        assert_eq!(parts.len(), 2);
        assert_tiles(&l, &parts);
        for part in &parts {
            assert!((part.volume() - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn dented_pyramid_splits_into_four_tetrahedra() {
        let dent = dented_pyramid();
        assert!((dent.volume() - 2.0).abs() < 1e-12);
        let parts = ReflexCutDecomposer::default().decompose(&dent).unwrap();
        assert_eq!(parts.len(), 4);
        assert_tiles(&dent, &parts);
        for part in &parts {
            assert!((part.volume() - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn too_many_cuts_are_refused() {
        let decomposer = ReflexCutDecomposer {
            max_cuts: 1,
            ..ReflexCutDecomposer::default()
        };
        let err = decomposer.decompose(&dented_pyramid()).unwrap_err();
        assert!(matches!(err, MinkowskiError::Decomposition(_)));
    }

    #[test]
    fn parts_that_overfill_are_rejected() {
        let l = l_prism();
        // the hull of the whole L covers the notch as well
        let hull = ChullHull::default().hull(l.vertices()).unwrap();
        assert!(matches!(
            check_parts(&l, &[hull], VOLUME_TOLERANCE),
            Err(MinkowskiError::Decomposition(_))
        ));

        // right total volume, but the second box sits in the notch
        let boxes = [
            IndexedMesh::from_mesh(&Mesh::<()>::cuboid(2.0, 1.0, 1.0, None)),
            IndexedMesh::from_mesh(
                &Mesh::<()>::cuboid(1.0, 1.0, 1.0, None).translate(1.0, 1.0, 0.0),
            ),
        ];
        let total: Real = boxes.iter().map(IndexedMesh::volume).sum();
        assert!((total - l.volume()).abs() < 1e-12);
        let err = check_parts(&l, &boxes, VOLUME_TOLERANCE).unwrap_err();
        assert!(err.to_string().contains("outside"), "{err}");
    }

    #[test]
    fn vhacd_clusters_bulging_past_the_notch_are_rejected() {
        let err = VhacdDecomposer::default().decompose(&l_prism()).unwrap_err();
        assert!(matches!(err, MinkowskiError::Decomposition(_)));
        assert!(err.triggers_fallback());
    }

    #[test]
    fn open_mesh_is_rejected() {
        let sheet = IndexedMesh::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        )
        .unwrap();
        for decomposer in [
            &ReflexCutDecomposer::default() as &dyn ConvexDecomposer,
            &VhacdDecomposer::default(),
        ] {
            let err = decomposer.decompose(&sheet).unwrap_err();
            assert!(matches!(err, MinkowskiError::Decomposition(_)));
        }
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let err = ReflexCutDecomposer::default()
            .decompose(&IndexedMesh::default())
            .unwrap_err();
        assert!(matches!(err, MinkowskiError::Decomposition(_)));
    }
}
