//! QuickHull via `chull`, plus the strict-point filter applied to pair hulls.

use crate::errors::MinkowskiError;
use crate::float_types::Real;
use crate::indexed::IndexedMesh;
use crate::indexed::dedup::unique_points;
use crate::minkowski::traits::ConvexHull;
use chull::ConvexHullWrapper;
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use robust::{Coord, Coord3D, orient2d, orient3d};

/// [`ConvexHull`] backed by `chull`'s QuickHull.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChullHull {
    /// Iteration cap handed to QuickHull; `None` runs to completion.
    pub max_iter: Option<usize>,
}

impl ConvexHull for ChullHull {
    fn hull(&self, points: &[Point3<Real>]) -> Result<IndexedMesh, MinkowskiError> {
        if points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(MinkowskiError::hull("point cloud contains a non-finite coordinate"));
        }
        let unique = unique_points(points);
        if unique.len() < 4 {
            return Err(MinkowskiError::hull(format!(
                "{} distinct point(s) cannot span a volume",
                unique.len()
            )));
        }

        let points_for_hull: Vec<Vec<Real>> = unique.iter().map(|p| vec![p.x, p.y, p.z]).collect();
        let hull = ConvexHullWrapper::try_new(&points_for_hull, self.max_iter)
            .map_err(|e| MinkowskiError::hull(format!("{e:?}")))?;
        let (verts, indices) = hull.vertices_indices();

        // keep only the vertices the facets use
        let mut remap: HashMap<usize, usize> = HashMap::new();
        let mut vertices: Vec<Point3<Real>> = Vec::new();
        let mut faces: Vec<[usize; 3]> = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            let mut face = [0usize; 3];
            for (slot, &old) in face.iter_mut().zip(tri) {
                let v = verts
                    .get(old)
                    .ok_or_else(|| MinkowskiError::hull(format!("facet index {old} out of range")))?;
                *slot = *remap.entry(old).or_insert_with(|| {
                    vertices.push(Point3::new(v[0], v[1], v[2]));
                    vertices.len() - 1
                });
            }
            faces.push(face);
        }
        if faces.len() < 4 {
            return Err(MinkowskiError::hull("hull has fewer than 4 facets"));
        }

        orient_outward(&vertices, &mut faces);
        IndexedMesh::new(vertices, faces).map_err(|e| MinkowskiError::hull(e.to_string()))
    }
}

/// Wind every facet away from the vertex centroid, which lies strictly inside
/// a full-dimensional hull.
fn orient_outward(vertices: &[Point3<Real>], faces: &mut [[usize; 3]]) {
    let centroid = vertices
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<Real>, p| acc + p.coords)
        / vertices.len() as Real;
    for f in faces.iter_mut() {
        let [a, b, c] = f.map(|i| vertices[i]);
        let n = (b - a).cross(&(c - a));
        if n.dot(&(a.coords - centroid)) < 0.0 {
            f.swap(1, 2);
        }
    }
}

/// Hull vertices that are *strictly* extreme.
///
/// A vertex `p` whose neighbours form a closed ring `q0 .. qk` is dropped when
/// - every consecutive triple `(qi, qi+1, qi+2)` is coplanar with `p` (it sits
///   in the middle of a flat facet region), or
/// - any two neighbours are collinear with `p` (it sits on an edge).
///
/// Both tests use exact orientation predicates. A vertex whose ring cannot be
/// closed, or that has fewer than three neighbours, is kept.
pub fn strict_points(hull: &IndexedMesh) -> Vec<Point3<Real>> {
    let vertices = hull.vertices();

    // around each vertex: neighbour -> next neighbour (CCW seen from outside)
    let mut fan: Vec<HashMap<usize, usize>> = vec![HashMap::new(); vertices.len()];
    for f in hull.faces() {
        for k in 0..3 {
            fan[f[k]].insert(f[(k + 1) % 3], f[(k + 2) % 3]);
        }
    }

    let mut kept = Vec::with_capacity(vertices.len());
    for (v, next) in fan.iter().enumerate() {
        if next.is_empty() {
            continue;
        }
        let p = vertices[v];
        let Some(ring) = close_ring(next) else {
            kept.push(p);
            continue;
        };
        if ring.len() < 3 {
            kept.push(p);
            continue;
        }
        let ring: Vec<Point3<Real>> = ring.iter().map(|&i| vertices[i]).collect();
        if lies_on_edge(&p, &ring) || lies_in_flat_region(&p, &ring) {
            continue;
        }
        kept.push(p);
    }
    tracing::trace!(hull = vertices.len(), strict = kept.len(), "strict hull vertices");
    kept
}

/// Walk `next` from an arbitrary neighbour until it returns to the start.
fn close_ring(next: &HashMap<usize, usize>) -> Option<Vec<usize>> {
    let (&start, _) = next.iter().min_by_key(|(k, _)| **k)?;
    let mut ring = vec![start];
    let mut cur = start;
    loop {
        cur = *next.get(&cur)?;
        if cur == start {
            break;
        }
        if ring.len() >= next.len() {
            return None;
        }
        ring.push(cur);
    }
    (ring.len() == next.len()).then_some(ring)
}

fn lies_on_edge(p: &Point3<Real>, ring: &[Point3<Real>]) -> bool {
    (0..ring.len()).any(|i| (i + 1..ring.len()).any(|j| collinear(p, &ring[i], &ring[j])))
}

fn lies_in_flat_region(p: &Point3<Real>, ring: &[Point3<Real>]) -> bool {
    let k = ring.len();
    (0..k).all(|i| {
        orient3d(
            coord3(&ring[i]),
            coord3(&ring[(i + 1) % k]),
            coord3(&ring[(i + 2) % k]),
            coord3(p),
        ) == 0.0
    })
}

/// Exact collinearity: the three points are collinear iff all three axis
/// projections are.
fn collinear(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> bool {
    let xy = |p: &Point3<Real>| Coord { x: p.x as f64, y: p.y as f64 };
    let yz = |p: &Point3<Real>| Coord { x: p.y as f64, y: p.z as f64 };
    let zx = |p: &Point3<Real>| Coord { x: p.z as f64, y: p.x as f64 };
    orient2d(xy(a), xy(b), xy(c)) == 0.0
        && orient2d(yz(a), yz(b), yz(c)) == 0.0
        && orient2d(zx(a), zx(b), zx(c)) == 0.0
}

#[inline]
fn coord3(p: &Point3<Real>) -> Coord3D<f64> {
    Coord3D {
        x: p.x as f64,
        y: p.y as f64,
        z: p.z as f64,
    }
}
