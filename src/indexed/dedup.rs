//! Vertex welding: turn a [`TriangleStream`] into an [`IndexedMesh`].
//!
//! The default policy is **exact** equality: two corners share an index only
//! when all three coordinates compare equal with `==`. Lookups go through a hash
//! map keyed on the canonical bit pattern of the coordinates, which gives the
//! same answer as a pairwise scan in linear time. `-0.0` is folded onto `0.0`
//! (they compare equal), and a coordinate that is `NaN` never matches anything,
//! not even itself.
//!
//! [`VertexMerge::Tolerance`] is the opt-in alternative that welds corners
//! closer than a radius, for inputs whose shared corners were computed along
//! different floating-point paths.

use crate::errors::MinkowskiError;
use crate::float_types::{Real, tolerance};
use crate::indexed::{IndexedMesh, stream::TriangleStream};
use hashbrown::HashMap;
use nalgebra::Point3;

/// How corners of neighbouring triangles are matched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VertexMerge {
    /// Component-wise `==`.
    #[default]
    Exact,
    /// Weld corners within this Euclidean distance of an earlier corner.
    Tolerance(Real),
}

impl VertexMerge {
    /// Tolerant welding with the crate-wide [`tolerance`].
    pub fn tolerant() -> Self {
        VertexMerge::Tolerance(tolerance())
    }
}

/// Output of [`deduplicate`]: the welded mesh plus one
/// [`MinkowskiError::DegenerateTriangle`] per dropped triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Dedup {
    pub mesh: IndexedMesh,
    pub diagnostics: Vec<MinkowskiError>,
}

impl Dedup {
    pub fn dropped(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Assign each triangle corner an index, reusing the index of an equal earlier
/// corner. Triangles whose three indices are not distinct are dropped.
///
/// Vertices are numbered in order of first appearance among the *kept*
/// triangles, so welding a mesh that came out of this function reproduces it
/// exactly.
pub fn deduplicate(stream: &TriangleStream, merge: VertexMerge) -> Dedup {
    let mut index = match merge {
        VertexMerge::Exact => Welder::Exact(HashMap::with_capacity(stream.len())),
        VertexMerge::Tolerance(eps) => Welder::Grid {
            eps: eps.max(Real::EPSILON),
            cells: HashMap::with_capacity(stream.len()),
        },
    };

    let mut positions: Vec<Point3<Real>> = Vec::new();
    let mut raw_faces: Vec<[usize; 3]> = Vec::with_capacity(stream.len());
    let mut diagnostics = Vec::new();

    for (t, tri) in stream.triangles().enumerate() {
        let indices = tri.map(|p| index.lookup_or_insert(p, &mut positions));
        if indices[0] == indices[1] || indices[1] == indices[2] || indices[0] == indices[2] {
            tracing::warn!(triangle = t, ?indices, "self intersecting face, dropping degenerate triangle");
            diagnostics.push(MinkowskiError::DegenerateTriangle { triangle: t, indices });
            continue;
        }
        raw_faces.push(indices);
    }

    // renumber by first use so orphans from dropped triangles disappear
    let mut remap = vec![usize::MAX; positions.len()];
    let mut vertices = Vec::with_capacity(positions.len());
    let faces: Vec<[usize; 3]> = raw_faces
        .iter()
        .map(|f| {
            f.map(|old| {
                if remap[old] == usize::MAX {
                    remap[old] = vertices.len();
                    vertices.push(positions[old]);
                }
                remap[old]
            })
        })
        .collect();

    tracing::debug!(
        triangles = stream.len(),
        vertices = vertices.len(),
        faces = faces.len(),
        dropped = diagnostics.len(),
        "deduplicated triangle stream"
    );

    Dedup {
        mesh: IndexedMesh::from_parts_unchecked(vertices, faces),
        diagnostics,
    }
}

/// Exactly-equal points collapsed, first occurrence kept, order preserved.
pub(crate) fn unique_points(points: &[Point3<Real>]) -> Vec<Point3<Real>> {
    let mut welder = Welder::Exact(HashMap::with_capacity(points.len()));
    let mut unique = Vec::with_capacity(points.len());
    for &p in points {
        welder.lookup_or_insert(p, &mut unique);
    }
    unique
}

/// Canonical bits of one coordinate; `None` for NaN.
#[inline]
fn coordinate_key(c: Real) -> Option<u64> {
    if c.is_nan() {
        return None;
    }
    let c = if c == 0.0 { 0.0 } else { c };
    Some(u64::from(c.to_bits()))
}

enum Welder {
    Exact(HashMap<[u64; 3], usize>),
    Grid {
        eps: Real,
        cells: HashMap<[i64; 3], Vec<usize>>,
    },
}

impl Welder {
    fn lookup_or_insert(&mut self, p: Point3<Real>, positions: &mut Vec<Point3<Real>>) -> usize {
        match self {
            Welder::Exact(map) => {
                let key = match (coordinate_key(p.x), coordinate_key(p.y), coordinate_key(p.z)) {
                    (Some(x), Some(y), Some(z)) => [x, y, z],
                    _ => {
                        positions.push(p);
                        return positions.len() - 1;
                    },
                };
                *map.entry(key).or_insert_with(|| {
                    positions.push(p);
                    positions.len() - 1
                })
            },
            Welder::Grid { eps, cells } => {
                if !p.coords.iter().all(|c| c.is_finite()) {
                    positions.push(p);
                    return positions.len() - 1;
                }
                let cell = p.coords.map(|c| (c / *eps).floor() as i64);
                let eps2 = *eps * *eps;
                let mut best: Option<usize> = None;
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        for dz in -1..=1 {
                            let probe = [cell.x + dx, cell.y + dy, cell.z + dz];
                            let Some(candidates) = cells.get(&probe) else {
                                continue;
                            };
                            for &i in candidates {
                                if (positions[i] - p).norm_squared() <= eps2
                                    && best.is_none_or(|b| i < b)
                                {
                                    best = Some(i);
                                }
                            }
                        }
                    }
                }
                best.unwrap_or_else(|| {
                    positions.push(p);
                    let i = positions.len() - 1;
                    cells.entry([cell.x, cell.y, cell.z]).or_default().push(i);
                    i
                })
            },
        }
    }
}
