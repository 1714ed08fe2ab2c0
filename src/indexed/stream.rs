//! Flat triangle buffers: nine coordinates per triangle, no sharing.

use crate::errors::MinkowskiError;
use crate::float_types::Real;
use crate::triangulated::Triangulated3D;
use nalgebra::Point3;

/// `[x0, y0, z0, x1, y1, z1, x2, y2, z2]` per triangle, in winding order.
///
/// The length is always a multiple of 9; the buffer cannot be changed after
/// construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleStream {
    coords: Vec<Real>,
}

impl TriangleStream {
    pub const fn new() -> Self {
        TriangleStream { coords: Vec::new() }
    }

    /// Wrap a flat coordinate buffer, rejecting partial triangles.
    pub fn from_coords(coords: Vec<Real>) -> Result<Self, MinkowskiError> {
        if coords.len() % 9 != 0 {
            return Err(MinkowskiError::MalformedTriangleStream { len: coords.len() });
        }
        Ok(TriangleStream { coords })
    }

    /// Capture the triangles of any triangulated shape.
    pub fn from_shape<T: Triangulated3D>(shape: &T) -> Self {
        let mut stream = TriangleStreamBuilder::default();
        shape.visit_triangles(|[a, b, c]| stream.push([a.pos, b.pos, c.pos]));
        stream.finish()
    }

    pub fn len(&self) -> usize {
        self.coords.len() / 9
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn as_slice(&self) -> &[Real] {
        &self.coords
    }

    /// Iterate triangles as point triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<Real>; 3]> + '_ {
        self.coords.chunks_exact(9).map(|c| {
            [
                Point3::new(c[0], c[1], c[2]),
                Point3::new(c[3], c[4], c[5]),
                Point3::new(c[6], c[7], c[8]),
            ]
        })
    }
}

/// Append-only builder; the only way to grow a stream, one whole triangle at a time.
#[derive(Debug, Default)]
pub struct TriangleStreamBuilder {
    coords: Vec<Real>,
}

impl TriangleStreamBuilder {
    pub fn with_capacity(triangles: usize) -> Self {
        TriangleStreamBuilder {
            coords: Vec::with_capacity(triangles * 9),
        }
    }

    pub fn push(&mut self, tri: [Point3<Real>; 3]) {
        for p in tri {
            self.coords.extend_from_slice(&[p.x, p.y, p.z]);
        }
    }

    pub fn finish(self) -> TriangleStream {
        TriangleStream { coords: self.coords }
    }
}
