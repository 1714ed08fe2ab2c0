//! Polygon corners carried through BSP splitting.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// A polygon corner: position plus the shading normal it was created with.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
}

impl Vertex {
    /// Create a new [`Vertex`]. The normal is stored as given.
    pub const fn new(pos: Point3<Real>, normal: Vector3<Real>) -> Self {
        Vertex { pos, normal }
    }

    /// Vertex of a flat facet, taking the facet normal.
    pub fn on_facet(pos: Point3<Real>, facet_normal: &Vector3<Real>) -> Self {
        Vertex::new(pos, *facet_normal)
    }

    /// Flip vertex normal
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Point on the segment `self` (`t = 0`) → `other` (`t = 1`); used for the
    /// new corners a BSP split introduces on spanning edges.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let pos = self.pos + (other.pos - self.pos) * t;
        let normal = self.normal + (other.normal - self.normal) * t;
        Vertex::new(pos, normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_hits_midpoint() {
        let a = Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::z());
        let b = Vertex::new(Point3::new(2.0, 4.0, -2.0), Vector3::z());
        let m = a.interpolate(&b, 0.5);
        assert_eq!(m.pos, Point3::new(1.0, 2.0, -1.0));
        assert_eq!(m.normal, Vector3::z());
    }
}
