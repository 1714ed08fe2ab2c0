use crate::triangulated::Triangulated3D;
use std::fmt::{Debug, Write};

/// Export to ASCII STL
/// Convert any triangulated shape to an **ASCII STL** string with the given `name`.
///
/// ```rust
/// # use csg_minkowski::mesh::Mesh;
/// let mesh = Mesh::<()>::cube(1.0, None);
/// let text = mesh.to_stl_ascii("my_solid");
/// assert!(text.starts_with("solid my_solid"));
/// ```
pub fn to_stl_ascii<T: Triangulated3D>(shape: &T, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "solid {name}");

    shape.visit_triangles(|tri| {
        let n = tri[0].normal;
        let _ = writeln!(out, "  facet normal {:.6} {:.6} {:.6}", n.x, n.y, n.z);
        out.push_str("    outer loop\n");
        for v in &tri {
            let p = v.pos;
            let _ = writeln!(out, "      vertex {:.6} {:.6} {:.6}", p.x, p.y, p.z);
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    });

    let _ = writeln!(out, "endsolid {name}");
    out
}

/// Export to BINARY STL (returns `Vec<u8>`)
///
/// The header is left blank; binary STL has no slot for the solid name.
#[cfg(feature = "stl-io")]
pub fn to_stl_binary<T: Triangulated3D>(shape: &T, _name: &str) -> std::io::Result<Vec<u8>> {
    use stl_io::{Normal, Triangle, Vertex, write_stl};

    let mut triangles = Vec::<Triangle>::new();

    shape.visit_triangles(|tri| {
        let n = tri[0].normal;
        #[allow(clippy::unnecessary_cast)]
        {
            triangles.push(Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: tri.map(|v| {
                    let p = v.pos;
                    Vertex::new([p.x as f32, p.y as f32, p.z as f32])
                }),
            });
        }
    });

    let mut cursor = std::io::Cursor::new(Vec::new());
    write_stl(&mut cursor, triangles.iter())?;
    Ok(cursor.into_inner())
}

impl<S: Clone + Debug + Send + Sync> crate::mesh::Mesh<S> {
    pub fn to_stl_ascii(&self, name: &str) -> String {
        self::to_stl_ascii(self, name)
    }

    #[cfg(feature = "stl-io")]
    pub fn to_stl_binary(&self, name: &str) -> std::io::Result<Vec<u8>> {
        self::to_stl_binary(self, name)
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::Mesh;

    #[test]
    fn ascii_cube_has_twelve_facets() {
        let text = Mesh::<()>::cube(1.0, None).to_stl_ascii("cube");
        assert!(text.starts_with("solid cube\n"));
        assert!(text.trim_end().ends_with("endsolid cube"));
        assert_eq!(text.matches("facet normal").count(), 12);
        assert_eq!(text.matches("vertex ").count(), 36);
    }

    #[cfg(feature = "stl-io")]
    #[test]
    fn binary_cube_round_trips_through_stl_io() {
        let bytes = Mesh::<()>::cube(1.0, None).to_stl_binary("cube").unwrap();
        // 80-byte header + u32 count + 50 bytes per facet
        assert_eq!(bytes.len(), 84 + 12 * 50);
        let mut reader = std::io::Cursor::new(bytes);
        let parsed = stl_io::read_stl(&mut reader).unwrap();
        assert_eq!(parsed.faces.len(), 12);
        assert_eq!(parsed.vertices.len(), 8);
    }
}
