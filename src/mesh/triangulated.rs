use crate::mesh::Mesh;
use crate::mesh::vertex::Vertex;
use crate::triangulated::Triangulated3D;

impl<S: Clone + Send + Sync + std::fmt::Debug> Triangulated3D for Mesh<S> {
    fn visit_triangles<F>(&self, mut f: F)
    where
        F: FnMut([Vertex; 3]),
    {
        for poly in &self.polygons {
            let normal = poly.plane.normal();
            for [a, b, c] in poly.triangulate() {
                f([
                    Vertex::on_facet(a.pos, &normal),
                    Vertex::on_facet(b.pos, &normal),
                    Vertex::on_facet(c.pos, &normal),
                ]);
            }
        }
    }
}
