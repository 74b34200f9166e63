use crate::float_types::Real;
use crate::io::IoError;
use crate::mesh::{ConvexMesh, Triangle, merge::MergedMesh};
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;
use std::io::Cursor;

/// Facets as (unit normal, three positions), ready for either STL flavour
fn facets<S: Clone + Send + Sync + Debug>(
    mesh: &MergedMesh<S>,
) -> impl Iterator<Item = (Vector3<Real>, [Point3<Real>; 3])> + '_ {
    mesh.triangle_positions()
        .enumerate()
        .map(|(i, tri)| (mesh.facet_normal(i), tri))
}

impl<S: Clone + Send + Sync + Debug> MergedMesh<S> {
    /// Convert this mesh to an **ASCII STL** string with the given `name`.
    ///
    /// ```rust
    /// # use cutrs::mesh::{ConvexMesh, merge::concatenate};
    /// # use nalgebra::Point3;
    /// let cube = ConvexMesh::<()>::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0), None);
    /// let stl = concatenate(&[&cube]).to_stl_ascii("cube");
    /// assert!(stl.starts_with("solid cube"));
    /// assert_eq!(stl.matches("facet normal").count(), 12);
    /// ```
    pub fn to_stl_ascii(&self, name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("solid {name}\n"));

        for (n, tri) in facets(self) {
            out.push_str(&format!(
                "  facet normal {:.6} {:.6} {:.6}\n",
                n.x, n.y, n.z
            ));
            out.push_str("    outer loop\n");
            for p in &tri {
                out.push_str(&format!(
                    "      vertex {:.6} {:.6} {:.6}\n",
                    p.x, p.y, p.z
                ));
            }
            out.push_str("    endloop\n");
            out.push_str("  endfacet\n");
        }

        out.push_str(&format!("endsolid {name}\n"));
        out
    }

    /// Convert this mesh to a **binary STL** byte vector.
    ///
    /// Binary STL has no solid name; `_name` only mirrors [`Self::to_stl_ascii`].
    pub fn to_stl_binary(&self, _name: &str) -> std::io::Result<Vec<u8>> {
        use stl_io::{Normal, Triangle, Vertex, write_stl};

        #[allow(clippy::unnecessary_cast)]
        let triangles: Vec<Triangle> = facets(self)
            .map(|(n, tri)| Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: tri.map(|p| Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
            })
            .collect();

        let mut cursor = Cursor::new(Vec::new());
        write_stl(&mut cursor, triangles.iter())?;
        Ok(cursor.into_inner())
    }
}

impl<S: Clone + Send + Sync + Debug> ConvexMesh<S> {
    /// Read one convex piece from STL bytes (ASCII or binary).
    ///
    /// Vertices shared between facets are merged by `stl_io`; convexity is
    /// not checked.
    ///
    /// ## Errors
    /// [`IoError::StdIo`] if the data is not STL, [`IoError::MalformedInput`]
    /// if it holds no facets.
    pub fn from_stl(data: &[u8], metadata: Option<S>) -> Result<Self, IoError> {
        let mut cursor = Cursor::new(data);
        let stl = stl_io::read_stl(&mut cursor)?;
        if stl.faces.is_empty() {
            return Err(IoError::MalformedInput("STL holds no facets".to_string()));
        }

        let vertices = stl
            .vertices
            .iter()
            .map(|v| Point3::new(v[0] as Real, v[1] as Real, v[2] as Real))
            .collect();
        let triangles = stl
            .faces
            .iter()
            .map(|face| Triangle::new(face.vertices, metadata.clone()))
            .collect();
        Ok(ConvexMesh::new(vertices, triangles))
    }
}
