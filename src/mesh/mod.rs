//! `ConvexMesh` struct: the closed convex triangle mesh carried by every fragment

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use nalgebra::{Isometry3, Point3, Vector3, partial_max, partial_min};
use std::{fmt::Debug, sync::OnceLock};

pub mod merge;
pub mod plane;
pub mod slice;
pub mod volume;

/// One outward-wound triangle of a mesh.
/// - `S` is the generic metadata type (material, surface tag, ...), stored as `Option<S>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle<S> {
    /// Indices into the owning mesh's vertex array, counter-clockwise seen from outside
    pub indices: [usize; 3],

    /// Generic metadata associated with the Triangle
    pub metadata: Option<S>,
}

impl<S> Triangle<S> {
    pub const fn new(indices: [usize; 3], metadata: Option<S>) -> Self {
        Triangle { indices, metadata }
    }
}

/// A closed convex polyhedron stored as an indexed triangle list.
///
/// The core never inspects the geometry beyond sampling vertices and
/// summing tetrahedra; splitting and concatenation go through
/// [`slice::Slicer`] and [`merge::GeometryMerger`].
#[derive(Clone, Debug)]
pub struct ConvexMesh<S: Clone + Send + Sync + Debug> {
    /// Vertex positions in the owning body's local frame
    pub vertices: Vec<Point3<Real>>,

    /// Outward-wound triangles
    pub triangles: Vec<Triangle<S>>,

    /// Lazily calculated AABB that spans `vertices`.
    pub bounding_box: OnceLock<Aabb>,
}

impl<S: Clone + Send + Sync + Debug> ConvexMesh<S> {
    /// Returns a new empty mesh
    pub const fn empty() -> Self {
        ConvexMesh {
            vertices: Vec::new(),
            triangles: Vec::new(),
            bounding_box: OnceLock::new(),
        }
    }

    /// Build a mesh from vertices and triangles
    pub const fn new(vertices: Vec<Point3<Real>>, triangles: Vec<Triangle<S>>) -> Self {
        ConvexMesh {
            vertices,
            triangles,
            bounding_box: OnceLock::new(),
        }
    }

    /// Build a mesh from raw index triples, tagging every triangle with the same metadata
    pub fn from_indices(
        vertices: Vec<Point3<Real>>,
        indices: &[[usize; 3]],
        metadata: Option<S>,
    ) -> Self {
        let triangles = indices
            .iter()
            .map(|&tri| Triangle::new(tri, metadata.clone()))
            .collect();
        ConvexMesh::new(vertices, triangles)
    }

    /// Axis-aligned box spanning `mins`..`maxs`, wound outward.
    ///
    /// ## Example
    /// ```
    /// use cutrs::mesh::ConvexMesh;
    /// use nalgebra::Point3;
    /// let cube: ConvexMesh<()> =
    ///     ConvexMesh::cuboid(Point3::origin(), Point3::new(2.0, 2.0, 2.0), None);
    /// assert_eq!(cube.vertices.len(), 8);
    /// assert_eq!(cube.triangles.len(), 12);
    /// ```
    pub fn cuboid(mins: Point3<Real>, maxs: Point3<Real>, metadata: Option<S>) -> Self {
        let (x0, y0, z0) = (mins.x, mins.y, mins.z);
        let (x1, y1, z1) = (maxs.x, maxs.y, maxs.z);
        let vertices = vec![
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x0, y1, z0),
            Point3::new(x0, y0, z1),
            Point3::new(x1, y0, z1),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ];
        let indices = [
            // -z
            [0, 3, 2],
            [0, 2, 1],
            // +z
            [4, 5, 6],
            [4, 6, 7],
            // -y
            [0, 1, 5],
            [0, 5, 4],
            // +y
            [3, 7, 6],
            [3, 6, 2],
            // -x
            [0, 4, 7],
            [0, 7, 3],
            // +x
            [1, 2, 6],
            [1, 6, 5],
        ];
        ConvexMesh::from_indices(vertices, &indices, metadata)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }

    /// Iterate the three corner positions of every triangle
    pub fn triangle_positions(&self) -> impl Iterator<Item = [Point3<Real>; 3]> + '_ {
        self.triangles.iter().map(|tri| {
            let [a, b, c] = tri.indices;
            [self.vertices[a], self.vertices[b], self.vertices[c]]
        })
    }

    /// Unnormalized outward normal of triangle `i` (length is twice its area)
    pub fn face_normal(&self, i: usize) -> Vector3<Real> {
        let [a, b, c] = self.triangles[i].indices;
        (self.vertices[b] - self.vertices[a]).cross(&(self.vertices[c] - self.vertices[a]))
    }

    /// Absolute volume, see [`volume::convex_volume`]
    pub fn volume(&self) -> Real {
        volume::convex_volume(self)
    }

    /// Returns a copy with every vertex moved by `iso`
    pub fn transformed(&self, iso: &Isometry3<Real>) -> ConvexMesh<S> {
        ConvexMesh::new(
            self.vertices.iter().map(|p| iso.transform_point(p)).collect(),
            self.triangles.clone(),
        )
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the 3D bounds of all `vertices`.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut min_x = Real::MAX;
            let mut min_y = Real::MAX;
            let mut min_z = Real::MAX;
            let mut max_x = -Real::MAX;
            let mut max_y = -Real::MAX;
            let mut max_z = -Real::MAX;

            for v in &self.vertices {
                min_x = *partial_min(&min_x, &v.x).unwrap_or(&min_x);
                min_y = *partial_min(&min_y, &v.y).unwrap_or(&min_y);
                min_z = *partial_min(&min_z, &v.z).unwrap_or(&min_z);

                max_x = *partial_max(&max_x, &v.x).unwrap_or(&max_x);
                max_y = *partial_max(&max_y, &v.y).unwrap_or(&max_y);
                max_z = *partial_max(&max_z, &v.z).unwrap_or(&max_z);
            }

            // No vertices: trivial AABB at origin
            if min_x > max_x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }

            Aabb::new(
                Point3::new(min_x, min_y, min_z),
                Point3::new(max_x, max_y, max_z),
            )
        })
    }

    /// Invalidates the cached bounding box.
    pub fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }
}

impl<S: Clone + Send + Sync + Debug> Default for ConvexMesh<S> {
    fn default() -> Self {
        ConvexMesh::empty()
    }
}
