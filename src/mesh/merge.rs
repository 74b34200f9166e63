//! Concatenating fragment geometry into one renderable mesh.

use crate::float_types::{Real, parry3d::shape::TriMesh};
use crate::mesh::{ConvexMesh, Triangle};
use nalgebra::{Point3, Vector3};
use std::{fmt::Debug, ops::Range};

/// Geometry of a whole body: the triangles of every fragment, back to back.
///
/// `parts[i]` is the triangle range contributed by the i-th merged fragment,
/// so each sub-piece keeps its own triangles and their metadata.
#[derive(Debug, Clone)]
pub struct MergedMesh<S> {
    pub vertices: Vec<Point3<Real>>,
    pub triangles: Vec<Triangle<S>>,
    pub parts: Vec<Range<usize>>,
}

impl<S: Clone + Send + Sync + Debug> MergedMesh<S> {
    pub const fn empty() -> Self {
        MergedMesh {
            vertices: Vec::new(),
            triangles: Vec::new(),
            parts: Vec::new(),
        }
    }

    /// Number of merged sub-pieces
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Triangles of sub-piece `i`
    pub fn part(&self, i: usize) -> &[Triangle<S>] {
        &self.triangles[self.parts[i].clone()]
    }

    /// Iterate every triangle as three positions
    pub fn triangle_positions(&self) -> impl Iterator<Item = [Point3<Real>; 3]> + '_ {
        self.triangles.iter().map(|tri| tri.indices.map(|i| self.vertices[i]))
    }

    /// Unit facet normal of triangle `i`, `+Z` for degenerate facets
    pub fn facet_normal(&self, i: usize) -> Vector3<Real> {
        let [a, b, c] = self.triangles[i].indices.map(|k| self.vertices[k]);
        (b - a)
            .cross(&(c - a))
            .try_normalize(Real::EPSILON)
            .unwrap_or_else(Vector3::z)
    }

    /// Convert the merged geometry to a Parry `TriMesh`.\
    /// Useful for collision detection.
    ///
    /// ## Errors
    /// Returns `None` if the mesh is empty or Parry rejects the topology
    pub fn to_trimesh(&self) -> Option<TriMesh> {
        if self.triangles.is_empty() {
            return None;
        }
        let indices = self
            .triangles
            .iter()
            .map(|tri| tri.indices.map(|i| i as u32))
            .collect();
        TriMesh::new(self.vertices.clone(), indices).ok()
    }
}

impl<S: Clone + Send + Sync + Debug> Default for MergedMesh<S> {
    fn default() -> Self {
        MergedMesh::empty()
    }
}

/// Geometry concatenation collaborator used by the body merger.
pub trait GeometryMerger<S: Clone + Send + Sync + Debug> {
    fn merge(&self, parts: &[&ConvexMesh<S>]) -> MergedMesh<S>;
}

/// Default [`GeometryMerger`]: plain concatenation, no welding across parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concatenate;

impl<S: Clone + Send + Sync + Debug> GeometryMerger<S> for Concatenate {
    fn merge(&self, parts: &[&ConvexMesh<S>]) -> MergedMesh<S> {
        concatenate(parts)
    }
}

/// Append every part's vertices and triangles, re-basing indices
pub fn concatenate<S: Clone + Send + Sync + Debug>(parts: &[&ConvexMesh<S>]) -> MergedMesh<S> {
    let mut merged = MergedMesh::empty();
    for part in parts {
        let base = merged.vertices.len();
        let first = merged.triangles.len();
        merged.vertices.extend_from_slice(&part.vertices);
        merged.triangles.extend(part.triangles.iter().map(|tri| {
            Triangle::new(tri.indices.map(|i| i + base), tri.metadata.clone())
        }));
        merged.parts.push(first..merged.triangles.len());
    }
    merged
}
