//! Splitting a convex mesh by a plane into two closed convex halves.

use crate::float_types::{QUANTIZATION_FACTOR, Real, tolerance};
use crate::mesh::plane::{BACK, COPLANAR, CuttingPlane, FRONT, SPANNING};
use crate::mesh::{ConvexMesh, Triangle};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;

/// Geometry slicing primitive invoked once per fragment during a cut.
///
/// `plane` is expressed in the mesh's own frame. Returning `None` means the
/// mesh lies entirely on one side of the plane; the caller then classifies
/// the whole fragment. `Some((upper, lower))` must hold two convex meshes that
/// share no volume and whose volumes add up to the input's.
pub trait Slicer<S: Clone + Send + Sync + Debug> {
    fn slice(
        &self,
        mesh: &ConvexMesh<S>,
        plane: &CuttingPlane,
    ) -> Option<(ConvexMesh<S>, ConvexMesh<S>)>;
}

/// Default [`Slicer`]: clips every triangle against the plane and closes both
/// halves with a cap polygon on the plane.
///
/// Cap triangles carry `cap_metadata`, so the freshly exposed surface can be
/// told apart from the original one when the halves are merged.
#[derive(Debug, Clone)]
pub struct PlaneSlicer<S> {
    pub cap_metadata: Option<S>,
    pub tolerance: Real,
}

impl<S: Clone + Send + Sync + Debug> Default for PlaneSlicer<S> {
    fn default() -> Self {
        PlaneSlicer {
            cap_metadata: None,
            tolerance: tolerance(),
        }
    }
}

impl<S: Clone + Send + Sync + Debug> PlaneSlicer<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag cap triangles with `metadata`
    pub fn with_cap_metadata(mut self, metadata: S) -> Self {
        self.cap_metadata = Some(metadata);
        self
    }

    pub const fn with_tolerance(mut self, tolerance: Real) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// `true` when the plane cannot reach the mesh's bounding box
    fn misses_bounds(&self, mesh: &ConvexMesh<S>, plane: &CuttingPlane) -> bool {
        let aabb = mesh.bounding_box();
        let half = aabb.half_extents();
        let n = plane.normal();
        let radius = n.x.abs() * half.x + n.y.abs() * half.y + n.z.abs() * half.z;
        plane.signed_distance(&aabb.center()).abs() > radius + self.tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct QuantizedPoint(i64, i64, i64);

fn quantize_point(p: &Point3<Real>) -> QuantizedPoint {
    QuantizedPoint(
        (p.x * QUANTIZATION_FACTOR).round() as i64,
        (p.y * QUANTIZATION_FACTOR).round() as i64,
        (p.z * QUANTIZATION_FACTOR).round() as i64,
    )
}

/// Accumulates one half of a split mesh, welding coincident vertices.
struct HalfBuilder<S> {
    vertices: Vec<Point3<Real>>,
    lookup: HashMap<QuantizedPoint, usize>,
    triangles: Vec<Triangle<S>>,
    min_area: Real,
}

impl<S: Clone + Send + Sync + Debug> HalfBuilder<S> {
    fn new(tolerance: Real) -> Self {
        HalfBuilder {
            vertices: Vec::new(),
            lookup: HashMap::new(),
            triangles: Vec::new(),
            min_area: tolerance * tolerance,
        }
    }

    fn index_of(&mut self, p: Point3<Real>) -> usize {
        let vertices = &mut self.vertices;
        *self.lookup.entry(quantize_point(&p)).or_insert_with(|| {
            vertices.push(p);
            vertices.len() - 1
        })
    }

    /// Fan-triangulate a convex polygon, dropping slivers
    fn push_polygon(&mut self, polygon: &[Point3<Real>], metadata: &Option<S>) {
        if polygon.len() < 3 {
            return;
        }
        let first = self.index_of(polygon[0]);
        for pair in polygon[1..].windows(2) {
            let b = self.index_of(pair[0]);
            let c = self.index_of(pair[1]);
            if first == b || b == c || first == c {
                continue;
            }
            let area2 = (self.vertices[b] - self.vertices[first])
                .cross(&(self.vertices[c] - self.vertices[first]))
                .norm();
            if area2 * 0.5 <= self.min_area {
                continue;
            }
            self.triangles.push(Triangle::new([first, b, c], metadata.clone()));
        }
    }

    fn finish(self) -> Option<ConvexMesh<S>> {
        if self.triangles.is_empty() {
            return None;
        }
        Some(ConvexMesh::new(self.vertices, self.triangles))
    }
}

/// Order coplanar points counter-clockwise around `normal`, about their centroid
fn sort_around(points: &mut [Point3<Real>], normal: &Vector3<Real>) {
    let count = points.len() as Real;
    let centroid = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords)
        / count;

    // orthonormal basis {u, v} with u × v = normal
    let u = if normal.x.abs() < 0.9 {
        Vector3::x().cross(normal)
    } else {
        Vector3::y().cross(normal)
    }
    .normalize();
    let v = normal.cross(&u);

    let angle = |p: &Point3<Real>| {
        let d = p.coords - centroid;
        d.dot(&v).atan2(d.dot(&u))
    };
    points.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
}

impl<S: Clone + Send + Sync + Debug> Slicer<S> for PlaneSlicer<S> {
    fn slice(
        &self,
        mesh: &ConvexMesh<S>,
        plane: &CuttingPlane,
    ) -> Option<(ConvexMesh<S>, ConvexMesh<S>)> {
        if mesh.is_empty() || self.misses_bounds(mesh, plane) {
            return None;
        }

        let distances: Vec<Real> = mesh
            .vertices
            .iter()
            .map(|p| plane.signed_distance(p))
            .collect();
        let types: Vec<i8> = mesh
            .vertices
            .iter()
            .map(|p| plane.orient_point(p, self.tolerance))
            .collect();

        // Entirely on one side (touching vertices allowed)
        if types.iter().fold(COPLANAR, |acc, &t| acc | t) != SPANNING {
            return None;
        }

        let mut upper = HalfBuilder::new(self.tolerance);
        let mut lower = HalfBuilder::new(self.tolerance);
        let mut section: Vec<Point3<Real>> = mesh
            .vertices
            .iter()
            .zip(&types)
            .filter(|&(_, &t)| t == COPLANAR)
            .map(|(p, _)| *p)
            .collect();

        // Intersection of edge (i, j) with the plane, computed from the lower
        // index so both triangles sharing the edge produce the same point.
        let crossing = |i: usize, j: usize| {
            let (a, b) = if i < j { (i, j) } else { (j, i) };
            let t = distances[a] / (distances[a] - distances[b]);
            mesh.vertices[a] + (mesh.vertices[b] - mesh.vertices[a]) * t
        };

        for tri in &mesh.triangles {
            let idx = tri.indices;
            let tri_types = idx.map(|i| types[i]);
            let polygon_type = tri_types.iter().fold(COPLANAR, |acc, &t| acc | t);

            match polygon_type {
                // lies in the cutting plane; the caps replace it
                COPLANAR => {},
                FRONT => upper.push_polygon(&idx.map(|i| mesh.vertices[i]), &tri.metadata),
                BACK => lower.push_polygon(&idx.map(|i| mesh.vertices[i]), &tri.metadata),
                _ => {
                    let mut front = Vec::with_capacity(4);
                    let mut back = Vec::with_capacity(4);
                    for k in 0..3 {
                        let l = (k + 1) % 3;
                        let (i, j) = (idx[k], idx[l]);
                        let (type_i, type_j) = (tri_types[k], tri_types[l]);

                        if type_i != BACK {
                            front.push(mesh.vertices[i]);
                        }
                        if type_i != FRONT {
                            back.push(mesh.vertices[i]);
                        }
                        if (type_i | type_j) == SPANNING {
                            let p = crossing(i, j);
                            front.push(p);
                            back.push(p);
                            section.push(p);
                        }
                    }
                    upper.push_polygon(&front, &tri.metadata);
                    lower.push_polygon(&back, &tri.metadata);
                },
            }
        }

        // Weld the section polygon before ordering it
        let mut seen = hashbrown::HashSet::new();
        section.retain(|p| seen.insert(quantize_point(p)));
        if section.len() < 3 {
            return None;
        }
        sort_around(&mut section, &plane.normal());

        // lower half is capped facing +normal, upper half facing -normal
        lower.push_polygon(&section, &self.cap_metadata);
        section.reverse();
        upper.push_polygon(&section, &self.cap_metadata);

        Some((upper.finish()?, lower.finish()?))
    }
}
