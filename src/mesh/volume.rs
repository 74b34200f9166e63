//! Volume of a closed convex triangle mesh.
//!
//! By the divergence theorem the volume is the sum of signed tetrahedra spanned by
//! any reference point and each outward-wound triangle. For a convex hull every
//! point of the closed hull works, so the midpoint of two vertices is enough.

use crate::float_types::Real;
use crate::mesh::ConvexMesh;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::fmt::Debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Signed volume of the tetrahedron (origin, p1, p2, p3).
#[inline]
pub fn signed_tetrahedron_volume(p1: &Vector3<Real>, p2: &Vector3<Real>, p3: &Vector3<Real>) -> Real {
    p1.dot(&p2.cross(p3)) / 6.0
}

/// Midpoint of two distinct vertices picked with `rng`.
///
/// Only meaningful for convex meshes, where the segment between any two
/// vertices stays inside the hull. Returns `None` for fewer than two vertices.
pub fn interior_point<S, R>(mesh: &ConvexMesh<S>, rng: &mut R) -> Option<Point3<Real>>
where
    S: Clone + Send + Sync + Debug,
    R: Rng + ?Sized,
{
    let n = mesh.vertices.len();
    if n < 2 {
        return None;
    }
    let a = rng.gen_range(0..n);
    // draw from the remaining n - 1 slots so `b != a` without retrying
    let mut b = rng.gen_range(0..n - 1);
    if b >= a {
        b += 1;
    }
    let (pa, pb) = (mesh.vertices[a], mesh.vertices[b]);
    Some(pa + (pb - pa) * 0.5)
}

/// Absolute volume of a convex mesh, summing signed tetrahedra about `center`.
pub fn volume_about<S: Clone + Send + Sync + Debug>(mesh: &ConvexMesh<S>, center: &Point3<Real>) -> Real {
    let center = *center;
    let tetra = |[a, b, c]: [Point3<Real>; 3]| {
        signed_tetrahedron_volume(&(a - center), &(b - center), &(c - center))
    };

    #[cfg(not(feature = "parallel"))]
    let volume: Real = mesh.triangle_positions().map(tetra).sum();

    #[cfg(feature = "parallel")]
    let volume: Real = mesh
        .triangle_positions()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(tetra)
        .sum();

    volume.abs()
}

/// Volume of a convex mesh using a reference point drawn from `rng`.
pub fn convex_volume_with_rng<S, R>(mesh: &ConvexMesh<S>, rng: &mut R) -> Real
where
    S: Clone + Send + Sync + Debug,
    R: Rng + ?Sized,
{
    match interior_point(mesh, rng) {
        Some(center) => volume_about(mesh, &center),
        None => 0.0,
    }
}

/// Volume of a convex mesh using a random interior reference point.
///
/// ## Example
/// ```
/// use cutrs::mesh::{ConvexMesh, volume::convex_volume};
/// use nalgebra::Point3;
/// let cube: ConvexMesh<()> =
///     ConvexMesh::cuboid(Point3::origin(), Point3::new(2.0, 3.0, 4.0), None);
/// assert!((convex_volume(&cube) - 24.0).abs() < 1e-9);
/// ```
pub fn convex_volume<S: Clone + Send + Sync + Debug>(mesh: &ConvexMesh<S>) -> Real {
    convex_volume_with_rng(mesh, &mut rand::thread_rng())
}
