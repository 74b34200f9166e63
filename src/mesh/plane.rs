//! Cutting planes and the classification of points and whole fragments against them.

use crate::float_types::Real;
use crate::mesh::ConvexMesh;
use nalgebra::{Isometry3, Point3, Vector3};
use std::fmt::Debug;

// Point classification constants, combinable as a bitmask
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// Which half space a fragment ended up in during a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Not classified in the current cut (or waiting to be replaced by its children)
    #[default]
    Unassigned,
    /// Normal-positive half space
    Upper,
    /// Normal-negative half space, including points exactly on the plane
    Lower,
}

impl Side {
    /// Sign of the cut normal an impulse on this side is pushed along
    pub const fn sign(self) -> Real {
        match self {
            Side::Upper => 1.0,
            Side::Lower => -1.0,
            Side::Unassigned => 0.0,
        }
    }
}

/// A plane given by a point on it and a unit normal.
///
/// Space is separated into the **Upper** half (`(p - point) · normal > 0`) and
/// the **Lower** half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuttingPlane {
    point: Point3<Real>,
    normal: Vector3<Real>,
}

impl CuttingPlane {
    /// Create a plane through `point` with the direction of `normal`.
    ///
    /// The normal is normalized; a zero normal falls back to `+Z`.
    pub fn new(point: Point3<Real>, normal: Vector3<Real>) -> Self {
        let normal = normal.try_normalize(Real::EPSILON).unwrap_or_else(Vector3::z);
        CuttingPlane { point, normal }
    }

    /// Build the plane swept by a drag stroke from `a` to `b` (both in world space)
    /// seen from `eye`.
    ///
    /// The plane contains `a`, the stroke direction and the viewing direction
    /// to the stroke's midpoint. Its normal is flipped to agree with
    /// `orientation`, which defaults to the direction from `(0, 5, 0)` to the
    /// stroke midpoint. Returns `None` when the stroke is parallel to the view
    /// direction or has zero length.
    pub fn from_stroke(
        a: Point3<Real>,
        b: Point3<Real>,
        eye: Point3<Real>,
        orientation: Option<Vector3<Real>>,
    ) -> Option<Self> {
        let a_to_b = b - a;
        let middle = a + a_to_b * 0.5;
        let to_middle = middle - eye;

        let mut normal = a_to_b.cross(&to_middle).try_normalize(Real::EPSILON)?;

        let hint = orientation
            .filter(|o| o.norm_squared() > 0.0)
            .unwrap_or_else(|| middle - Point3::new(0.0, 5.0, 0.0));
        if hint.dot(&normal) < 0.0 {
            normal = -normal;
        }

        Some(CuttingPlane { point: a, normal })
    }

    pub const fn point(&self) -> Point3<Real> {
        self.point
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    /// Plane equation offset `w` such that `normal · p = w` on the plane
    pub fn offset(&self) -> Real {
        self.normal.dot(&self.point.coords)
    }

    /// Signed distance of `p` from the plane, positive on the Upper side
    #[inline]
    pub fn signed_distance(&self, p: &Point3<Real>) -> Real {
        (*p - self.point).dot(&self.normal)
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] within `tolerance`
    #[inline]
    pub fn orient_point(&self, p: &Point3<Real>, tolerance: Real) -> i8 {
        let d = self.signed_distance(p);
        if d > tolerance {
            FRONT
        } else if d < -tolerance {
            BACK
        } else {
            COPLANAR
        }
    }

    /// Return a copy moved by `displacement`
    pub fn displaced(&self, displacement: &Vector3<Real>) -> Self {
        CuttingPlane {
            point: self.point + *displacement,
            normal: self.normal,
        }
    }

    /// Return a copy with point and normal mapped through `iso`
    pub fn transformed(&self, iso: &Isometry3<Real>) -> Self {
        CuttingPlane {
            point: iso.transform_point(&self.point),
            normal: iso.transform_vector(&self.normal),
        }
    }

    /// Express a world-space plane in the local frame of a body placed at `placement`
    pub fn to_local(&self, placement: &Isometry3<Real>) -> Self {
        self.transformed(&placement.inverse())
    }

    /// Return a copy with the normal reversed (Upper and Lower swap)
    pub fn flipped(&self) -> Self {
        CuttingPlane {
            point: self.point,
            normal: -self.normal,
        }
    }

    /// Decide the side of a fragment that does **not** straddle the plane.
    ///
    /// The vertex farthest from the plane decides, after being moved to world
    /// space with `placement`, so a face resting on the plane does not flip the
    /// answer. Positive distance is Upper; zero and negative are Lower.
    /// Callers must already know the mesh does not cross the plane.
    pub fn side_of<S: Clone + Send + Sync + Debug>(
        &self,
        mesh: &ConvexMesh<S>,
        placement: &Isometry3<Real>,
    ) -> Side {
        let distance = mesh
            .vertices
            .iter()
            .map(|v| self.signed_distance(&placement.transform_point(v)))
            .fold(0.0, |best: Real, d| if d.abs() > best.abs() { d } else { best });
        if distance > 0.0 {
            Side::Upper
        } else {
            Side::Lower
        }
    }
}
