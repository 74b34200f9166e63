use crate::float_types::Real;
use crate::mesh::merge::MergedMesh;
use crate::world::{BodyId, FragmentId};
use nalgebra::Isometry3;
use std::fmt::Debug;

/// A physical/renderable object made of one or more convex fragments.
///
/// A body is convex exactly when it owns a single fragment; concave bodies
/// own their whole convex decomposition.
#[derive(Debug, Clone)]
pub struct Body<S: Clone + Send + Sync + Debug> {
    pub(crate) id: BodyId,
    pub(crate) label: String,
    pub(crate) fragments: Vec<FragmentId>,
    pub(crate) volume: Real,
    pub(crate) placement: Isometry3<Real>,
    pub(crate) mesh: MergedMesh<S>,
    pub(crate) generation: u32,
}

impl<S: Clone + Send + Sync + Debug> Body<S> {
    pub const fn id(&self) -> BodyId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Owned fragments, in merge order
    pub fn fragments(&self) -> &[FragmentId] {
        &self.fragments
    }

    /// Aggregate volume, the sum of the fragments' volumes
    pub const fn volume(&self) -> Real {
        self.volume
    }

    /// World placement shared by every fragment's geometry
    pub const fn placement(&self) -> &Isometry3<Real> {
        &self.placement
    }

    /// Combined geometry of all fragments (one sub-piece per fragment)
    pub const fn mesh(&self) -> &MergedMesh<S> {
        &self.mesh
    }

    /// Number of cuts in this body's ancestry
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_convex(&self) -> bool {
        self.fragments.len() == 1
    }
}
