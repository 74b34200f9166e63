use crate::float_types::Real;
use crate::mesh::{ConvexMesh, plane::Side};
use crate::world::{BodyId, FragmentId};
use hashbrown::HashSet;
use std::fmt::Debug;

/// One convex piece of a body together with its adjacency edges.
///
/// Neighbors are stored as ids, never as references; the [`World`](crate::world::World)
/// keeps the relation symmetric.
#[derive(Debug, Clone)]
pub struct Fragment<S: Clone + Send + Sync + Debug> {
    pub(crate) id: FragmentId,
    pub(crate) mesh: ConvexMesh<S>,
    pub(crate) volume: Real,
    pub(crate) side: Side,
    pub(crate) neighbors: HashSet<FragmentId>,
    pub(crate) body: BodyId,
    pub(crate) depth: u32,
}

impl<S: Clone + Send + Sync + Debug> Fragment<S> {
    pub const fn id(&self) -> FragmentId {
        self.id
    }

    /// Convex geometry in the owning body's local frame
    pub const fn mesh(&self) -> &ConvexMesh<S> {
        &self.mesh
    }

    pub const fn volume(&self) -> Real {
        self.volume
    }

    /// Side tag from the most recent cut this fragment took part in
    pub const fn side(&self) -> Side {
        self.side
    }

    pub const fn neighbors(&self) -> &HashSet<FragmentId> {
        &self.neighbors
    }

    pub fn is_adjacent_to(&self, other: FragmentId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Body that currently owns this fragment
    pub const fn body(&self) -> BodyId {
        self.body
    }

    /// Number of cuts this fragment survived since it was created
    pub const fn depth(&self) -> u32 {
        self.depth
    }
}
