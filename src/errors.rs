//! Cut and validation errors

use crate::float_types::Real;
use crate::world::{BodyId, FragmentId};

/// Reasons a call to [`Cutter::cut_body`](crate::cut::Cutter::cut_body) did not cut.
///
/// Every variant is raised before any fragment, body or registry state is
/// touched, so a failed cut is always a no-op.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CutError {
    /// The body owns no convex fragments
    #[error("cannot cut body {0}: it has no convex fragments")]
    EmptyDecomposition(BodyId),
    /// The plane does not pass through the interior of any fragment
    #[error("plane does not intersect any fragment of body {0}")]
    NoIntersection(BodyId),
    /// The body is not (or no longer) in the active registry
    #[error("body {0} is not registered as active")]
    MissingRegistry(BodyId),
    /// The id does not name a body of this world
    #[error("no body with id {0}")]
    UnknownBody(BodyId),
    /// The body has been cut as often as the configuration allows
    #[error("body {body} reached the cut generation limit ({generation})")]
    DepthLimit { body: BodyId, generation: u32 },
}

/// Graph and bookkeeping invariants reported by [`World::validate`](crate::world::World::validate)
/// and by body setup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// `a` lists `b` as neighbor but `b` does not list `a`
    #[error("fragment {a} lists {b} as neighbor but not vice versa")]
    AsymmetricEdge { a: FragmentId, b: FragmentId },
    /// An edge joins fragments owned by different bodies
    #[error("fragments {a} and {b} are adjacent but belong to different bodies")]
    CrossBodyEdge { a: FragmentId, b: FragmentId },
    /// A neighbor id that is not in the arena
    #[error("fragment {fragment} references missing neighbor {neighbor}")]
    DanglingNeighbor { fragment: FragmentId, neighbor: FragmentId },
    /// Fragment's owner field disagrees with the body that lists it
    #[error("fragment {fragment} is listed by body {listed_by} but owned by {owner}")]
    OwnershipMismatch { fragment: FragmentId, listed_by: BodyId, owner: BodyId },
    /// Fragment listed by no body, or by more than one
    #[error("fragment {0} is not owned by exactly one body")]
    OrphanFragment(FragmentId),
    /// Aggregate volume drifted from the fragments' sum
    #[error("body {body} volume {stored} differs from fragment sum {summed}")]
    VolumeMismatch { body: BodyId, stored: Real, summed: Real },
    /// Adjacency pair given at setup refers to a part that does not exist
    #[error("adjacency pair ({0}, {1}) is out of range for {2} parts")]
    AdjacencyIndex(usize, usize, usize),
}
