//! `World`: the session-owned arena of fragments and bodies.
//!
//! Fragments live in an arena keyed by stable [`FragmentId`]s and refer to each
//! other only by id, so the adjacency graph carries no ownership cycles.
//! Bodies own lists of fragment ids. The [`ActiveRegistry`] of cuttable bodies
//! belongs to the world rather than to any global.

use crate::errors::ValidationError;
use crate::float_types::Real;
use crate::mesh::{ConvexMesh, merge::concatenate, plane::Side};
use hashbrown::{HashMap, HashSet};
use nalgebra::Isometry3;
use std::fmt::{self, Debug, Display};

pub mod body;
pub mod fragment;
pub mod registry;

pub use body::Body;
pub use fragment::Fragment;
pub use registry::ActiveRegistry;

/// Stable identity of a fragment; never reused within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(u32);

/// Stable identity of a body; never reused within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u32);

impl Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

impl Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct World<S: Clone + Send + Sync + Debug> {
    fragments: HashMap<FragmentId, Fragment<S>>,
    bodies: HashMap<BodyId, Body<S>>,
    active: ActiveRegistry,
    next_fragment: u32,
    next_body: u32,
}

impl<S: Clone + Send + Sync + Debug> Default for World<S> {
    fn default() -> Self {
        World::new()
    }
}

impl<S: Clone + Send + Sync + Debug> World<S> {
    pub fn new() -> Self {
        World {
            fragments: HashMap::new(),
            bodies: HashMap::new(),
            active: ActiveRegistry::new(),
            next_fragment: 0,
            next_body: 0,
        }
    }

    /// Add a convex body made of a single fragment; its volume is computed
    /// directly from the mesh. The body is registered as active.
    pub fn add_convex_body(
        &mut self,
        label: impl Into<String>,
        mesh: ConvexMesh<S>,
        placement: Isometry3<Real>,
    ) -> BodyId {
        let body = self.alloc_body_id();
        let volume = mesh.volume();
        let fragment = self.insert_fragment(mesh, volume, body, 0);
        self.insert_body(body, label.into(), vec![fragment], placement, 0);
        body
    }

    /// Add a (possibly concave) body from its supplied convex decomposition.
    ///
    /// `adjacency` lists pairs of indices into `parts` that touch. The body's
    /// volume is the sum of the parts' volumes. An empty `parts` list creates
    /// a body with no fragments, which cannot be cut.
    ///
    /// ## Errors
    /// [`ValidationError::AdjacencyIndex`] if a pair refers past the end of
    /// `parts`; nothing is added in that case.
    pub fn add_concave_body(
        &mut self,
        label: impl Into<String>,
        parts: Vec<ConvexMesh<S>>,
        adjacency: &[(usize, usize)],
        placement: Isometry3<Real>,
    ) -> Result<BodyId, ValidationError> {
        if let Some(&(a, b)) = adjacency
            .iter()
            .find(|&&(a, b)| a >= parts.len() || b >= parts.len())
        {
            return Err(ValidationError::AdjacencyIndex(a, b, parts.len()));
        }

        let body = self.alloc_body_id();
        let ids: Vec<FragmentId> = parts
            .into_iter()
            .map(|mesh| {
                let volume = mesh.volume();
                self.insert_fragment(mesh, volume, body, 0)
            })
            .collect();
        for &(a, b) in adjacency {
            self.link(ids[a], ids[b]);
        }
        self.insert_body(body, label.into(), ids, placement, 0);
        Ok(body)
    }

    /// Declare two fragments of the same body adjacent.
    /// Returns `false` (and changes nothing) for unknown ids, self-loops or
    /// fragments of different bodies.
    pub fn connect(&mut self, a: FragmentId, b: FragmentId) -> bool {
        match (self.fragments.get(&a), self.fragments.get(&b)) {
            (Some(fa), Some(fb)) if a != b && fa.body == fb.body => {
                self.link(a, b);
                true
            },
            _ => false,
        }
    }

    /// Remove the edge between two fragments, in both directions
    pub fn disconnect(&mut self, a: FragmentId, b: FragmentId) -> bool {
        let removed_a = self
            .fragments
            .get_mut(&a)
            .is_some_and(|f| f.neighbors.remove(&b));
        let removed_b = self
            .fragments
            .get_mut(&b)
            .is_some_and(|f| f.neighbors.remove(&a));
        removed_a || removed_b
    }

    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment<S>> {
        self.fragments.get(&id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body<S>> {
        self.bodies.get(&id)
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Fragment<S>> + '_ {
        self.fragments.values()
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body<S>> + '_ {
        self.bodies.values()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Bodies that can currently be cut
    pub const fn active(&self) -> &ActiveRegistry {
        &self.active
    }

    /// Take `body` out of the active registry; it stays in the world but can
    /// no longer be cut. Returns `false` if it was not active.
    pub fn deactivate(&mut self, body: BodyId) -> bool {
        self.active.remove(body)
    }

    /// Put an existing body back into the active registry.
    /// Returns `false` for unknown or already active bodies.
    pub fn activate(&mut self, body: BodyId) -> bool {
        self.bodies.contains_key(&body) && self.active.insert(body)
    }

    /// Sum of the volumes of all active bodies
    pub fn active_volume(&self) -> Real {
        self.active
            .iter()
            .filter_map(|id| self.bodies.get(&id))
            .map(|b| b.volume)
            .sum()
    }

    /// Check every graph and bookkeeping invariant:
    /// - adjacency is symmetric, only references live fragments and never
    ///   joins fragments of different bodies,
    /// - each fragment is listed by exactly one body, which it names as owner,
    /// - each body's volume equals its fragments' sum within `tolerance`.
    pub fn validate(&self, tolerance: Real) -> Result<(), ValidationError> {
        for fragment in self.fragments.values() {
            for &n in &fragment.neighbors {
                let Some(other) = self.fragments.get(&n) else {
                    return Err(ValidationError::DanglingNeighbor {
                        fragment: fragment.id,
                        neighbor: n,
                    });
                };
                if !other.neighbors.contains(&fragment.id) {
                    return Err(ValidationError::AsymmetricEdge { a: fragment.id, b: n });
                }
                if other.body != fragment.body {
                    return Err(ValidationError::CrossBodyEdge { a: fragment.id, b: n });
                }
            }
        }

        let mut listed: HashSet<FragmentId> = HashSet::with_capacity(self.fragments.len());
        for body in self.bodies.values() {
            let mut summed = 0.0;
            for &id in &body.fragments {
                let Some(fragment) = self.fragments.get(&id) else {
                    return Err(ValidationError::OrphanFragment(id));
                };
                if fragment.body != body.id {
                    return Err(ValidationError::OwnershipMismatch {
                        fragment: id,
                        listed_by: body.id,
                        owner: fragment.body,
                    });
                }
                if !listed.insert(id) {
                    return Err(ValidationError::OrphanFragment(id));
                }
                summed += fragment.volume;
            }
            if (summed - body.volume).abs() > tolerance {
                return Err(ValidationError::VolumeMismatch {
                    body: body.id,
                    stored: body.volume,
                    summed,
                });
            }
        }

        if let Some(orphan) = self.fragments.keys().find(|id| !listed.contains(*id)) {
            return Err(ValidationError::OrphanFragment(*orphan));
        }
        Ok(())
    }

    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
    // Mutation used by the cut pipeline
    // ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

    pub(crate) fn alloc_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;
        id
    }

    pub(crate) fn insert_fragment(
        &mut self,
        mesh: ConvexMesh<S>,
        volume: Real,
        body: BodyId,
        depth: u32,
    ) -> FragmentId {
        let id = FragmentId(self.next_fragment);
        self.next_fragment += 1;
        self.fragments.insert(
            id,
            Fragment {
                id,
                mesh,
                volume,
                side: Side::Unassigned,
                neighbors: HashSet::new(),
                body,
                depth,
            },
        );
        id
    }

    /// Drop a fragment from the arena, scrubbing any edge still pointing at it
    pub(crate) fn remove_fragment(&mut self, id: FragmentId) -> Option<Fragment<S>> {
        let fragment = self.fragments.remove(&id)?;
        for n in &fragment.neighbors {
            if let Some(other) = self.fragments.get_mut(n) {
                other.neighbors.remove(&id);
            }
        }
        Some(fragment)
    }

    pub(crate) fn fragment_mut(&mut self, id: FragmentId) -> Option<&mut Fragment<S>> {
        self.fragments.get_mut(&id)
    }

    /// Add an undirected edge without any checks
    pub(crate) fn link(&mut self, a: FragmentId, b: FragmentId) {
        if a == b {
            return;
        }
        if let Some(fa) = self.fragments.get_mut(&a) {
            fa.neighbors.insert(b);
        }
        if let Some(fb) = self.fragments.get_mut(&b) {
            fb.neighbors.insert(a);
        }
    }

    pub(crate) fn set_side(&mut self, id: FragmentId, side: Side) {
        if let Some(fragment) = self.fragments.get_mut(&id) {
            fragment.side = side;
        }
    }

    /// Register a body owning `fragments`, reparenting them; volume is the
    /// fragments' sum and geometry their concatenation.
    pub(crate) fn insert_body(
        &mut self,
        id: BodyId,
        label: String,
        fragments: Vec<FragmentId>,
        placement: Isometry3<Real>,
        generation: u32,
    ) {
        let mut volume = 0.0;
        for fid in &fragments {
            if let Some(fragment) = self.fragments.get_mut(fid) {
                fragment.body = id;
                volume += fragment.volume;
            }
        }
        let meshes: Vec<&ConvexMesh<S>> = fragments
            .iter()
            .filter_map(|fid| self.fragments.get(fid).map(|f| &f.mesh))
            .collect();
        let mesh = concatenate(&meshes);
        self.insert_body_with_mesh(Body {
            id,
            label,
            fragments,
            volume,
            placement,
            mesh,
            generation,
        });
    }

    /// Register an already assembled body as active
    pub(crate) fn insert_body_with_mesh(&mut self, body: Body<S>) {
        self.active.insert(body.id);
        self.bodies.insert(body.id, body);
    }

    /// Drop a body record and its registry entry; its fragments are untouched
    pub(crate) fn remove_body(&mut self, id: BodyId) -> Option<Body<S>> {
        self.active.remove(id);
        self.bodies.remove(&id)
    }
}
