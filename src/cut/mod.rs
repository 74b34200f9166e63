//! Plane cuts of convex and concave bodies.
//!
//! A cut slices every fragment of a body that the plane passes through,
//! repairs the adjacency graph around the halves, regroups the fragments of
//! each side into connected components and turns every component into a new
//! body. The cut body is removed from the world.
//!
//! All fallible checks and every slice happen before the world is touched: a
//! call either performs the whole cut or leaves the world exactly as it was.

use crate::errors::CutError;
use crate::float_types::{Real, tolerance};
use crate::mesh::{
    ConvexMesh,
    merge::{Concatenate, GeometryMerger},
    plane::{CuttingPlane, Side},
    slice::{PlaneSlicer, Slicer},
};
use crate::physics::{ImpulseApplicator, NoImpulses};
use crate::world::{BodyId, FragmentId, World};
use nalgebra::{Isometry3, Vector3};
use std::fmt::Debug;

pub mod merger;
pub mod neighborhood;
pub mod rewire;

/// Tunables of a [`Cutter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutterConfig {
    /// Impulse magnitude pushing new bodies apart when forces are requested
    pub separation_force: Real,
    /// Slack used when checking bookkeeping after a cut
    pub tolerance: Real,
    /// Bodies whose generation reached this value are refused
    pub max_generation: Option<u32>,
}

impl Default for CutterConfig {
    fn default() -> Self {
        CutterConfig {
            separation_force: 1.0,
            tolerance: tolerance(),
            max_generation: None,
        }
    }
}

impl CutterConfig {
    pub const fn with_separation_force(mut self, force: Real) -> Self {
        self.separation_force = force;
        self
    }

    pub const fn with_tolerance(mut self, tolerance: Real) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub const fn with_max_generation(mut self, generation: u32) -> Self {
        self.max_generation = Some(generation);
        self
    }
}

/// Bodies produced by a successful cut, per side of the plane.
///
/// Either list may be empty, e.g. when every fragment of one side was
/// consumed by the split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutOutcome {
    pub upper: Vec<BodyId>,
    pub lower: Vec<BodyId>,
}

impl CutOutcome {
    /// Upper bodies first, then lower ones
    pub fn bodies(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.upper.iter().chain(self.lower.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.upper.len() + self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty() && self.lower.is_empty()
    }
}

/// A fragment replaced by its two halves during one cut.
///
/// Short-lived: it exists only while the graph is being rewired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub original: FragmentId,
    pub upper: FragmentId,
    pub lower: FragmentId,
}

/// Parent facts the body merger needs once the parent is gone.
#[derive(Debug, Clone)]
pub(crate) struct CutContext {
    pub body: BodyId,
    pub label: String,
    pub placement: Isometry3<Real>,
    pub generation: u32,
    pub normal: Vector3<Real>,
    pub add_forces: bool,
}

/// Halves computed in the read-only phase, not yet in the world
struct PendingSplit<S: Clone + Send + Sync + Debug> {
    original: FragmentId,
    upper: ConvexMesh<S>,
    lower: ConvexMesh<S>,
}

/// Cuts bodies of a [`World`].
///
/// Geometry slicing, geometry merging and impulses are pluggable; the
/// defaults slice with [`PlaneSlicer`], concatenate meshes and apply no
/// impulses.
///
/// ## Example
/// ```
/// use cutrs::{cut::Cutter, mesh::{ConvexMesh, plane::CuttingPlane}, world::World};
/// use nalgebra::{Isometry3, Point3, Vector3};
///
/// let mut world: World<()> = World::new();
/// let cube = ConvexMesh::cuboid(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0), None);
/// let body = world.add_convex_body("cube", cube, Isometry3::identity());
///
/// let mut cutter = Cutter::new();
/// let plane = CuttingPlane::new(Point3::origin(), Vector3::x());
/// let outcome = cutter.cut_body(&mut world, body, &plane, false, Vector3::zeros()).unwrap();
/// assert_eq!(outcome.len(), 2);
/// assert!((world.active_volume() - 8.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Cutter<Sl, Mg = Concatenate, Im = NoImpulses> {
    pub config: CutterConfig,
    pub slicer: Sl,
    pub merger: Mg,
    pub impulses: Im,
}

impl<S: Clone + Send + Sync + Debug> Default for Cutter<PlaneSlicer<S>> {
    fn default() -> Self {
        Cutter::new()
    }
}

impl<S: Clone + Send + Sync + Debug> Cutter<PlaneSlicer<S>> {
    pub fn new() -> Self {
        Cutter {
            config: CutterConfig::default(),
            slicer: PlaneSlicer::default(),
            merger: Concatenate,
            impulses: NoImpulses,
        }
    }
}

impl<Sl, Mg, Im> Cutter<Sl, Mg, Im> {
    pub fn with_config(mut self, config: CutterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_slicer<T>(self, slicer: T) -> Cutter<T, Mg, Im> {
        Cutter {
            config: self.config,
            slicer,
            merger: self.merger,
            impulses: self.impulses,
        }
    }

    pub fn with_merger<T>(self, merger: T) -> Cutter<Sl, T, Im> {
        Cutter {
            config: self.config,
            slicer: self.slicer,
            merger,
            impulses: self.impulses,
        }
    }

    pub fn with_impulses<T>(self, impulses: T) -> Cutter<Sl, Mg, T> {
        Cutter {
            config: self.config,
            slicer: self.slicer,
            merger: self.merger,
            impulses,
        }
    }

    /// Cut `body` with `plane`, moved by `displacement` first.
    ///
    /// On success the body is gone from the world and its registry, and the
    /// returned outcome lists the bodies that replace it. When `add_forces`
    /// is set every new body receives an impulse of
    /// [`CutterConfig::separation_force`] away from the plane.
    ///
    /// ## Errors
    /// - [`CutError::UnknownBody`] if `body` is not in `world`
    /// - [`CutError::MissingRegistry`] if it is no longer active
    /// - [`CutError::DepthLimit`] if its generation reached the configured limit
    /// - [`CutError::EmptyDecomposition`] if it owns no fragments
    /// - [`CutError::NoIntersection`] if the plane passes through no fragment
    ///
    /// The world is unchanged whenever an error is returned.
    pub fn cut_body<S>(
        &mut self,
        world: &mut World<S>,
        body: BodyId,
        plane: &CuttingPlane,
        add_forces: bool,
        displacement: Vector3<Real>,
    ) -> Result<CutOutcome, CutError>
    where
        S: Clone + Send + Sync + Debug,
        Sl: Slicer<S>,
        Mg: GeometryMerger<S>,
        Im: ImpulseApplicator<S>,
    {
        let plane = plane.displaced(&displacement);
        let result = self.try_cut(world, body, &plane, add_forces);
        match &result {
            Ok(outcome) => {
                log::debug!(
                    "cut body {body} into {} upper and {} lower bodies",
                    outcome.upper.len(),
                    outcome.lower.len()
                );
            },
            Err(err @ CutError::NoIntersection(_)) => log::debug!("{err}"),
            Err(err) => log::warn!("{err}"),
        }
        result
    }

    /// Cut every currently active body with the same plane.
    ///
    /// Bodies created by this call are not cut again. Returns one result per
    /// body that was active when the call started, in registry order.
    pub fn cut_active<S>(
        &mut self,
        world: &mut World<S>,
        plane: &CuttingPlane,
        add_forces: bool,
    ) -> Vec<(BodyId, Result<CutOutcome, CutError>)>
    where
        S: Clone + Send + Sync + Debug,
        Sl: Slicer<S>,
        Mg: GeometryMerger<S>,
        Im: ImpulseApplicator<S>,
    {
        world
            .active()
            .snapshot()
            .into_iter()
            .map(|body| {
                let result = self.cut_body(world, body, plane, add_forces, Vector3::zeros());
                (body, result)
            })
            .collect()
    }

    fn try_cut<S>(
        &mut self,
        world: &mut World<S>,
        body: BodyId,
        plane: &CuttingPlane,
        add_forces: bool,
    ) -> Result<CutOutcome, CutError>
    where
        S: Clone + Send + Sync + Debug,
        Sl: Slicer<S>,
        Mg: GeometryMerger<S>,
        Im: ImpulseApplicator<S>,
    {
        let parent = world.body(body).ok_or(CutError::UnknownBody(body))?;
        if !world.active().contains(body) {
            return Err(CutError::MissingRegistry(body));
        }
        if let Some(limit) = self.config.max_generation
            && parent.generation() >= limit
        {
            return Err(CutError::DepthLimit {
                body,
                generation: parent.generation(),
            });
        }
        if parent.fragments().is_empty() {
            return Err(CutError::EmptyDecomposition(body));
        }

        let context = CutContext {
            body,
            label: parent.label().to_owned(),
            placement: *parent.placement(),
            generation: parent.generation(),
            normal: plane.normal(),
            add_forces,
        };
        let local = plane.to_local(&context.placement);

        // Read-only phase: slice and classify without touching the world
        let mut whole: Vec<(FragmentId, Side)> = Vec::new();
        let mut pending: Vec<PendingSplit<S>> = Vec::new();
        for &id in parent.fragments() {
            let Some(fragment) = world.fragment(id) else {
                continue;
            };
            match self.slicer.slice(fragment.mesh(), &local) {
                Some((upper, lower)) => pending.push(PendingSplit {
                    original: id,
                    upper,
                    lower,
                }),
                None => whole.push((id, plane.side_of(fragment.mesh(), &context.placement))),
            }
        }
        if pending.is_empty() {
            return Err(CutError::NoIntersection(body));
        }

        // A convex body has one fragment and no edges: the extraction below
        // yields exactly one single-fragment group per side.
        let (upper, lower) = Self::apply_splits(world, body, whole, pending);
        let upper_groups = neighborhood::neighborhoods(world, &upper);
        let lower_groups = neighborhood::neighborhoods(world, &lower);

        let outcome = CutOutcome {
            upper: self.merge_groups(world, &context, upper_groups, Side::Upper),
            lower: self.merge_groups(world, &context, lower_groups, Side::Lower),
        };

        world.remove_body(body);
        self.impulses.body_removed(body);

        #[cfg(debug_assertions)]
        if let Err(err) = world.validate(self.config.tolerance.max(tolerance())) {
            log::error!("world inconsistent after cutting body {body}: {err}");
        }
        Ok(outcome)
    }

    /// Mutation phase: tag whole fragments, insert and wire children, destroy
    /// the split originals. Returns the Upper and Lower fragment collections.
    fn apply_splits<S: Clone + Send + Sync + Debug>(
        world: &mut World<S>,
        body: BodyId,
        whole: Vec<(FragmentId, Side)>,
        pending: Vec<PendingSplit<S>>,
    ) -> (Vec<FragmentId>, Vec<FragmentId>) {
        let mut upper = Vec::with_capacity(whole.len() + pending.len());
        let mut lower = Vec::with_capacity(whole.len() + pending.len());

        for (id, side) in whole {
            world.set_side(id, side);
            match side {
                Side::Upper => upper.push(id),
                Side::Lower => lower.push(id),
                Side::Unassigned => {},
            }
        }

        let splits: Vec<Split> = pending
            .into_iter()
            .map(|p| {
                world.set_side(p.original, Side::Unassigned);
                let depth = world.fragment(p.original).map_or(0, |f| f.depth());
                let upper_volume = p.upper.volume();
                let lower_volume = p.lower.volume();
                Split {
                    original: p.original,
                    upper: world.insert_fragment(p.upper, upper_volume, body, depth),
                    lower: world.insert_fragment(p.lower, lower_volume, body, depth),
                }
            })
            .collect();

        for split in &splits {
            rewire::apply_split(world, split);
            world.set_side(split.upper, Side::Upper);
            world.set_side(split.lower, Side::Lower);
            upper.push(split.upper);
            lower.push(split.lower);
            world.remove_fragment(split.original);
        }

        let severed = rewire::sever_cross_side_edges(world, &upper);
        if severed > 0 {
            log::trace!("severed {severed} edges across the cutting plane");
        }
        (upper, lower)
    }
}
