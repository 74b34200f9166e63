//! Turning connected fragment groups into new bodies.

use crate::cut::{CutContext, Cutter};
use crate::mesh::{ConvexMesh, merge::GeometryMerger, plane::Side};
use crate::physics::ImpulseApplicator;
use crate::world::{Body, BodyId, FragmentId, World};
use std::fmt::Debug;

impl<Sl, Mg, Im> Cutter<Sl, Mg, Im> {
    /// Create one body per group on `side` of the cut described by `context`.
    ///
    /// Each body takes ownership of its group's existing fragments, which all
    /// gain one level of depth. Its volume is the fragments' sum, its geometry
    /// comes from the configured [`GeometryMerger`] and it inherits the
    /// parent's placement. New bodies are registered as active. Adjacency is
    /// left as it is.
    pub(crate) fn merge_groups<S>(
        &mut self,
        world: &mut World<S>,
        context: &CutContext,
        groups: Vec<Vec<FragmentId>>,
        side: Side,
    ) -> Vec<BodyId>
    where
        S: Clone + Send + Sync + Debug,
        Mg: GeometryMerger<S>,
        Im: ImpulseApplicator<S>,
    {
        let generation = context.generation + 1;
        let mut created = Vec::with_capacity(groups.len());

        for group in groups {
            let id = world.alloc_body_id();

            let mut volume = 0.0;
            for &fid in &group {
                if let Some(fragment) = world.fragment_mut(fid) {
                    fragment.body = id;
                    fragment.depth += 1;
                    volume += fragment.volume;
                }
            }
            let meshes: Vec<&ConvexMesh<S>> = group
                .iter()
                .filter_map(|&fid| world.fragment(fid).map(|f| f.mesh()))
                .collect();
            let mesh = self.merger.merge(&meshes);

            world.insert_body_with_mesh(Body {
                id,
                label: format!("{} {}", context.label, generation),
                fragments: group,
                volume,
                placement: context.placement,
                mesh,
                generation,
            });
            log::trace!("body {id} ({side:?} of {}) has volume {volume}", context.body);

            if context.add_forces
                && let Some(body) = world.body(id)
            {
                self.impulses.apply_impulse(
                    body,
                    context.normal * side.sign(),
                    self.config.separation_force,
                );
            }
            created.push(id);
        }

        created
    }
}
