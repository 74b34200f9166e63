//! Separation impulses for freshly cut bodies.

use crate::float_types::{
    Real,
    rapier3d::prelude::{
        ColliderBuilder, ColliderSet, ImpulseJointSet, IslandManager, MultibodyJointSet,
        RigidBodyBuilder, RigidBodyHandle, RigidBodySet, SharedShape,
    },
};
use crate::world::{Body, BodyId};
use hashbrown::HashMap;
use nalgebra::Vector3;
use std::fmt::Debug;

/// Physics collaborator notified by the cut pipeline.
pub trait ImpulseApplicator<S: Clone + Send + Sync + Debug> {
    /// Push `body` along `direction` (not necessarily unit) with `magnitude`
    fn apply_impulse(&mut self, body: &Body<S>, direction: Vector3<Real>, magnitude: Real);

    /// `body` was consumed by a cut and no longer exists
    fn body_removed(&mut self, _body: BodyId) {}
}

/// Ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImpulses;

impl<S: Clone + Send + Sync + Debug> ImpulseApplicator<S> for NoImpulses {
    fn apply_impulse(&mut self, _body: &Body<S>, _direction: Vector3<Real>, _magnitude: Real) {}
}

/// Rapier-backed applicator.
///
/// Bodies get a dynamic rigid body with a trimesh collider built from their
/// combined mesh the first time an impulse is requested for them; rigid
/// bodies of consumed bodies are removed together with their colliders.
pub struct RapierImpulses {
    pub rigid_bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub islands: IslandManager,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub density: Real,
    handles: HashMap<BodyId, RigidBodyHandle>,
}

impl Default for RapierImpulses {
    fn default() -> Self {
        RapierImpulses::new(1.0)
    }
}

impl RapierImpulses {
    pub fn new(density: Real) -> Self {
        RapierImpulses {
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            islands: IslandManager::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            density,
            handles: HashMap::new(),
        }
    }

    /// Rigid body currently standing in for `body`, if any
    pub fn handle(&self, body: BodyId) -> Option<RigidBodyHandle> {
        self.handles.get(&body).copied()
    }

    /// Use an existing rigid body for `body`
    pub fn attach(&mut self, body: BodyId, handle: RigidBodyHandle) {
        self.handles.insert(body, handle);
    }

    /// Create (or fetch) the rigid body of `body`.
    /// Returns `None` if its mesh cannot be turned into a collider.
    pub fn spawn<S: Clone + Send + Sync + Debug>(&mut self, body: &Body<S>) -> Option<RigidBodyHandle> {
        if let Some(handle) = self.handle(body.id()) {
            return Some(handle);
        }
        let trimesh = body.mesh().to_trimesh()?;

        let rb = RigidBodyBuilder::dynamic().position(*body.placement()).build();
        let handle = self.rigid_bodies.insert(rb);

        let collider = ColliderBuilder::new(SharedShape::new(trimesh))
            .density(self.density)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.rigid_bodies);

        self.handles.insert(body.id(), handle);
        Some(handle)
    }
}

impl<S: Clone + Send + Sync + Debug> ImpulseApplicator<S> for RapierImpulses {
    fn apply_impulse(&mut self, body: &Body<S>, direction: Vector3<Real>, magnitude: Real) {
        let Some(handle) = self.spawn(body) else {
            log::debug!("body {} has no collider geometry, impulse skipped", body.id());
            return;
        };
        let Some(unit) = direction.try_normalize(Real::EPSILON) else {
            return;
        };
        if let Some(rb) = self.rigid_bodies.get_mut(handle) {
            rb.apply_impulse(unit * magnitude, true);
        }
    }

    fn body_removed(&mut self, body: BodyId) {
        if let Some(handle) = self.handles.remove(&body) {
            self.rigid_bodies.remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }
}
