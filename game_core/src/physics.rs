//! Rigid-body collaborator
//!
//! The motion models only ever see the [`Body2D`] trait. [`PhysicsSpace`]
//! owns the rapier2d sets, hands out [`SpaceBody`] views for a single body,
//! and advances everything with collision resolution in [`PhysicsSpace::step`].

use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

pub type BodyHandle = RigidBodyHandle;

/// Position and facing of a body (angle in radians, 0 = +x)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }
}

/// Surface response of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub elasticity: f32,
}

/// A single dynamic body as seen by the vehicle and ball models
pub trait Body2D {
    fn position(&self) -> Vec2;
    fn angle(&self) -> f32;
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn angular_velocity(&self) -> f32;
    fn set_angular_velocity(&mut self, omega: f32);
    /// Apply an impulse given in the body's local frame, at its centre of mass.
    /// Velocity changes immediately.
    fn apply_local_impulse(&mut self, impulse: Vec2);
}

/// Mutable view of one body inside a [`PhysicsSpace`]
pub struct SpaceBody<'a> {
    body: &'a mut RigidBody,
}

impl Body2D for SpaceBody<'_> {
    fn position(&self) -> Vec2 {
        let t = self.body.translation();
        Vec2::new(t.x, t.y)
    }

    fn angle(&self) -> f32 {
        self.body.rotation().angle()
    }

    fn velocity(&self) -> Vec2 {
        let v = self.body.linvel();
        Vec2::new(v.x, v.y)
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.body.set_linvel(vector![velocity.x, velocity.y], true);
    }

    fn angular_velocity(&self) -> f32 {
        self.body.angvel()
    }

    fn set_angular_velocity(&mut self, omega: f32) {
        self.body.set_angvel(omega, true);
    }

    fn apply_local_impulse(&mut self, impulse: Vec2) {
        let world = Vec2::from_angle(self.angle()).rotate(impulse);
        self.body.apply_impulse(vector![world.x, world.y], true);
    }
}

/// Top-down (zero gravity) rapier2d world
pub struct PhysicsSpace {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    static_colliders: Vec<ColliderHandle>,
}

impl Default for PhysicsSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsSpace {
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            static_colliders: Vec::new(),
        }
    }

    /// Add a dynamic box. `size` is the full (length, width), length along the
    /// body's local x axis.
    pub fn add_box(&mut self, pose: Pose, size: Vec2, mass: f32, material: Material) -> BodyHandle {
        let collider = ColliderBuilder::cuboid(size.x / 2.0, size.y / 2.0);
        self.add_dynamic(pose, collider, mass, material)
    }

    /// Add a dynamic circle at `position`
    pub fn add_circle(
        &mut self,
        position: Vec2,
        radius: f32,
        mass: f32,
        material: Material,
    ) -> BodyHandle {
        let collider = ColliderBuilder::ball(radius);
        self.add_dynamic(Pose::new(position, 0.0), collider, mass, material)
    }

    fn add_dynamic(
        &mut self,
        pose: Pose,
        collider: ColliderBuilder,
        mass: f32,
        material: Material,
    ) -> BodyHandle {
        let rb = RigidBodyBuilder::dynamic()
            .translation(vector![pose.position.x, pose.position.y])
            .rotation(pose.angle)
            .build();
        let handle = self.rigid_body_set.insert(rb);

        let collider = collider
            .mass(mass)
            .friction(material.friction)
            .restitution(material.elasticity)
            .friction_combine_rule(CoefficientCombineRule::Multiply)
            .restitution_combine_rule(CoefficientCombineRule::Multiply)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        // Impulses applied before the first step must already see the mass.
        if let Some(rb) = self.rigid_body_set.get_mut(handle) {
            rb.recompute_mass_properties_from_colliders(&self.collider_set);
        }
        handle
    }

    /// Add an immovable line segment (field walls)
    pub fn add_static_segment(&mut self, a: Vec2, b: Vec2, material: Material) -> ColliderHandle {
        let collider = ColliderBuilder::segment(point![a.x, a.y], point![b.x, b.y])
            .friction(material.friction)
            .restitution(material.elasticity)
            .friction_combine_rule(CoefficientCombineRule::Multiply)
            .restitution_combine_rule(CoefficientCombineRule::Multiply)
            .build();
        let handle = self.collider_set.insert(collider);
        self.static_colliders.push(handle);
        handle
    }

    /// Remove a body and its colliders. Returns false if it was not present.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<SpaceBody<'_>> {
        self.rigid_body_set
            .get_mut(handle)
            .map(|body| SpaceBody { body })
    }

    pub fn pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.rigid_body_set.get(handle).map(|rb| {
            let t = rb.translation();
            Pose::new(Vec2::new(t.x, t.y), rb.rotation().angle())
        })
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(handle).map(|rb| {
            let v = rb.linvel();
            Vec2::new(v.x, v.y)
        })
    }

    #[cfg(test)]
    fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle).map(|rb| rb.mass())
    }

    /// Teleport a body, keeping its velocity
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(handle) {
            rb.set_translation(vector![position.x, position.y], true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn static_count(&self) -> usize {
        self.static_colliders.len()
    }

    /// Advance every body by `dt` seconds. Non-positive steps are ignored.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}

/// In-memory body for exercising the motion models without a physics world
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct MockBody {
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub omega: f32,
    pub mass: f32,
}

#[cfg(test)]
impl MockBody {
    pub fn new(angle: f32, velocity: Vec2, mass: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            angle,
            velocity,
            omega: 0.0,
            mass,
        }
    }
}

#[cfg(test)]
impl Body2D for MockBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn angle(&self) -> f32 {
        self.angle
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn angular_velocity(&self) -> f32 {
        self.omega
    }

    fn set_angular_velocity(&mut self, omega: f32) {
        self.omega = omega;
    }

    fn apply_local_impulse(&mut self, impulse: Vec2) {
        self.velocity += Vec2::from_angle(self.angle).rotate(impulse) / self.mass;
    }
}
