//! Physics world management with Rapier3D.
//!
//! Props are dynamic box bodies ("wrappers") sized independently of their visual
//! meshes; the room is static cuboids. The grab controller drives held bodies by
//! writing linear velocity directly, so this wrapper exposes velocity, damping,
//! and gravity-scale accessors rather than force APIs.

use crate::collision::CollisionGroup;
use engine_core::Vec3;
use glam::Quat;
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;

/// Mass and surface response of a prop wrapper body.
#[derive(Debug, Clone, Copy)]
pub struct PropBodyParams {
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
}

impl Default for PropBodyParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            restitution: 0.4,
            friction: 0.6,
        }
    }
}

fn env_collision_groups() -> InteractionGroups {
    let (membership, filter) = CollisionGroup::environment();
    InteractionGroups::new(membership, filter)
}

fn prop_collision_groups() -> InteractionGroups {
    let (membership, filter) = CollisionGroup::prop();
    InteractionGroups::new(membership, filter)
}

fn to_na(v: Vec3) -> Vector3<Real> {
    vector![v.x, v.y, v.z]
}

fn to_unit_quat(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Step the physics simulation.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Update query pipeline for raycasting without stepping the simulation.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a dynamic prop wrapper body: a box collider with CCD enabled so small
    /// instruments don't tunnel through the table when dropped.
    pub fn add_prop_body(
        &mut self,
        position: Vec3,
        rotation: Quat,
        half_extents: Vec3,
        params: PropBodyParams,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let pose = Isometry3::from_parts(
            Translation3::new(position.x, position.y, position.z),
            to_unit_quat(rotation),
        );
        let rigid_body = RigidBodyBuilder::dynamic()
            .position(pose)
            .linear_damping(0.1)
            .ccd_enabled(true)
            .build();
        let body_handle = self.rigid_body_set.insert(rigid_body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .mass(params.mass)
            .restitution(params.restitution)
            .friction(params.friction)
            .collision_groups(prop_collision_groups())
            .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);
        (body_handle, collider_handle)
    }

    /// Add a static cuboid collider (tables, walls, bed, patient). No parent
    /// body; the collider is fixed in the world.
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
    ) -> ColliderHandle {
        let axisangle = Vector3::y_axis().into_inner() * (rotation_y_rad as Real);
        let position = Isometry3::new(to_na(translation), axisangle);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(position)
            .friction(0.5)
            .restitution(0.2)
            .collision_groups(env_collision_groups())
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(env_collision_groups())
            .build();
        self.collider_set.insert(collider)
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Number of rigid bodies currently in the world (teardown checks).
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    // ── Body accessors ──────────────────────────────────────────────────
    //
    // All accessors tolerate stale handles: a handle that outlived its body
    // reads as `None` / writes as a no-op.

    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    pub fn body_rotation(&self, handle: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set.get(handle).map(|body| {
            let rot = body.rotation();
            Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w)
        })
    }

    /// Teleport a body to a pose, clearing any residual motion. Used for prop
    /// resets and for parking an instrument on a measurement target.
    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_translation(to_na(position), true);
            body.set_rotation(to_unit_quat(rotation), true);
            body.set_linvel(Vector::zeros(), true);
            body.set_angvel(Vector::zeros(), true);
        }
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|body| {
            let v = body.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(to_na(velocity), true);
        }
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_angvel(to_na(velocity), true);
        }
    }

    pub fn linear_damping(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle).map(|body| body.linear_damping())
    }

    pub fn set_linear_damping(&mut self, handle: RigidBodyHandle, damping: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linear_damping(damping);
        }
    }

    pub fn angular_damping(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle).map(|body| body.angular_damping())
    }

    pub fn set_angular_damping(&mut self, handle: RigidBodyHandle, damping: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_angular_damping(damping);
        }
    }

    pub fn gravity_scale(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(handle).map(|body| body.gravity_scale())
    }

    pub fn set_gravity_scale(&mut self, handle: RigidBodyHandle, scale: f32) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_gravity_scale(scale, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_body_falls_under_gravity() {
        let mut world = PhysicsWorld::new();
        world.add_ground_plane();
        let (body, _) = world.add_prop_body(
            Vec3::new(0.0, 2.0, 0.0),
            Quat::IDENTITY,
            Vec3::splat(0.1),
            PropBodyParams::default(),
        );
        for _ in 0..30 {
            world.step();
        }
        let pos = world.body_position(body).unwrap();
        assert!(pos.y < 2.0);
    }

    #[test]
    fn gravity_scale_zero_holds_altitude() {
        let mut world = PhysicsWorld::new();
        let (body, _) = world.add_prop_body(
            Vec3::new(0.0, 2.0, 0.0),
            Quat::IDENTITY,
            Vec3::splat(0.1),
            PropBodyParams::default(),
        );
        world.set_gravity_scale(body, 0.0);
        for _ in 0..30 {
            world.step();
        }
        let pos = world.body_position(body).unwrap();
        assert!((pos.y - 2.0).abs() < 1e-3);
    }

    #[test]
    fn stale_handle_reads_none() {
        let mut world = PhysicsWorld::new();
        let (body, _) = world.add_prop_body(
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::splat(0.1),
            PropBodyParams::default(),
        );
        world.remove_body(body);
        assert!(world.body_position(body).is_none());
        // Writes against the stale handle must be silent no-ops.
        world.set_linear_velocity(body, Vec3::ONE);
        world.set_linear_damping(body, 5.0);
    }
}
