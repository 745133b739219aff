//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static room geometry (floor, walls, tables, bed, patient).
    Environment = 1 << 0,
    /// Grabbable instrument/prop wrapper bodies.
    Prop = 1 << 1,
    /// The player capsule.
    Player = 1 << 2,
}

impl CollisionGroup {
    /// Groups for static environment: collides with everything.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Groups for prop wrappers: rest on the environment, stack against each
    /// other, and can be pushed by the player.
    pub fn prop() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Prop as u32);
        let filter = Group::from_bits_retain(
            Self::Environment as u32 | Self::Prop as u32 | Self::Player as u32,
        );
        (membership, filter)
    }

    /// Groups for the player body.
    pub fn player() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Player as u32);
        let filter = Group::from_bits_retain(Self::Environment as u32 | Self::Prop as u32);
        (membership, filter)
    }
}

/// Component linking an ECS entity to its physics handles.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

impl PhysicsBody {
    pub fn new(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider,
        }
    }
}
