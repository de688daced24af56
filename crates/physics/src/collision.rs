//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for different body types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment geometry
    Environment = 1 << 0,
    /// Player hull
    Player = 1 << 1,
    /// Player projectiles
    PlayerProjectile = 1 << 2,
    /// Decorative showcase objects
    Decoration = 1 << 3,
}

impl CollisionGroup {
    /// Membership and filter as rapier interaction groups.
    pub fn interaction_groups(pair: (Group, Group)) -> InteractionGroups {
        InteractionGroups::new(pair.0, pair.1)
    }

    /// Create a collision group for the player hull. Its own shots never hit it.
    pub fn player() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Player as u32);
        let filter = Group::from_bits_retain(
            Self::Environment as u32 | Self::Decoration as u32,
        );
        (membership, filter)
    }

    /// Create a collision group for player projectiles.
    pub fn player_projectile() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::PlayerProjectile as u32);
        let filter = Group::from_bits_retain(Self::Environment as u32 | Self::Decoration as u32);
        (membership, filter)
    }

    /// Create a collision group for showcase decorations.
    pub fn decoration() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Decoration as u32);
        let filter = Group::from_bits_retain(
            Self::Environment as u32
                | Self::Player as u32
                | Self::PlayerProjectile as u32
                | Self::Decoration as u32,
        );
        (membership, filter)
    }
}

/// Links a gameplay object to its physics handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: Option<ColliderHandle>,
}

impl PhysicsBody {
    pub fn with_collider(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider: Some(collider),
        }
    }
}
