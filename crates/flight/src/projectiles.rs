//! Fixed-capacity projectile pool.
//!
//! Every slot owns a physics body and a billboard node built once at
//! startup. An inactive slot's body is disabled and its node detached; a
//! live slot has both in play. Exhaustion silently drops the shot.

use crate::config::ProjectileTuning;
use engine_core::{NodeId, NodeKind, SceneError, SceneGraph, Transform};
use glam::{Quat, Vec3};
use physics::{CollisionGroup, PhysicsBody, PhysicsWorld, SphereBodyDesc};

#[derive(Debug, Clone)]
struct Slot {
    physics: PhysicsBody,
    visual: NodeId,
    active: bool,
    /// Session time at which the slot returns to the pool.
    expires_at: Option<f32>,
}

pub struct ProjectilePool {
    slots: Vec<Slot>,
    limit: usize,
    tuning: ProjectileTuning,
}

impl ProjectilePool {
    pub fn new(
        physics: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        tuning: &ProjectileTuning,
    ) -> Result<Self, SceneError> {
        let mut slots = Vec::with_capacity(tuning.capacity);
        for _ in 0..tuning.capacity {
            let (body, collider) = physics.add_sphere_body(&SphereBodyDesc {
                groups: CollisionGroup::player_projectile(),
                enabled: false,
                ..SphereBodyDesc::new(tuning.radius, tuning.mass)
            });
            let visual = scene.spawn(NodeKind::Billboard, Transform::default(), None)?;
            slots.push(Slot {
                physics: PhysicsBody::with_collider(body, collider),
                visual,
                active: false,
                expires_at: None,
            });
        }
        log::debug!("Projectile pool ready with {} slots", slots.len());
        Ok(Self {
            slots,
            limit: tuning.capacity,
            tuning: tuning.clone(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Cap on simultaneously live shots, at most the capacity.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.min(self.slots.len());
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|slot| slot.active)
    }

    /// Indices of slots currently in flight.
    pub fn active_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, _)| index)
    }

    /// Claim the first free slot, or `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<usize> {
        if self.active_count() >= self.limit {
            return None;
        }
        let index = self.slots.iter().position(|slot| !slot.active)?;
        self.slots[index].active = true;
        Some(index)
    }

    /// Return a slot to the pool. Releasing a free slot does nothing.
    pub fn release(
        &mut self,
        physics: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        index: usize,
    ) -> Result<bool, SceneError> {
        let Some(slot) = self.slots.get_mut(index) else {
            return Ok(false);
        };
        if !slot.active {
            return Ok(false);
        }
        scene.detach(slot.visual)?;
        let body = slot.physics.rigid_body;
        physics.set_enabled(body, false);
        physics.set_linear_velocity(body, Vec3::ZERO);
        slot.expires_at = None;
        slot.active = false;
        Ok(true)
    }

    /// Launch a shot from `origin` along the forward axis of `rotation`.
    /// Returns the slot used, or `None` when the pool is exhausted.
    pub fn fire(
        &mut self,
        physics: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        origin: Vec3,
        rotation: Quat,
        now: f32,
    ) -> Result<Option<usize>, SceneError> {
        let Some(index) = self.acquire() else {
            log::debug!("Projectile pool exhausted, shot dropped");
            return Ok(None);
        };
        let forward = rotation * -Vec3::Z;
        let position = origin + forward * self.tuning.muzzle_offset;
        let slot = &mut self.slots[index];
        let body = slot.physics.rigid_body;

        physics.set_pose(body, position, rotation);
        physics.set_linear_velocity(body, forward * self.tuning.speed);
        physics.set_angular_velocity(body, Vec3::ZERO);
        physics.set_enabled(body, true);
        scene.set_local(slot.visual, Transform::from_position_rotation(position, rotation))?;
        scene.attach(slot.visual)?;
        slot.expires_at = Some(now + self.tuning.time_to_live);
        Ok(Some(index))
    }

    /// Expire old shots, then copy body poses onto the live visuals.
    pub fn update_all(
        &mut self,
        physics: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        now: f32,
    ) -> Result<(), SceneError> {
        let expired: Vec<usize> = self
            .active_slots()
            .filter(|&index| self.slots[index].expires_at.is_some_and(|at| now >= at))
            .collect();
        for index in expired {
            self.release(physics, scene, index)?;
        }

        for slot in self.slots.iter().filter(|slot| slot.active) {
            if let Some(pose) = physics.get_body_transform(slot.physics.rigid_body) {
                scene.set_local(slot.visual, pose)?;
            }
        }
        Ok(())
    }

    /// World position of a live shot.
    pub fn position(&self, physics: &PhysicsWorld, index: usize) -> Option<Vec3> {
        let slot = self.slots.get(index).filter(|slot| slot.active)?;
        physics.position(slot.physics.rigid_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(capacity: usize) -> (PhysicsWorld, SceneGraph, ProjectilePool) {
        let mut physics = PhysicsWorld::new();
        let mut scene = SceneGraph::new();
        let tuning = ProjectileTuning {
            capacity,
            ..ProjectileTuning::default()
        };
        let pool = ProjectilePool::new(&mut physics, &mut scene, &tuning).unwrap();
        (physics, scene, pool)
    }

    /// Inactive slots are neither attached nor simulated; active ones are both.
    fn assert_slots_consistent(pool: &ProjectilePool, physics: &PhysicsWorld, scene: &SceneGraph) {
        for (index, slot) in pool.slots.iter().enumerate() {
            assert_eq!(scene.is_attached(slot.visual), slot.active, "slot {index} visual");
            assert_eq!(physics.contains(slot.physics.rigid_body), slot.active, "slot {index} body");
            assert_eq!(slot.expires_at.is_some(), slot.active, "slot {index} expiry");
        }
    }

    #[test]
    fn fresh_pool_has_nothing_in_play() {
        let (physics, scene, pool) = setup(4);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(physics.enabled_body_count(), 0);
        assert_eq!(scene.attached_count(), 0);
        assert_slots_consistent(&pool, &physics, &scene);
    }

    #[test]
    fn shot_leaves_the_muzzle_at_speed() {
        let (mut physics, mut scene, mut pool) = setup(2);
        let slot = pool
            .fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 0.0)
            .unwrap()
            .unwrap();
        assert_eq!(pool.position(&physics, slot), Some(Vec3::new(0.0, 0.0, -1.5)));
        assert_eq!(physics.linear_velocity(pool.slots[slot].physics.rigid_body), Some(Vec3::new(0.0, 0.0, -150.0)));
        assert_slots_consistent(&pool, &physics, &scene);

        physics.step();
        pool.update_all(&mut physics, &mut scene, 1.0 / 60.0).unwrap();
        let visual = scene.local(pool.slots[slot].visual).unwrap();
        assert!((visual.position.z - (-1.5 - 150.0 / 60.0)).abs() < 1e-3);
    }

    #[test]
    fn full_pool_drops_the_shot_unchanged() {
        let (mut physics, mut scene, mut pool) = setup(3);
        for _ in 0..3 {
            assert!(pool.fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 0.0).unwrap().is_some());
        }
        let before: Vec<usize> = pool.active_slots().collect();
        let bodies = physics.enabled_body_count();
        let attached = scene.attached_count();

        assert_eq!(pool.fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 0.1).unwrap(), None);
        assert_eq!(pool.active_slots().collect::<Vec<_>>(), before);
        assert_eq!(physics.enabled_body_count(), bodies);
        assert_eq!(scene.attached_count(), attached);
        assert_slots_consistent(&pool, &physics, &scene);
    }

    #[test]
    fn double_release_is_a_no_op() {
        let (mut physics, mut scene, mut pool) = setup(2);
        let slot = pool
            .fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 0.0)
            .unwrap()
            .unwrap();
        assert_eq!(pool.release(&mut physics, &mut scene, slot), Ok(true));
        assert_eq!(pool.release(&mut physics, &mut scene, slot), Ok(false));
        assert_eq!(pool.release(&mut physics, &mut scene, 99), Ok(false));
        assert_slots_consistent(&pool, &physics, &scene);
    }

    #[test]
    fn shots_expire_after_their_lifetime() {
        let (mut physics, mut scene, mut pool) = setup(2);
        pool.fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 0.0).unwrap();
        pool.fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 1.0).unwrap();
        pool.update_all(&mut physics, &mut scene, 2.9).unwrap();
        assert_eq!(pool.active_count(), 2);
        pool.update_all(&mut physics, &mut scene, 3.0).unwrap();
        assert_eq!(pool.active_count(), 1);
        pool.update_all(&mut physics, &mut scene, 4.0).unwrap();
        assert_eq!(pool.active_count(), 0);
        assert_slots_consistent(&pool, &physics, &scene);
    }

    #[test]
    fn early_release_cancels_the_pending_expiry() {
        let (mut physics, mut scene, mut pool) = setup(1);
        let slot = pool
            .fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 0.0)
            .unwrap()
            .unwrap();
        // Released out of band, then reused before the first shot's timer.
        pool.release(&mut physics, &mut scene, slot).unwrap();
        pool.update_all(&mut physics, &mut scene, 0.5).unwrap();
        let reused = pool
            .fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 2.0)
            .unwrap();
        assert_eq!(reused, Some(slot));
        pool.update_all(&mut physics, &mut scene, 3.5).unwrap();
        assert!(pool.is_active(slot));
        pool.update_all(&mut physics, &mut scene, 5.0).unwrap();
        assert!(!pool.is_active(slot));
    }

    #[test]
    fn refiring_a_released_slot_keeps_the_pool_bounded() {
        let (mut physics, mut scene, mut pool) = setup(1);
        pool.fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 0.0).unwrap();
        for frame in 1..=100 {
            let now = frame as f32 / 60.0;
            assert_eq!(pool.release(&mut physics, &mut scene, 0), Ok(true));
            assert_eq!(pool.fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, now).unwrap(), Some(0));
            pool.update_all(&mut physics, &mut scene, now).unwrap();
            assert_eq!(pool.active_slots().count(), 1);
        }
        assert_eq!(physics.enabled_body_count(), 1);
        assert_eq!(scene.attached_count(), 1);
        assert_slots_consistent(&pool, &physics, &scene);
    }

    #[test]
    fn quality_limit_caps_live_shots() {
        let (mut physics, mut scene, mut pool) = setup(5);
        pool.set_limit(2);
        let fired = (0..5)
            .filter_map(|_| pool.fire(&mut physics, &mut scene, Vec3::ZERO, Quat::IDENTITY, 0.0).unwrap())
            .count();
        assert_eq!(fired, 2);
        pool.set_limit(50);
        assert_eq!(pool.limit(), 5);
    }
}
