//! Decorative showcase objects floating around a centre of attraction.
//!
//! In orbit mode each body is pulled toward a resting shell around the
//! centre and pushed out when it gets too close. Switching to grid mode
//! blows the objects apart, respawns them on a distant sphere and springs
//! them into a grid. The cursor pushes nearby objects away in either mode.

use crate::config::ShowcaseTuning;
use engine_core::{NodeId, NodeKind, SceneError, SceneGraph, Transform};
use glam::Vec3;
use physics::{CollisionGroup, PhysicsWorld, RigidBodyHandle, SphereBodyDesc};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowcaseMode {
    #[default]
    Orbit,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Transition {
    Idle,
    /// Objects are flying apart; respawn when the time is reached.
    Exploding { until: f32 },
    /// Forces are held off until the time is reached.
    Settling { until: f32 },
}

#[derive(Debug, Clone)]
struct ShowcaseObject {
    body: RigidBodyHandle,
    visual: NodeId,
}

pub struct Showcase {
    objects: Vec<ShowcaseObject>,
    mode: ShowcaseMode,
    transition: Transition,
    tuning: ShowcaseTuning,
}

impl Showcase {
    /// Spawn the objects evenly on a ring of the resting radius.
    pub fn new(
        physics: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        tuning: &ShowcaseTuning,
    ) -> Result<Self, SceneError> {
        let center = tuning.center();
        let mut objects = Vec::with_capacity(tuning.count);
        for i in 0..tuning.count {
            let angle = i as f32 / tuning.count as f32 * std::f32::consts::TAU;
            let position = center + Vec3::new(angle.cos(), angle.sin(), 0.0) * tuning.rest_distance;
            let (body, _) = physics.add_sphere_body(&SphereBodyDesc {
                position,
                linear_damping: tuning.linear_damping,
                angular_damping: 0.8,
                groups: CollisionGroup::decoration(),
                lock_rotations: true,
                ..SphereBodyDesc::new(tuning.object_radius, 1.0)
            });
            let visual = scene.spawn_attached(NodeKind::Decoration, Transform::from_position(position), None)?;
            objects.push(ShowcaseObject { body, visual });
        }
        Ok(Self {
            objects,
            mode: ShowcaseMode::Orbit,
            transition: Transition::Idle,
            tuning: tuning.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn mode(&self) -> ShowcaseMode {
        self.mode
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition != Transition::Idle
    }

    /// World position of object `index`.
    pub fn position(&self, physics: &PhysicsWorld, index: usize) -> Option<Vec3> {
        physics.position(self.objects.get(index)?.body)
    }

    /// Grid slot for object `index`: rows of `grid_columns`, centred on the
    /// attraction centre, first row on top.
    pub fn grid_target(&self, index: usize) -> Vec3 {
        let columns = self.tuning.grid_columns.max(1);
        let count = self.objects.len().max(1);
        let rows = count.div_ceil(columns);
        let spacing = self.tuning.grid_spacing;
        let width = (count.min(columns) - 1) as f32 * spacing;
        let height = (rows - 1) as f32 * spacing;
        let column = (index % columns) as f32;
        let row = (index / columns) as f32;
        self.tuning.center() + Vec3::new(column * spacing - width / 2.0, height / 2.0 - row * spacing, 0.0)
    }

    /// Blow the objects apart and rebuild them as a grid. Ignored when
    /// already in grid mode or mid-transition.
    pub fn switch_to_grid(&mut self, physics: &mut PhysicsWorld, rng: &mut impl Rng, now: f32) -> bool {
        if self.mode == ShowcaseMode::Grid || self.is_transitioning() {
            return false;
        }
        self.mode = ShowcaseMode::Grid;
        let center = self.tuning.center();
        for object in &self.objects {
            let offset = physics.position(object.body).unwrap_or(center) - center;
            let direction = offset.try_normalize().unwrap_or_else(|| random_direction(rng));
            physics.reset_forces(object.body);
            physics.apply_impulse(object.body, direction * rng.gen_range(12.0..22.0));
        }
        self.transition = Transition::Exploding {
            until: now + self.tuning.explode_seconds,
        };
        log::info!("Showcase switching to grid");
        true
    }

    /// Return to orbiting the centre. Ignored when already orbiting or mid-transition.
    pub fn switch_to_orbit(&mut self, now: f32) -> bool {
        if self.mode == ShowcaseMode::Orbit || self.is_transitioning() {
            return false;
        }
        self.mode = ShowcaseMode::Orbit;
        self.transition = Transition::Settling {
            until: now + self.tuning.settle_seconds,
        };
        log::info!("Showcase switching to orbit");
        true
    }

    /// Advance transitions, apply this frame's forces and copy body poses
    /// onto the visuals. `cursor` is the cursor's point on the showcase plane.
    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        cursor: Option<Vec3>,
        rng: &mut impl Rng,
        now: f32,
    ) -> Result<(), SceneError> {
        match self.transition {
            Transition::Exploding { until } if now >= until => {
                self.respawn_far(physics, rng);
                self.transition = Transition::Settling {
                    until: now + self.tuning.settle_seconds,
                };
            }
            Transition::Settling { until } if now >= until => self.transition = Transition::Idle,
            _ => {}
        }

        for (index, object) in self.objects.iter().enumerate() {
            physics.reset_forces(object.body);
            if self.transition != Transition::Idle {
                continue;
            }
            let Some(position) = physics.position(object.body) else {
                continue;
            };
            let force = match self.mode {
                ShowcaseMode::Grid => (self.grid_target(index) - position) * self.tuning.grid_spring,
                ShowcaseMode::Orbit => orbit_force(position, &self.tuning),
            } + cursor.map_or(Vec3::ZERO, |cursor| cursor_repulsion(position, cursor, &self.tuning));
            physics.apply_force(object.body, force);
        }

        for object in &self.objects {
            if let Some(pose) = physics.get_body_transform(object.body) {
                scene.set_local(object.visual, pose)?;
            }
        }
        Ok(())
    }

    fn respawn_far(&self, physics: &mut PhysicsWorld, rng: &mut impl Rng) {
        let center = self.tuning.center();
        for object in &self.objects {
            let position = center + random_direction(rng) * self.tuning.spawn_radius;
            physics.set_pose(object.body, position, glam::Quat::IDENTITY);
            physics.set_linear_velocity(object.body, Vec3::ZERO);
        }
    }
}

/// Spring toward the resting shell; push out when closer than the minimum.
pub fn orbit_force(position: Vec3, tuning: &ShowcaseTuning) -> Vec3 {
    let to_center = tuning.center() - position;
    let distance = to_center.length();
    let magnitude = if distance > tuning.rest_distance {
        tuning.attraction_strength * (distance - tuning.rest_distance) * 0.25
    } else if distance < tuning.min_distance && distance > 0.05 {
        -tuning.attraction_strength * (tuning.min_distance - distance) * 0.35
    } else {
        0.0
    };
    if magnitude.abs() <= 1e-4 {
        return Vec3::ZERO;
    }
    to_center / distance * magnitude
}

/// Push away from the cursor, measured in the object's own depth plane.
pub fn cursor_repulsion(position: Vec3, cursor: Vec3, tuning: &ShowcaseTuning) -> Vec3 {
    let away = position - Vec3::new(cursor.x, cursor.y, position.z);
    let distance = away.length();
    if distance >= tuning.cursor_radius || distance <= 0.01 {
        return Vec3::ZERO;
    }
    away / distance * tuning.cursor_repulsion * (1.0 - distance / tuning.cursor_radius)
}

/// Where a ray meets the plane `z = plane_z`, if ahead of the origin.
pub fn ray_plane_z(origin: Vec3, direction: Vec3, plane_z: f32) -> Option<Vec3> {
    if direction.z.abs() <= f32::EPSILON {
        return None;
    }
    let t = (plane_z - origin.z) / direction.z;
    (t >= 0.0).then(|| origin + direction * t)
}

fn random_direction(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
            rng.gen_range(-0.5..0.5),
        );
        if let Some(direction) = v.try_normalize() {
            return direction;
        }
    }
}
